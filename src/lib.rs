//! Domain-agnostic swarm optimization engine.
//!
//! Provides population-based metaheuristics over bounded real-vector
//! search spaces:
//!
//! - **Particle Swarm Optimization (PSO)**: velocity-driven search with
//!   inertia, cognitive, and social terms; personal- and global-best
//!   tracking.
//! - **Differential Evolution (DE)**: DE/rand/1/bin mutation, binomial
//!   crossover, and greedy generational selection with strict
//!   double-buffering.
//! - **Driver**: the generic initialize → evaluate → select leaders →
//!   update → check-convergence loop shared by every caller, with
//!   minimize/maximize wrapping, stall detection, wall-clock budgets,
//!   and cancellation.
//!
//! # Architecture
//!
//! The engine contains no domain-specific concepts. Consumers — strategy
//! parameter tuning, route ordering, hyperparameter search, ensemble
//! weighting — plug in through two contracts only:
//!
//! - [`problem::SearchSpace`]: dimension count and per-dimension bounds.
//! - [`problem::Objective`]: a pure function `&[f64] -> f64`, lower is
//!   better. Non-finite results are penalized, never propagated.
//!
//! Concrete algorithms implement the [`algorithm::SwarmAlgorithm`]
//! capability trait. The trait is object-safe and deliberately minimal so
//! further variants (GWO, WOA, GA-style recombination) can be added
//! without touching the driver.

pub mod algorithm;
pub mod de;
pub mod driver;
pub mod error;
pub mod problem;
pub mod pso;
