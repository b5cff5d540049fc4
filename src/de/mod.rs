//! Differential Evolution (DE).
//!
//! Maintains a population of real vectors and creates trial vectors
//! through difference-vector mutation (DE/rand/1) and binomial crossover.
//! A trial replaces its target only when it evaluates at least as well,
//! so population slots never get worse between generations.
//!
//! Generations are strictly isolated: trials are built from a snapshot of
//! generation *N* and written into a separate generation *N+1* buffer,
//! which is swapped in only after the whole population has been
//! processed. This is what makes parallel trial evaluation safe.
//!
//! # References
//!
//! - Storn & Price (1997), "Differential Evolution — A Simple and
//!   Efficient Heuristic for Global Optimization over Continuous Spaces"
//! - Price, Storn & Lampinen (2005), *Differential Evolution: A Practical
//!   Approach to Global Optimization*

mod config;
mod swarm;

pub use config::DeConfig;
pub use swarm::DifferentialEvolution;
