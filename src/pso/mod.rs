//! Particle Swarm Optimization (PSO).
//!
//! A population of particles moves through the search space, each pulled
//! toward its own best-ever position (cognitive term) and the swarm-wide
//! best (social term), with inertia carrying part of the previous
//! velocity. Velocities are clamped to a fraction of each dimension's
//! range and positions are clamped back into bounds after every step.
//!
//! # References
//!
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! - Shi & Eberhart (1998), "A Modified Particle Swarm Optimizer"

mod config;
mod swarm;

pub use config::PsoConfig;
pub use swarm::ParticleSwarm;
