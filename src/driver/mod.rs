//! Generic optimization driver.
//!
//! Orchestrates the loop every caller shares: initialize → evaluate →
//! select leaders → update → check convergence, until the run converges,
//! exhausts its iteration budget, runs out of wall-clock time, or is
//! cancelled. Also wraps minimize/maximize so the engine itself only ever
//! minimizes.

mod config;
mod runner;

pub use config::DriverConfig;
pub use runner::{Driver, OptimizeResult};
