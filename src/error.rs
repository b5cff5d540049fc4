//! Error taxonomy for the optimization engine.
//!
//! Only genuinely fatal conditions are errors. Non-finite objective
//! values are penalized (see [`crate::problem::NON_FINITE_PENALTY`]) and
//! iteration/time exhaustion is a normal terminal state reported through
//! `converged = false`, so neither appears here.

use thiserror::Error;

/// Fatal errors surfaced by the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A configuration or search-space parameter is unusable
    /// (empty bounds, zero-width interval, population too small, ...).
    /// No run is started.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An accessor or update was called before `initialize`.
    /// This is a programmer error on the caller's side.
    #[error("algorithm used before initialize()")]
    NotInitialized,
}
