//! Driver configuration.

use crate::error::EngineError;

/// Configuration for the optimization driver loop.
///
/// # Defaults
///
/// ```
/// use swarm_optim::driver::DriverConfig;
///
/// let config = DriverConfig::default();
/// assert_eq!(config.max_iterations, 100);
/// assert!(config.minimize);
/// assert_eq!(config.convergence_window, 10);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriverConfig {
    /// Hard stop: maximum number of update iterations.
    pub max_iterations: usize,

    /// Sense of optimization. When `false`, the driver negates the
    /// objective internally and reports fitness and history back in the
    /// caller's maximize sense.
    pub minimize: bool,

    /// Relative-improvement stall threshold.
    ///
    /// The run converges once the best fitness improved by less than
    /// `convergence_tolerance · |history[0]|` over the last
    /// `convergence_window` iterations. If `history[0]` is zero, an
    /// absolute threshold of `1e-9` is used instead. Set to `0.0` to
    /// disable early stopping.
    pub convergence_tolerance: f64,

    /// Number of iterations compared for stall detection. Convergence
    /// checks only begin after this many iterations have completed.
    pub convergence_window: usize,

    /// Optional wall-clock budget in milliseconds, checked between
    /// iterations. Running out of time ends the run through the same
    /// path as iteration exhaustion (`converged = false`).
    pub time_limit_ms: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            minimize: true,
            convergence_tolerance: 0.001,
            convergence_window: 10,
            time_limit_ms: None,
        }
    }
}

impl DriverConfig {
    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the sense of optimization.
    pub fn with_minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }

    /// Sets the relative stall tolerance (0.0 disables early stopping).
    pub fn with_convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence_tolerance = tolerance.max(0.0);
        self
    }

    /// Sets the stall-detection window.
    pub fn with_convergence_window(mut self, window: usize) -> Self {
        self.convergence_window = window;
        self
    }

    /// Sets the wall-clock budget in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_iterations == 0 {
            return Err(EngineError::InvalidConfiguration(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.convergence_window == 0 {
            return Err(EngineError::InvalidConfiguration(
                "convergence_window must be at least 1".into(),
            ));
        }
        if !self.convergence_tolerance.is_finite() || self.convergence_tolerance < 0.0 {
            return Err(EngineError::InvalidConfiguration(
                "convergence_tolerance must be finite and non-negative".into(),
            ));
        }
        if self.time_limit_ms == Some(0) {
            return Err(EngineError::InvalidConfiguration(
                "time_limit_ms must be positive or None".into(),
            ));
        }
        Ok(())
    }
}
