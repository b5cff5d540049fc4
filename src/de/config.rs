//! DE configuration.

use crate::error::EngineError;

/// Configuration for Differential Evolution.
///
/// # Defaults
///
/// ```
/// use swarm_optim::de::DeConfig;
///
/// let config = DeConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.differential_weight, 0.8);
/// assert_eq!(config.crossover_rate, 0.7);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use swarm_optim::de::DeConfig;
///
/// let config = DeConfig::default()
///     .with_differential_weight(0.5)
///     .with_crossover_rate(0.9)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeConfig {
    /// Number of candidate vectors in the population.
    ///
    /// Must be at least 4: every trial needs three mutually distinct
    /// partners besides the target. Typical range: 30–100.
    pub population_size: usize,

    /// Differential weight `F`: scale of the difference vector in
    /// mutation. Higher values explore more aggressively.
    pub differential_weight: f64,

    /// Crossover rate `CR`: per-dimension probability of taking the
    /// mutant gene. One dimension is always taken regardless, so the
    /// trial never equals its target.
    pub crossover_rate: f64,

    /// Whether to evaluate trial vectors in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            differential_weight: 0.8,
            crossover_rate: 0.7,
            parallel: true,
            seed: None,
        }
    }
}

impl DeConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the differential weight `F`.
    pub fn with_differential_weight(mut self, f: f64) -> Self {
        self.differential_weight = f;
        self
    }

    /// Sets the crossover rate `CR`, clamped to `[0, 1]`.
    pub fn with_crossover_rate(mut self, cr: f64) -> Self {
        self.crossover_rate = cr.clamp(0.0, 1.0);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for quick searches: small population.
    pub fn fast() -> Self {
        Self {
            population_size: 30,
            ..Self::default()
        }
    }

    /// Preset balancing quality and cost: the default population.
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Preset for quality searches: large population.
    pub fn quality() -> Self {
        Self {
            population_size: 100,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.population_size < 4 {
            return Err(EngineError::InvalidConfiguration(
                "population_size must be at least 4 (target plus three distinct partners)".into(),
            ));
        }
        if !self.differential_weight.is_finite() || self.differential_weight <= 0.0 {
            return Err(EngineError::InvalidConfiguration(
                "differential_weight must be finite and positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(EngineError::InvalidConfiguration(
                "crossover_rate must lie in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}
