//! PSO configuration.

use crate::error::EngineError;

/// Configuration for Particle Swarm Optimization.
///
/// # Defaults
///
/// ```
/// use swarm_optim::pso::PsoConfig;
///
/// let config = PsoConfig::default();
/// assert_eq!(config.population_size, 30);
/// assert_eq!(config.inertia_weight, 0.7);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use swarm_optim::pso::PsoConfig;
///
/// let config = PsoConfig::default()
///     .with_population_size(50)
///     .with_inertia_weight(0.6)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PsoConfig {
    /// Number of particles in the swarm.
    ///
    /// Larger swarms explore more but cost one objective evaluation per
    /// particle per iteration. Typical range: 20–100.
    pub population_size: usize,

    /// Inertia weight `w`: how much of the previous velocity persists.
    pub inertia_weight: f64,

    /// Cognitive coefficient `c1`: pull toward the particle's personal best.
    pub cognitive_coefficient: f64,

    /// Social coefficient `c2`: pull toward the swarm's global best.
    pub social_coefficient: f64,

    /// Velocity clamp, as a fraction of each dimension's range.
    ///
    /// After the velocity update, each component is clamped to
    /// `±max_velocity · (high_d − low_d)`.
    pub max_velocity: f64,

    /// Whether to evaluate particles in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            inertia_weight: 0.7,
            cognitive_coefficient: 1.5,
            social_coefficient: 1.5,
            max_velocity: 1.0,
            parallel: true,
            seed: None,
        }
    }
}

impl PsoConfig {
    /// Sets the swarm size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the inertia weight `w`.
    pub fn with_inertia_weight(mut self, w: f64) -> Self {
        self.inertia_weight = w;
        self
    }

    /// Sets the cognitive coefficient `c1`.
    pub fn with_cognitive_coefficient(mut self, c1: f64) -> Self {
        self.cognitive_coefficient = c1;
        self
    }

    /// Sets the social coefficient `c2`.
    pub fn with_social_coefficient(mut self, c2: f64) -> Self {
        self.social_coefficient = c2;
        self
    }

    /// Sets the velocity clamp fraction.
    pub fn with_max_velocity(mut self, fraction: f64) -> Self {
        self.max_velocity = fraction;
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

    /// Preset for quick searches: small swarm.
    pub fn fast() -> Self {
        Self {
            population_size: 20,
            ..Self::default()
        }
    }

    /// Preset balancing quality and cost: the default swarm size.
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Preset for quality searches: large swarm.
    pub fn quality() -> Self {
        Self {
            population_size: 60,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.population_size < 1 {
            return Err(EngineError::InvalidConfiguration(
                "population_size must be at least 1".into(),
            ));
        }
        if !self.inertia_weight.is_finite() || self.inertia_weight < 0.0 {
            return Err(EngineError::InvalidConfiguration(
                "inertia_weight must be finite and non-negative".into(),
            ));
        }
        if !self.cognitive_coefficient.is_finite() || self.cognitive_coefficient < 0.0 {
            return Err(EngineError::InvalidConfiguration(
                "cognitive_coefficient must be finite and non-negative".into(),
            ));
        }
        if !self.social_coefficient.is_finite() || self.social_coefficient < 0.0 {
            return Err(EngineError::InvalidConfiguration(
                "social_coefficient must be finite and non-negative".into(),
            ));
        }
        if !self.max_velocity.is_finite() || self.max_velocity <= 0.0 {
            return Err(EngineError::InvalidConfiguration(
                "max_velocity must be finite and positive".into(),
            ));
        }
        Ok(())
    }
}
