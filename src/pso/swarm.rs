//! PSO particle updates and leader tracking.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::PsoConfig;
use crate::algorithm::{evaluate_population, Candidate, GlobalBest, SwarmAlgorithm};
use crate::error::EngineError;
use crate::problem::{Objective, SearchSpace};

/// Per-run PSO state, allocated by `initialize`.
#[derive(Debug)]
struct SwarmState {
    space: SearchSpace,
    population: Vec<Candidate>,
    leader: GlobalBest,
}

/// Particle Swarm Optimization.
///
/// Per dimension `d` of particle `i`, with fresh uniform draws
/// `r1, r2 ∈ [0, 1)`:
///
/// ```text
/// v[d] = w·v[d] + c1·r1·(pbest[d] − x[d]) + c2·r2·(gbest[d] − x[d])
/// v[d] = clamp(v[d], −max_velocity·range[d], +max_velocity·range[d])
/// x[d] = clamp(x[d] + v[d], low[d], high[d])
/// ```
///
/// The position clamp after every step is what enforces the bounds
/// invariant on [`Candidate`]. Personal bests are refreshed before the
/// global best on every evaluation pass, so a particle always compares
/// against its own best-ever fitness.
///
/// # Usage
///
/// ```
/// use swarm_optim::driver::{Driver, DriverConfig};
/// use swarm_optim::problem::SearchSpace;
/// use swarm_optim::pso::{ParticleSwarm, PsoConfig};
///
/// let space = SearchSpace::uniform(2, -5.0, 5.0)?;
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
///
/// let mut swarm = ParticleSwarm::new(PsoConfig::default().with_seed(42));
/// let result = Driver::run(&mut swarm, &space, &sphere, &DriverConfig::default())?;
/// assert!(result.best_fitness < 1.0);
/// # Ok::<(), swarm_optim::error::EngineError>(())
/// ```
pub struct ParticleSwarm {
    config: PsoConfig,
    rng: StdRng,
    state: Option<SwarmState>,
}

impl ParticleSwarm {
    /// Creates a swarm from the given configuration.
    ///
    /// The configuration is validated on [`initialize`], not here, so an
    /// invalid config surfaces as [`EngineError::InvalidConfiguration`]
    /// before any run starts.
    ///
    /// [`initialize`]: SwarmAlgorithm::initialize
    pub fn new(config: PsoConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Self {
            config,
            rng,
            state: None,
        }
    }

    /// The configuration this swarm was built with.
    pub fn config(&self) -> &PsoConfig {
        &self.config
    }

    fn state(&self) -> Result<&SwarmState, EngineError> {
        self.state.as_ref().ok_or(EngineError::NotInitialized)
    }
}

impl SwarmAlgorithm for ParticleSwarm {
    fn initialize(&mut self, space: &SearchSpace) -> Result<(), EngineError> {
        self.config.validate()?;
        let population = (0..self.config.population_size)
            .map(|_| Candidate::sample_with_velocity(space, &mut self.rng, self.config.max_velocity))
            .collect();
        self.state = Some(SwarmState {
            space: space.clone(),
            population,
            leader: GlobalBest::new(space.dimension()),
        });
        Ok(())
    }

    fn evaluate_fitness(&mut self, objective: &dyn Objective) -> Result<(), EngineError> {
        let parallel = self.config.parallel;
        let state = self.state.as_mut().ok_or(EngineError::NotInitialized)?;
        evaluate_population(&mut state.population, objective, parallel);
        // Personal best first; select_leaders then compares against these,
        // never against a stale value.
        for particle in &mut state.population {
            if particle.fitness < particle.best_fitness {
                particle.best_fitness = particle.fitness;
                particle.best_position.copy_from_slice(&particle.position);
            }
        }
        Ok(())
    }

    fn select_leaders(&mut self) -> Result<(), EngineError> {
        let state = self.state.as_mut().ok_or(EngineError::NotInitialized)?;
        let SwarmState {
            population, leader, ..
        } = state;
        for particle in population.iter() {
            leader.offer(&particle.best_position, particle.best_fitness);
        }
        leader.commit();
        Ok(())
    }

    fn update_positions(&mut self, objective: &dyn Objective) -> Result<(), EngineError> {
        // A swarm that was never evaluated has no usable leader yet; run
        // the seeding pass first so gbest is a real position.
        if self.state()?.leader.history().is_empty() {
            self.evaluate_fitness(objective)?;
            self.select_leaders()?;
        }

        let w = self.config.inertia_weight;
        let c1 = self.config.cognitive_coefficient;
        let c2 = self.config.social_coefficient;
        let v_max = self.config.max_velocity;

        let state = self.state.as_mut().ok_or(EngineError::NotInitialized)?;
        let rng = &mut self.rng;
        let SwarmState {
            space,
            population,
            leader,
        } = state;
        let gbest = leader.position().to_vec();

        for particle in population.iter_mut() {
            let velocity = particle
                .velocity
                .get_or_insert_with(|| vec![0.0; space.dimension()]);
            for d in 0..space.dimension() {
                let (low, high) = space.bound(d);
                let span = v_max * (high - low);
                let r1: f64 = rng.random_range(0.0..1.0);
                let r2: f64 = rng.random_range(0.0..1.0);

                let pull = c1 * r1 * (particle.best_position[d] - particle.position[d])
                    + c2 * r2 * (gbest[d] - particle.position[d]);
                velocity[d] = (w * velocity[d] + pull).clamp(-span, span);
                particle.position[d] = (particle.position[d] + velocity[d]).clamp(low, high);
            }
        }

        self.evaluate_fitness(objective)?;
        self.select_leaders()
    }

    fn best_position(&self) -> Result<&[f64], EngineError> {
        Ok(self.state()?.leader.position())
    }

    fn best_fitness(&self) -> Result<f64, EngineError> {
        Ok(self.state()?.leader.fitness())
    }

    fn convergence_history(&self) -> Result<&[f64], EngineError> {
        Ok(self.state()?.leader.history())
    }
}
