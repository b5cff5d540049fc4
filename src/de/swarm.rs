//! DE generation loop: mutation, crossover, greedy selection.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::DeConfig;
use crate::algorithm::{evaluate_population, Candidate, GlobalBest, SwarmAlgorithm};
use crate::error::EngineError;
use crate::problem::{Objective, SearchSpace};

/// Per-run DE state, allocated by `initialize`.
#[derive(Debug)]
struct DeState {
    space: SearchSpace,
    population: Vec<Candidate>,
    leader: GlobalBest,
}

/// Differential Evolution (DE/rand/1/bin).
///
/// For each target vector `i`, one generation builds a trial:
///
/// ```text
/// pick distinct a, b, c ≠ i
/// mutant[d] = x[a][d] + F·(x[b][d] − x[c][d])
/// trial[d]  = mutant[d] if rand() < CR or d == forced_dim, else x[i][d]
/// clamp trial to bounds
/// ```
///
/// and keeps the trial if its fitness is at most the target's. The
/// forced dimension guarantees every trial differs from its target in at
/// least one component.
///
/// # Usage
///
/// ```
/// use swarm_optim::de::{DeConfig, DifferentialEvolution};
/// use swarm_optim::driver::{Driver, DriverConfig};
/// use swarm_optim::problem::SearchSpace;
///
/// let space = SearchSpace::uniform(2, -5.0, 5.0)?;
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
///
/// let mut de = DifferentialEvolution::new(DeConfig::default().with_seed(42));
/// let result = Driver::run(&mut de, &space, &sphere, &DriverConfig::default())?;
/// assert!(result.best_fitness < 1.0);
/// # Ok::<(), swarm_optim::error::EngineError>(())
/// ```
pub struct DifferentialEvolution {
    config: DeConfig,
    rng: StdRng,
    state: Option<DeState>,
}

impl DifferentialEvolution {
    /// Creates a DE instance from the given configuration.
    pub fn new(config: DeConfig) -> Self {
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

    /// The configuration this instance was built with.
    pub fn config(&self) -> &DeConfig {
        &self.config
    }

    fn state(&self) -> Result<&DeState, EngineError> {
        self.state.as_ref().ok_or(EngineError::NotInitialized)
    }
}

/// Draws three mutually distinct indices, all different from `target`.
///
/// Requires `len >= 4`, which `DeConfig::validate` guarantees.
fn pick_partners<R: Rng>(rng: &mut R, len: usize, target: usize) -> [usize; 3] {
    let mut picks = [0usize; 3];
    let mut count = 0;
    while count < 3 {
        let idx = rng.random_range(0..len);
        if idx != target && !picks[..count].contains(&idx) {
            picks[count] = idx;
            count += 1;
        }
    }
    picks
}

impl SwarmAlgorithm for DifferentialEvolution {
    fn initialize(&mut self, space: &SearchSpace) -> Result<(), EngineError> {
        self.config.validate()?;
        let population = (0..self.config.population_size)
            .map(|_| Candidate::sample(space, &mut self.rng))
            .collect();
        self.state = Some(DeState {
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
        Ok(())
    }

    fn select_leaders(&mut self) -> Result<(), EngineError> {
        let state = self.state.as_mut().ok_or(EngineError::NotInitialized)?;
        let DeState {
            population, leader, ..
        } = state;
        for candidate in population.iter() {
            leader.offer(&candidate.position, candidate.fitness);
        }
        leader.commit();
        Ok(())
    }

    fn update_positions(&mut self, objective: &dyn Objective) -> Result<(), EngineError> {
        // Targets must carry real fitness before greedy selection can
        // compare against them.
        if self.state()?.leader.history().is_empty() {
            self.evaluate_fitness(objective)?;
            self.select_leaders()?;
        }

        let f_weight = self.config.differential_weight;
        let cr = self.config.crossover_rate;
        let parallel = self.config.parallel;

        let state = self.state.as_mut().ok_or(EngineError::NotInitialized)?;
        let rng = &mut self.rng;
        let DeState {
            space, population, ..
        } = state;
        let dim = space.dimension();
        let size = population.len();

        // Trials read only the generation-N snapshot in `population`.
        let mut trials = Vec::with_capacity(size);
        for i in 0..size {
            let [a, b, c] = pick_partners(rng, size, i);
            let forced_dim = rng.random_range(0..dim);
            let mut position = population[i].position.clone();
            for d in 0..dim {
                if d == forced_dim || rng.random_range(0.0..1.0) < cr {
                    let mutant = population[a].position[d]
                        + f_weight * (population[b].position[d] - population[c].position[d]);
                    position[d] = space.clamp(d, mutant);
                }
            }
            trials.push(Candidate::from_position(position));
        }

        evaluate_population(&mut trials, objective, parallel);

        // Greedy selection into the generation-N+1 buffer; the source
        // population stays untouched until the swap.
        let next: Vec<Candidate> = population
            .iter()
            .zip(trials)
            .map(|(target, trial)| {
                if trial.fitness <= target.fitness {
                    trial
                } else {
                    target.clone()
                }
            })
            .collect();
        *population = next;

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
