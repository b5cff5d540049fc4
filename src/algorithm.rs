//! The capability contract shared by every swarm algorithm.
//!
//! [`SwarmAlgorithm`] is the seam between concrete algorithms (PSO, DE,
//! and future variants) and the generic [`Driver`](crate::driver::Driver)
//! loop. It is object-safe, so callers may hold a `Box<dyn SwarmAlgorithm>`
//! resolved once at construction time.
//!
//! [`Candidate`] is the shared population member: a position, an optional
//! velocity (velocity-based algorithms only), the current fitness, and the
//! personal best (PSO-style algorithms only).

use rand::Rng;
use rayon::prelude::*;

use crate::error::EngineError;
use crate::problem::{penalize, Objective, SearchSpace};

/// A single solution in the population.
///
/// Invariant: `position` stays within the search-space bounds after every
/// update step. `fitness` is only meaningful after an evaluation pass and
/// is `f64::INFINITY` until then.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    /// Current position in the search space.
    pub position: Vec<f64>,
    /// Velocity vector. `None` for algorithms without a velocity term.
    pub velocity: Option<Vec<f64>>,
    /// Fitness at the current position. Lower is better.
    pub fitness: f64,
    /// Best position this candidate has ever occupied.
    pub best_position: Vec<f64>,
    /// Fitness at `best_position`.
    pub best_fitness: f64,
}

impl Candidate {
    /// Wraps an existing position into an unevaluated candidate.
    pub fn from_position(position: Vec<f64>) -> Self {
        Self {
            best_position: position.clone(),
            position,
            velocity: None,
            fitness: f64::INFINITY,
            best_fitness: f64::INFINITY,
        }
    }

    /// Samples a candidate with a uniform random position and no velocity.
    pub fn sample<R: Rng>(space: &SearchSpace, rng: &mut R) -> Self {
        Self::from_position(space.sample(rng))
    }

    /// Samples a candidate with a uniform random position and a velocity
    /// drawn within `±fraction · range_d` per dimension.
    pub fn sample_with_velocity<R: Rng>(
        space: &SearchSpace,
        rng: &mut R,
        fraction: f64,
    ) -> Self {
        let velocity = (0..space.dimension())
            .map(|d| {
                let span = fraction * space.range(d);
                rng.random_range(-span..span)
            })
            .collect();
        let mut candidate = Self::from_position(space.sample(rng));
        candidate.velocity = Some(velocity);
        candidate
    }
}

/// Best fitness/position found across the whole population so far, plus
/// the per-iteration convergence history.
///
/// Owned exclusively by the algorithm instance and updated only through
/// the select-leaders step. `offer` applies strict improvement, so the
/// committed history is monotone non-increasing by construction.
#[derive(Debug, Clone)]
pub(crate) struct GlobalBest {
    position: Vec<f64>,
    fitness: f64,
    history: Vec<f64>,
}

impl GlobalBest {
    /// Creates an unset leader: fitness at the +∞ sentinel.
    pub fn new(dimension: usize) -> Self {
        Self {
            position: vec![0.0; dimension],
            fitness: f64::INFINITY,
            history: Vec::new(),
        }
    }

    /// Takes `candidate` as the new leader if strictly better.
    pub fn offer(&mut self, position: &[f64], fitness: f64) {
        if fitness < self.fitness {
            self.fitness = fitness;
            self.position.copy_from_slice(position);
        }
    }

    /// Closes one select-leaders pass by appending the current best
    /// fitness to the convergence history.
    pub fn commit(&mut self) {
        self.history.push(self.fitness);
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }
}

/// Evaluates every candidate's objective and stores the penalized fitness.
///
/// Candidate updates are confined to each candidate's own fields, so the
/// parallel path is safe for any pure, thread-safe objective and produces
/// bit-identical results to the sequential path.
pub(crate) fn evaluate_population(
    population: &mut [Candidate],
    objective: &dyn Objective,
    parallel: bool,
) {
    if parallel {
        population.par_iter_mut().for_each(|candidate| {
            candidate.fitness = penalize(objective.value(&candidate.position));
        });
    } else {
        for candidate in population.iter_mut() {
            candidate.fitness = penalize(objective.value(&candidate.position));
        }
    }
}

/// Capability contract implemented by every concrete swarm algorithm.
///
/// The driver only ever talks to this trait. A well-behaved
/// implementation guarantees:
///
/// - positions stay within bounds after every [`update_positions`] call;
/// - the global best only improves, so [`convergence_history`] is
///   monotone non-increasing;
/// - runs are deterministic for a fixed seed.
///
/// [`update_positions`]: SwarmAlgorithm::update_positions
/// [`convergence_history`]: SwarmAlgorithm::convergence_history
pub trait SwarmAlgorithm: Send {
    /// Allocates the population: uniform random positions within bounds,
    /// velocities (if the algorithm uses them) as a fraction of each
    /// dimension's range, and the global best reset to the +∞ sentinel.
    ///
    /// Fails with [`EngineError::InvalidConfiguration`] if the algorithm
    /// configuration is unusable. The search space itself is validated at
    /// construction and can be trusted here.
    fn initialize(&mut self, space: &SearchSpace) -> Result<(), EngineError>;

    /// Evaluates the objective once per candidate position, penalizing
    /// non-finite results. PSO-style algorithms also refresh per-candidate
    /// personal bests here, before any global-best comparison.
    fn evaluate_fitness(&mut self, objective: &dyn Objective) -> Result<(), EngineError>;

    /// Scans the population's personal/candidate bests, updates the global
    /// best on strict improvement, and appends the resulting best fitness
    /// to the convergence history.
    fn select_leaders(&mut self) -> Result<(), EngineError>;

    /// Performs one generation of the algorithm's move rule, then
    /// re-evaluates fitness and re-selects leaders, so the global best and
    /// history reflect the new generation when this returns.
    fn update_positions(&mut self, objective: &dyn Objective) -> Result<(), EngineError>;

    /// Best position found so far.
    fn best_position(&self) -> Result<&[f64], EngineError>;

    /// Best fitness found so far (+∞ until the first evaluation).
    fn best_fitness(&self) -> Result<f64, EngineError>;

    /// Best-so-far fitness after each completed select-leaders pass,
    /// including the initial evaluation.
    fn convergence_history(&self) -> Result<&[f64], EngineError>;
}
