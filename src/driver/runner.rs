//! Driver loop execution.
//!
//! The driver walks a small state machine:
//!
//! ```text
//! Created → Initialized → Iterating → { Converged | Exhausted }
//! ```
//!
//! `Created → Initialized` seeds the run (initialize, one evaluation
//! pass, one leader selection) so the convergence history starts with the
//! initial best fitness. Each loop pass calls `update_positions` once.
//! Stall detection, the iteration budget, the wall-clock budget, and
//! cancellation decide the terminal state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::config::DriverConfig;
use crate::algorithm::SwarmAlgorithm;
use crate::error::EngineError;
use crate::problem::{Objective, SearchSpace};

/// Result snapshot returned once per optimization run.
///
/// Fitness and history are reported in the caller's sense: for a
/// maximization run they are negated back, so `convergence_history` is
/// non-decreasing there instead of non-increasing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizeResult {
    /// Best position found.
    pub best_position: Vec<f64>,

    /// Fitness at `best_position`, in the caller's sense.
    pub best_fitness: f64,

    /// Number of update iterations executed (the seeding evaluation is
    /// not counted).
    pub iterations: usize,

    /// Whether the run stopped early because improvement stalled.
    /// `false` means the iteration budget, time budget, or cancellation
    /// ended the run.
    pub converged: bool,

    /// Best fitness after the seeding pass and after each iteration,
    /// in the caller's sense. Always `iterations + 1` entries.
    pub convergence_history: Vec<f64>,

    /// Wall-clock time spent in the loop.
    pub elapsed: Duration,
}

/// Loop progress. `Converged` and `Exhausted` are the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Created,
    Initialized,
    Iterating,
    Converged,
    Exhausted,
}

/// Negates an objective so the engine can minimize internally while the
/// caller maximizes.
struct Negated<'a>(&'a dyn Objective);

impl Objective for Negated<'_> {
    fn value(&self, position: &[f64]) -> f64 {
        -self.0.value(position)
    }
}

/// Executes the generic optimization loop over any [`SwarmAlgorithm`].
///
/// # Usage
///
/// ```
/// use swarm_optim::de::{DeConfig, DifferentialEvolution};
/// use swarm_optim::driver::{Driver, DriverConfig};
/// use swarm_optim::problem::SearchSpace;
///
/// let space = SearchSpace::uniform(3, -5.0, 5.0)?;
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
///
/// let mut de = DifferentialEvolution::new(DeConfig::default().with_seed(42));
/// let result = Driver::run(&mut de, &space, &sphere, &DriverConfig::default())?;
/// assert!(result.iterations <= 100);
/// # Ok::<(), swarm_optim::error::EngineError>(())
/// ```
pub struct Driver;

impl Driver {
    /// Runs one optimization to completion.
    pub fn run<A>(
        algorithm: &mut A,
        space: &SearchSpace,
        objective: &dyn Objective,
        config: &DriverConfig,
    ) -> Result<OptimizeResult, EngineError>
    where
        A: SwarmAlgorithm + ?Sized,
    {
        Self::run_with_cancel(algorithm, space, objective, config, None)
    }

    /// Runs one optimization with an optional cancellation token.
    ///
    /// When the flag flips to `true`, the loop stops before the next
    /// iteration and reports the best solution found so far with
    /// `converged = false`.
    pub fn run_with_cancel<A>(
        algorithm: &mut A,
        space: &SearchSpace,
        objective: &dyn Objective,
        config: &DriverConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<OptimizeResult, EngineError>
    where
        A: SwarmAlgorithm + ?Sized,
    {
        config.validate()?;

        let negated;
        let inner: &dyn Objective = if config.minimize {
            objective
        } else {
            negated = Negated(objective);
            &negated
        };

        let start = Instant::now();
        let budget = config.time_limit_ms.map(Duration::from_millis);

        let mut state = RunState::Created;
        let mut iterations = 0usize;
        loop {
            match state {
                RunState::Created => {
                    // Seeding pass: history[0] is the starting best fitness.
                    algorithm.initialize(space)?;
                    algorithm.evaluate_fitness(inner)?;
                    algorithm.select_leaders()?;
                    state = RunState::Initialized;
                }
                RunState::Initialized | RunState::Iterating => {
                    let cancelled = cancel
                        .as_ref()
                        .is_some_and(|flag| flag.load(Ordering::Relaxed));
                    let out_of_time = budget.is_some_and(|limit| start.elapsed() >= limit);
                    if iterations >= config.max_iterations || cancelled || out_of_time {
                        state = RunState::Exhausted;
                        continue;
                    }

                    algorithm.update_positions(inner)?;
                    iterations += 1;

                    let converged = iterations > config.convergence_window
                        && stalled(
                            algorithm.convergence_history()?,
                            config.convergence_window,
                            config.convergence_tolerance,
                        );
                    state = if converged {
                        RunState::Converged
                    } else {
                        RunState::Iterating
                    };
                }
                RunState::Converged | RunState::Exhausted => break,
            }
        }

        let best_position = algorithm.best_position()?.to_vec();
        let raw_fitness = algorithm.best_fitness()?;
        let raw_history = algorithm.convergence_history()?;
        let (best_fitness, convergence_history) = if config.minimize {
            (raw_fitness, raw_history.to_vec())
        } else {
            (-raw_fitness, raw_history.iter().map(|h| -h).collect())
        };

        Ok(OptimizeResult {
            best_position,
            best_fitness,
            iterations,
            converged: state == RunState::Converged,
            convergence_history,
            elapsed: start.elapsed(),
        })
    }
}

/// Stall test over the best-fitness history (minimize sense).
///
/// The threshold is relative to the starting best fitness; a run that
/// starts at exactly zero falls back to an absolute `1e-9` threshold.
fn stalled(history: &[f64], window: usize, tolerance: f64) -> bool {
    let n = history.len();
    if n < window + 2 {
        return false;
    }
    let recent = history[n - 1];
    let earlier = history[n - 1 - window];
    let reference = history[0].abs();
    let threshold = if reference == 0.0 {
        1e-9
    } else {
        tolerance * reference
    };
    (recent - earlier).abs() < threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::de::{DeConfig, DifferentialEvolution};
    use crate::problem::SearchSpace;
    use crate::pso::{ParticleSwarm, PsoConfig};

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    // ---- stall test ----

    #[test]
    fn test_stalled_needs_full_window() {
        let history = vec![10.0; 5];
        assert!(!stalled(&history, 10, 0.001));
    }

    #[test]
    fn test_stalled_relative_threshold() {
        // Flat tail over the window: |h[-1] - h[-11]| = 0 < 0.001 * 100.
        let mut history = vec![100.0, 50.0];
        history.extend(std::iter::repeat(40.0).take(11));
        assert!(stalled(&history, 10, 0.001));

        // Still improving faster than the threshold.
        let improving: Vec<f64> = (0..13).map(|i| 100.0 - i as f64).collect();
        assert!(!stalled(&improving, 10, 0.001));
    }

    #[test]
    fn test_stalled_absolute_fallback_at_zero_start() {
        let history = vec![0.0; 12];
        assert!(stalled(&history, 10, 0.001));
    }

    #[test]
    fn test_stalled_zero_tolerance_disables() {
        let history = vec![5.0; 20];
        assert!(!stalled(&history, 10, 0.0));
    }

    // ---- scenarios from the engine contract ----

    #[test]
    fn test_pso_sphere_scenario() {
        let space = SearchSpace::uniform(2, 0.0, 1.0).unwrap();
        let mut swarm = ParticleSwarm::new(
            PsoConfig::default()
                .with_population_size(30)
                .with_parallel(false)
                .with_seed(42),
        );
        // Zero tolerance: spend the full iteration budget.
        let config = DriverConfig::default()
            .with_max_iterations(100)
            .with_convergence_tolerance(0.0);

        let result = Driver::run(&mut swarm, &space, &sphere, &config).unwrap();

        assert!(
            result.best_fitness < 1e-3,
            "PSO should reach near-zero on the 2D sphere, got {}",
            result.best_fitness
        );
        for &x in &result.best_position {
            assert!(x.abs() < 1e-2, "expected position near origin, got {x}");
        }
    }

    #[test]
    fn test_de_sphere_scenario() {
        let space = SearchSpace::uniform(2, 0.0, 1.0).unwrap();
        let mut de = DifferentialEvolution::new(
            DeConfig::default()
                .with_population_size(50)
                .with_differential_weight(0.8)
                .with_crossover_rate(0.7)
                .with_parallel(false)
                .with_seed(42),
        );
        let config = DriverConfig::default()
            .with_max_iterations(100)
            .with_convergence_tolerance(0.0);

        let result = Driver::run(&mut de, &space, &sphere, &config).unwrap();

        assert!(
            result.best_fitness < 1e-4,
            "DE should reach < 1e-4 on the 2D sphere, got {}",
            result.best_fitness
        );
    }

    #[test]
    fn test_maximize_wrapper_scenario() {
        let space = SearchSpace::uniform(1, -1.0, 1.0).unwrap();
        let objective = |x: &[f64]| -(x[0] * x[0]);
        let mut swarm = ParticleSwarm::new(
            PsoConfig::default()
                .with_population_size(30)
                .with_parallel(false)
                .with_seed(42),
        );
        let config = DriverConfig::default()
            .with_minimize(false)
            .with_convergence_tolerance(0.0);

        let result = Driver::run(&mut swarm, &space, &objective, &config).unwrap();

        // The maximum of -(x^2) is 0; the reported fitness must be in the
        // caller's maximize sense.
        assert!(result.best_fitness <= 0.0);
        assert!(
            result.best_fitness > -1e-3,
            "expected best fitness near 0.0, got {}",
            result.best_fitness
        );
        for window in result.convergence_history.windows(2) {
            assert!(
                window[1] >= window[0],
                "maximize history must be non-decreasing: {} -> {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn test_constant_objective_converges_fast() {
        let space = SearchSpace::uniform(2, -1.0, 1.0).unwrap();
        let constant = |_: &[f64]| 0.0;
        let mut swarm = ParticleSwarm::new(
            PsoConfig::default()
                .with_population_size(10)
                .with_parallel(false)
                .with_seed(42),
        );
        let config = DriverConfig::default();

        let result = Driver::run(&mut swarm, &space, &constant, &config).unwrap();

        assert!(result.converged);
        assert!(
            result.iterations <= config.convergence_window + 1,
            "constant objective should stall within window + 1 iterations, took {}",
            result.iterations
        );
        assert_eq!(result.best_fitness, 0.0);
    }

    #[test]
    fn test_nan_objective_still_finishes() {
        let space = SearchSpace::uniform(2, 0.0, 1.0).unwrap();
        let poison = |_: &[f64]| f64::NAN;
        let mut de = DifferentialEvolution::new(
            DeConfig::fast().with_parallel(false).with_seed(42),
        );

        let result = Driver::run(&mut de, &space, &poison, &DriverConfig::default()).unwrap();

        assert!(result.best_fitness.is_finite());
        assert!(result.convergence_history.iter().all(|h| h.is_finite()));
    }

    // ---- termination paths ----

    #[test]
    fn test_exhausted_reports_not_converged() {
        let space = SearchSpace::uniform(2, -5.0, 5.0).unwrap();
        let mut swarm = ParticleSwarm::new(
            PsoConfig::fast().with_parallel(false).with_seed(42),
        );
        let config = DriverConfig::default()
            .with_max_iterations(5)
            .with_convergence_tolerance(0.0);

        let result = Driver::run(&mut swarm, &space, &sphere, &config).unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 5);
        assert_eq!(result.convergence_history.len(), 6);
    }

    #[test]
    fn test_history_length_matches_iterations() {
        let space = SearchSpace::uniform(3, -2.0, 2.0).unwrap();
        let mut de = DifferentialEvolution::new(
            DeConfig::fast().with_parallel(false).with_seed(42),
        );
        let config = DriverConfig::default().with_max_iterations(25);

        let result = Driver::run(&mut de, &space, &sphere, &config).unwrap();

        assert_eq!(result.convergence_history.len(), result.iterations + 1);
    }

    #[test]
    fn test_cancellation_before_first_iteration() {
        let space = SearchSpace::uniform(2, -5.0, 5.0).unwrap();
        let mut swarm = ParticleSwarm::new(
            PsoConfig::fast().with_parallel(false).with_seed(42),
        );
        // Pre-set flag: deterministic cancellation regardless of speed.
        let cancel = Arc::new(AtomicBool::new(true));

        let result = Driver::run_with_cancel(
            &mut swarm,
            &space,
            &sphere,
            &DriverConfig::default(),
            Some(cancel),
        )
        .unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 0);
        // The seeding pass still happened.
        assert_eq!(result.convergence_history.len(), 1);
        assert!(result.best_fitness.is_finite());
    }

    #[test]
    fn test_time_budget_ends_run_early() {
        let space = SearchSpace::uniform(2, -5.0, 5.0).unwrap();
        let slow = |x: &[f64]| {
            std::thread::sleep(Duration::from_millis(2));
            sphere(x)
        };
        let mut swarm = ParticleSwarm::new(
            PsoConfig::default()
                .with_population_size(5)
                .with_parallel(false)
                .with_seed(42),
        );
        let config = DriverConfig::default()
            .with_max_iterations(10_000)
            .with_convergence_tolerance(0.0)
            .with_time_limit_ms(30);

        let result = Driver::run(&mut swarm, &space, &slow, &config).unwrap();

        assert!(!result.converged);
        assert!(
            result.iterations < 10_000,
            "time budget should stop the run well before the iteration budget"
        );
    }

    #[test]
    fn test_invalid_driver_config_rejected() {
        let space = SearchSpace::uniform(1, 0.0, 1.0).unwrap();
        let mut swarm = ParticleSwarm::new(PsoConfig::default());
        let config = DriverConfig::default().with_max_iterations(0);

        assert!(matches!(
            Driver::run(&mut swarm, &space, &sphere, &config),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    // ---- determinism and dynamic dispatch ----

    #[test]
    fn test_driver_runs_are_deterministic() {
        let space = SearchSpace::uniform(4, -3.0, 3.0).unwrap();
        let run = || {
            let mut de = DifferentialEvolution::new(
                DeConfig::default()
                    .with_population_size(20)
                    .with_parallel(false)
                    .with_seed(777),
            );
            Driver::run(&mut de, &space, &sphere, &DriverConfig::default()).unwrap()
        };

        let first = run();
        let second = run();
        assert_eq!(first.convergence_history, second.convergence_history);
        assert_eq!(first.best_position, second.best_position);
        assert_eq!(first.iterations, second.iterations);
    }

    #[test]
    fn test_driver_accepts_boxed_algorithm() {
        let space = SearchSpace::uniform(2, -1.0, 1.0).unwrap();
        let mut boxed: Box<dyn SwarmAlgorithm> = Box::new(ParticleSwarm::new(
            PsoConfig::fast().with_parallel(false).with_seed(42),
        ));

        let result =
            Driver::run(boxed.as_mut(), &space, &sphere, &DriverConfig::default()).unwrap();

        assert!(result.best_fitness < 1.0);
    }
}
