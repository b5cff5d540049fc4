//! Problem description: search-space bounds and the objective contract.
//!
//! These two types are the entire surface through which domain code talks
//! to the engine. A caller builds a [`SearchSpace`] describing the bounded
//! region to explore and supplies an [`Objective`]; everything else is
//! algorithm-internal.

use rand::Rng;

use crate::error::EngineError;

/// Fitness assigned to candidates whose objective evaluates to NaN or ±∞.
///
/// Large enough to lose against any legitimate fitness, finite so that
/// negation and difference arithmetic stay well-defined.
pub const NON_FINITE_PENALTY: f64 = 1e30;

/// Maps a raw objective value to a usable fitness.
pub(crate) fn penalize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        NON_FINITE_PENALTY
    }
}

/// A fitness evaluator over bounded real vectors. Lower is better.
///
/// The engine is minimization-only; for maximization use
/// [`DriverConfig::with_minimize(false)`](crate::driver::DriverConfig::with_minimize),
/// which negates the objective internally.
///
/// Implementations must be pure functions of the position vector and
/// thread-safe: the population may be evaluated in parallel. A panicking
/// objective propagates — a buggy fitness function is a caller defect
/// that must stay visible.
///
/// Any `Fn(&[f64]) -> f64 + Send + Sync` closure implements this trait:
///
/// ```
/// use swarm_optim::problem::Objective;
///
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
/// assert_eq!(sphere.value(&[3.0, 4.0]), 25.0);
/// ```
pub trait Objective: Send + Sync {
    /// Evaluates the objective at `position`.
    ///
    /// May return a non-finite value; the engine converts those to
    /// [`NON_FINITE_PENALTY`] so pathological parameter combinations are
    /// penalized instead of crashing the run.
    fn value(&self, position: &[f64]) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn value(&self, position: &[f64]) -> f64 {
        self(position)
    }
}

/// Immutable description of an optimization problem's search region:
/// one closed `[low, high]` interval per dimension.
///
/// Construction validates every interval, so a `SearchSpace` in hand is
/// always usable: at least one dimension, finite bounds, `low < high`
/// everywhere (zero-width intervals describe a degenerate search space
/// and are rejected).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchSpace {
    bounds: Vec<(f64, f64)>,
}

impl SearchSpace {
    /// Creates a search space from per-dimension `(low, high)` bounds.
    pub fn new(bounds: Vec<(f64, f64)>) -> Result<Self, EngineError> {
        if bounds.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "search space needs at least one dimension".into(),
            ));
        }
        for (d, &(low, high)) in bounds.iter().enumerate() {
            if !low.is_finite() || !high.is_finite() {
                return Err(EngineError::InvalidConfiguration(format!(
                    "dimension {d}: bounds must be finite, got ({low}, {high})"
                )));
            }
            if low >= high {
                return Err(EngineError::InvalidConfiguration(format!(
                    "dimension {d}: low must be strictly below high, got ({low}, {high})"
                )));
            }
        }
        Ok(Self { bounds })
    }

    /// Creates a space with the same `[low, high]` interval in every dimension.
    pub fn uniform(dimension: usize, low: f64, high: f64) -> Result<Self, EngineError> {
        Self::new(vec![(low, high); dimension])
    }

    /// Number of dimensions.
    pub fn dimension(&self) -> usize {
        self.bounds.len()
    }

    /// Per-dimension bounds, in order.
    pub fn bounds(&self) -> &[(f64, f64)] {
        &self.bounds
    }

    /// The `(low, high)` interval of dimension `d`.
    pub fn bound(&self, d: usize) -> (f64, f64) {
        self.bounds[d]
    }

    /// Width of dimension `d`.
    pub fn range(&self, d: usize) -> f64 {
        let (low, high) = self.bounds[d];
        high - low
    }

    /// Clamps a component into the bounds of dimension `d`.
    pub fn clamp(&self, d: usize, x: f64) -> f64 {
        let (low, high) = self.bounds[d];
        x.clamp(low, high)
    }

    /// Returns whether `position` lies fully within the bounds.
    pub fn contains(&self, position: &[f64]) -> bool {
        position.len() == self.bounds.len()
            && position
                .iter()
                .zip(&self.bounds)
                .all(|(&x, &(low, high))| x >= low && x <= high)
    }

    /// Samples a uniformly random position within the bounds.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.bounds
            .iter()
            .map(|&(low, high)| rng.random_range(low..high))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_valid() {
        let space = SearchSpace::new(vec![(0.0, 1.0), (-5.0, 5.0)]).unwrap();
        assert_eq!(space.dimension(), 2);
        assert_eq!(space.bound(1), (-5.0, 5.0));
        assert_eq!(space.range(0), 1.0);
    }

    #[test]
    fn test_empty_bounds_rejected() {
        assert!(matches!(
            SearchSpace::new(vec![]),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_zero_width_interval_rejected() {
        // Degenerate search space: low == high in one dimension.
        assert!(matches!(
            SearchSpace::new(vec![(0.0, 1.0), (2.0, 2.0)]),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_inverted_interval_rejected() {
        assert!(SearchSpace::new(vec![(1.0, 0.0)]).is_err());
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        assert!(SearchSpace::new(vec![(f64::NEG_INFINITY, 0.0)]).is_err());
        assert!(SearchSpace::new(vec![(0.0, f64::NAN)]).is_err());
    }

    #[test]
    fn test_uniform_constructor() {
        let space = SearchSpace::uniform(3, -1.0, 1.0).unwrap();
        assert_eq!(space.dimension(), 3);
        assert!(space.bounds().iter().all(|&b| b == (-1.0, 1.0)));
    }

    #[test]
    fn test_sample_within_bounds() {
        let space = SearchSpace::new(vec![(0.0, 1.0), (-10.0, -2.0), (100.0, 200.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let position = space.sample(&mut rng);
            assert!(space.contains(&position), "sample escaped bounds: {position:?}");
        }
    }

    #[test]
    fn test_clamp() {
        let space = SearchSpace::uniform(1, 0.0, 1.0).unwrap();
        assert_eq!(space.clamp(0, -0.5), 0.0);
        assert_eq!(space.clamp(0, 0.5), 0.5);
        assert_eq!(space.clamp(0, 1.5), 1.0);
    }

    #[test]
    fn test_contains_checks_length() {
        let space = SearchSpace::uniform(2, 0.0, 1.0).unwrap();
        assert!(!space.contains(&[0.5]));
        assert!(space.contains(&[0.5, 0.5]));
    }

    #[test]
    fn test_penalize() {
        assert_eq!(penalize(1.5), 1.5);
        assert_eq!(penalize(f64::NAN), NON_FINITE_PENALTY);
        assert_eq!(penalize(f64::INFINITY), NON_FINITE_PENALTY);
        assert_eq!(penalize(f64::NEG_INFINITY), NON_FINITE_PENALTY);
    }

    #[test]
    fn test_closure_objective() {
        let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
        assert_eq!(sphere.value(&[3.0, 4.0]), 25.0);
    }
}
