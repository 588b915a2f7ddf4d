//! Fitness evaluation interface.

use super::runner::GenerationStats;
use crate::genome::Individual;

/// Scores individuals for the generational loop.
///
/// Higher fitness is better. Any `Fn(&Individual<T, C>) -> f64` is an
/// evaluator, so most problems are a closure:
///
/// ```
/// use u_gep::engine::FitnessEvaluator;
/// use u_gep::genome::Individual;
///
/// fn accepts<E: FitnessEvaluator<bool>>(_: &E) {}
/// accepts(&|ind: &Individual<bool>| ind.chromosomes().len() as f64);
/// ```
///
/// The runner requires `Sync` so that evaluation can be spread over threads
/// when parallel evaluation is enabled.
pub trait FitnessEvaluator<T, C = ()> {
    /// Fitness of `individual`.
    fn evaluate(&self, individual: &Individual<T, C>) -> f64;

    /// Called once per generation after the population has been scored.
    ///
    /// Default implementation does nothing.
    fn on_generation(&self, _stats: &GenerationStats) {}
}

impl<T, C, F> FitnessEvaluator<T, C> for F
where
    F: Fn(&Individual<T, C>) -> f64,
{
    fn evaluate(&self, individual: &Individual<T, C>) -> f64 {
        self(individual)
    }
}
