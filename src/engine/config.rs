//! Run configuration.
//!
//! [`GepConfig`] holds every parameter of the generational loop.

use crate::error::{GepError, Result};
use crate::operators::{Reproducer, ReproductionConfig};
use crate::selection::{Selection, Selector};

/// Configuration of a GEP run.
///
/// # Defaults
///
/// ```
/// use u_gep::engine::GepConfig;
///
/// let config = GepConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 500);
/// assert!(config.target_fitness.is_none());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_gep::engine::GepConfig;
/// use u_gep::selection::Selection;
///
/// let config = GepConfig::default()
///     .with_population_size(50)
///     .with_selection(Selection::Tournament(3))
///     .with_preservation_fraction(0.05)
///     .with_target_fitness(16.0)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GepConfig {
    /// Number of individuals; fixed for the whole run.
    pub population_size: usize,

    /// Maximum number of select/reproduce cycles.
    pub max_generations: usize,

    /// Stop as soon as the best fitness reaches this value.
    ///
    /// `None` runs for `max_generations`.
    pub target_fitness: Option<f64>,

    /// Strategy filling the non-elite slots.
    pub selection: Selection,

    /// Fraction of the population carried over unchanged (0.0–1.0). At
    /// least one individual is always preserved.
    pub preservation_fraction: f64,

    /// Operator rates.
    pub reproduction: ReproductionConfig,

    /// Evaluate individuals in parallel with rayon. Requires the `parallel`
    /// feature.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for GepConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            target_fitness: None,
            selection: Selection::Roulette,
            preservation_fraction: 0.1,
            reproduction: ReproductionConfig::standard(),
            parallel: false,
            seed: None,
        }
    }
}

impl GepConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the fitness at which the run stops.
    pub fn with_target_fitness(mut self, target: f64) -> Self {
        self.target_fitness = Some(target);
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the elite preservation fraction.
    pub fn with_preservation_fraction(mut self, fraction: f64) -> Self {
        self.preservation_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Sets the operator rates.
    pub fn with_reproduction(mut self, reproduction: ReproductionConfig) -> Self {
        self.reproduction = reproduction;
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

    /// The selector described by this configuration.
    pub fn selector(&self) -> Selector {
        Selector::new(self.selection, self.preservation_fraction)
    }

    /// The reproducer described by this configuration.
    pub fn reproducer(&self) -> Result<Reproducer> {
        Reproducer::from_config(&self.reproduction)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`GepError::Configuration`] describing the first invalid parameter.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(GepError::Configuration(
                "population_size must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.preservation_fraction) {
            return Err(GepError::Configuration(format!(
                "preservation_fraction must be in [0.0, 1.0], got {}",
                self.preservation_fraction
            )));
        }
        if let Selection::Tournament(0) = self.selection {
            return Err(GepError::Configuration(
                "tournament size must be at least 1".into(),
            ));
        }
        self.validate_loop()?;
        check_partners(self.population_size, &self.selector(), &self.reproducer()?)
    }

    /// Checks the parameters the generational loop reads directly.
    pub(crate) fn validate_loop(&self) -> Result<()> {
        if self.max_generations == 0 {
            return Err(GepError::Configuration(
                "max_generations must be at least 1".into(),
            ));
        }
        if self.target_fitness.is_some_and(f64::is_nan) {
            return Err(GepError::Configuration("target_fitness is NaN".into()));
        }
        if self.parallel && !cfg!(feature = "parallel") {
            return Err(GepError::Configuration(
                "parallel evaluation requires the `parallel` feature".into(),
            ));
        }
        Ok(())
    }
}

/// Recombination draws partners among the non-elite individuals; a single
/// non-elite individual has none.
pub(crate) fn check_partners(
    population_size: usize,
    selector: &Selector,
    reproducer: &Reproducer,
) -> Result<()> {
    let mutable = population_size - selector.elite_count(population_size);
    if mutable == 1 && reproducer.needs_partners() {
        return Err(GepError::Configuration(
            "recombination needs at least two non-elite individuals".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GepConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.max_generations, 500);
        assert_eq!(config.selection, Selection::Roulette);
        assert!((config.preservation_fraction - 0.1).abs() < 1e-10);
        assert_eq!(config.reproduction, ReproductionConfig::standard());
        assert!(!config.parallel);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GepConfig::default()
            .with_population_size(30)
            .with_max_generations(1000)
            .with_selection(Selection::Tournament(4))
            .with_preservation_fraction(0.2)
            .with_target_fitness(1.0)
            .with_reproduction(ReproductionConfig::default().with_mutation(0.1))
            .with_seed(42);

        assert_eq!(config.population_size, 30);
        assert_eq!(config.max_generations, 1000);
        assert_eq!(config.selection, Selection::Tournament(4));
        assert_eq!(config.target_fitness, Some(1.0));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.selector().elite_count(30), 6);
        assert_eq!(config.reproducer().unwrap().operators().len(), 1);
    }

    #[test]
    fn test_clamp_fraction() {
        let config = GepConfig::default().with_preservation_fraction(1.5);
        assert!((config.preservation_fraction - 1.0).abs() < 1e-10);
        let config = GepConfig::default().with_preservation_fraction(-0.5);
        assert!(config.preservation_fraction.abs() < 1e-10);
    }

    #[test]
    fn test_validate_empty_population() {
        let config = GepConfig::default().with_population_size(0);
        assert!(matches!(config.validate(), Err(GepError::Configuration(_))));
    }

    #[test]
    fn test_validate_zero_generations() {
        assert!(GepConfig::default().with_max_generations(0).validate().is_err());
    }

    #[test]
    fn test_validate_fields_set_directly() {
        let config = GepConfig {
            preservation_fraction: 2.0,
            ..GepConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = GepConfig::default();
        config.reproduction.mutation = -0.1;
        assert!(config.validate().is_err());

        assert!(GepConfig::default()
            .with_selection(Selection::Tournament(0))
            .validate()
            .is_err());
        assert!(GepConfig::default().with_target_fitness(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_lone_recombination_partner() {
        // 2 individuals, 1 elite: one individual left for recombination
        let config = GepConfig::default().with_population_size(2);
        assert!(config.validate().is_err());

        let config = config.with_reproduction(ReproductionConfig::default().with_mutation(0.5));
        assert!(config.validate().is_ok());

        let single = GepConfig::default().with_population_size(1);
        assert!(single.validate().is_ok());
    }

    #[cfg(not(feature = "parallel"))]
    #[test]
    fn test_parallel_requires_feature() {
        assert!(GepConfig::default().with_parallel(true).validate().is_err());
    }
}
