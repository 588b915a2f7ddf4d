//! GEP generational loop.
//!
//! [`GepRunner`] orchestrates the evolutionary process:
//! evaluation → selection → reproduction past the elite boundary → repeat,
//! until the target fitness is reached or the generation budget is spent.

use super::config::{check_partners, GepConfig};
use super::types::FitnessEvaluator;
use crate::error::{GepError, Result};
use crate::genome::{Individual, IndividualLayout, Scored};
use crate::operators::Reproducer;
use crate::random::{RandomSource, SeededRandom};
use crate::selection::Selector;
use log::{debug, info};
use std::fmt;

/// Fitness summary of one evaluated generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// 0 for the initial population.
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
}

/// Result of a GEP run.
pub struct GepResult<T, C = ()> {
    /// The best individual found during the entire run.
    pub best: Individual<T, C>,

    /// Best fitness value (same as `best.fitness()`).
    pub best_fitness: f64,

    /// Number of select/reproduce cycles executed.
    pub generations: usize,

    /// Whether the run stopped because the target fitness was reached.
    pub reached_target: bool,

    /// One entry per evaluated generation, the initial population included.
    pub history: Vec<GenerationStats>,
}

impl<T, C> Clone for GepResult<T, C> {
    fn clone(&self) -> Self {
        Self {
            best: self.best.clone(),
            best_fitness: self.best_fitness,
            generations: self.generations,
            reached_target: self.reached_target,
            history: self.history.clone(),
        }
    }
}

impl<T, C> fmt::Debug for GepResult<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GepResult")
            .field("best", &self.best)
            .field("best_fitness", &self.best_fitness)
            .field("generations", &self.generations)
            .field("reached_target", &self.reached_target)
            .field("history", &self.history)
            .finish()
    }
}

/// Executes the GEP generational loop.
///
/// # Usage
///
/// ```
/// use u_gep::engine::{GepConfig, GepRunner};
/// use u_gep::genome::{ChromosomeLayout, GeneArchitecture, GeneElement, Individual, IndividualLayout};
///
/// let add = GeneElement::function("add", "+", 2, |v: &[f64]| v[0] + v[1]);
/// let one = GeneElement::constant("one", "1", 1.0);
/// let arch = GeneArchitecture::new(3, vec![add], vec![one]).unwrap();
/// let layout: IndividualLayout<f64> = IndividualLayout::single(ChromosomeLayout::single(arch).unwrap());
///
/// // maximize the value of the expression: the best tree is a full sum of ones
/// let evaluator = |ind: &Individual<f64>| ind.evaluate(&())[0];
/// let config = GepConfig::default()
///     .with_population_size(20)
///     .with_max_generations(50)
///     .with_target_fitness(4.0)
///     .with_seed(42);
///
/// let result = GepRunner::run(&layout, &evaluator, &config).unwrap();
/// assert!(result.best_fitness <= 4.0);
/// assert_eq!(result.history.len(), result.generations + 1);
/// ```
pub struct GepRunner;

impl GepRunner {
    /// Creates a random population from `layout` and evolves it.
    ///
    /// # Errors
    /// [`GepError::Configuration`] when `config` is invalid, otherwise as
    /// [`evolve`](GepRunner::evolve).
    pub fn run<T, C, E>(
        layout: &IndividualLayout<T, C>,
        evaluator: &E,
        config: &GepConfig,
    ) -> Result<GepResult<T, C>>
    where
        E: FitnessEvaluator<T, C> + Sync,
    {
        config.validate()?;
        let mut rng = SeededRandom::from_optional_seed(config.seed);
        let population = layout.create_population(config.population_size, &mut rng)?;
        Self::evolve(
            population,
            evaluator,
            &config.selector(),
            &config.reproducer()?,
            config,
            &mut rng,
        )
    }

    /// Evolves an existing population.
    ///
    /// Only the loop parameters of `config` are read (`max_generations`,
    /// `target_fitness`, `parallel`); the population size is the length of
    /// `population`. Every generation is evaluated in full before selection,
    /// selection happens before reproduction, and reproduction never touches
    /// the elites.
    ///
    /// # Errors
    /// - [`GepError::InvalidArgument`] when `population` is empty
    /// - [`GepError::Configuration`] for invalid loop parameters or when the
    ///   reproducer recombines but only one individual is past the elite
    ///   boundary
    pub fn evolve<T, C, E, R>(
        mut population: Vec<Individual<T, C>>,
        evaluator: &E,
        selector: &Selector,
        reproducer: &Reproducer,
        config: &GepConfig,
        rng: &mut R,
    ) -> Result<GepResult<T, C>>
    where
        E: FitnessEvaluator<T, C> + Sync,
        R: RandomSource,
    {
        if population.is_empty() {
            return Err(GepError::InvalidArgument(
                "cannot evolve an empty population".into(),
            ));
        }
        config.validate_loop()?;
        check_partners(population.len(), selector, reproducer)?;

        info!(
            "GEP run: {} individuals, {} operators, up to {} generations",
            population.len(),
            reproducer.operators().len(),
            config.max_generations
        );

        let mut history = Vec::with_capacity(config.max_generations + 1);

        evaluate_population(&mut population, evaluator, config.parallel);
        let (stats, best_idx) = summarize(0, &population);
        let mut best = population[best_idx].clone();
        let mut best_fitness = stats.best_fitness;
        record::<T, C, E>(&mut history, stats, evaluator);

        let reached = |fitness: f64| config.target_fitness.is_some_and(|t| fitness >= t);
        let mut reached_target = reached(best_fitness);
        let mut generations = 0;

        while !reached_target && generations < config.max_generations {
            let boundary = selector.select(&mut population, rng)?;
            reproducer.reproduce_from(&mut population, boundary, rng)?;
            generations += 1;

            evaluate_population(&mut population, evaluator, config.parallel);
            let (stats, gen_best) = summarize(generations, &population);
            if stats.best_fitness > best_fitness || best_fitness.is_nan() {
                best = population[gen_best].clone();
                best_fitness = stats.best_fitness;
            }
            record::<T, C, E>(&mut history, stats, evaluator);
            reached_target = reached(best_fitness);
        }

        info!(
            "GEP run finished after {generations} generations: best fitness {best_fitness}, target reached: {reached_target}"
        );

        Ok(GepResult {
            best,
            best_fitness,
            generations,
            reached_target,
            history,
        })
    }
}

fn record<T, C, E: FitnessEvaluator<T, C>>(
    history: &mut Vec<GenerationStats>,
    stats: GenerationStats,
    evaluator: &E,
) {
    debug!(
        "generation {}: best {:.6}, mean {:.6}",
        stats.generation, stats.best_fitness, stats.mean_fitness
    );
    evaluator.on_generation(&stats);
    history.push(stats);
}

/// Scores every individual, in parallel when requested and compiled in.
fn evaluate_population<T, C, E>(population: &mut [Individual<T, C>], evaluator: &E, parallel: bool)
where
    E: FitnessEvaluator<T, C> + Sync,
{
    #[cfg(feature = "parallel")]
    if parallel {
        use rayon::prelude::*;
        population.par_iter_mut().for_each(|ind| {
            let f = evaluator.evaluate(ind);
            ind.set_fitness(f);
        });
        return;
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    for ind in population.iter_mut() {
        let f = evaluator.evaluate(ind);
        ind.set_fitness(f);
    }
}

/// Stats of an evaluated population and the index of its best individual.
/// NaN fitness ranks below everything; ties go to the lowest index.
fn summarize<T, C>(generation: usize, population: &[Individual<T, C>]) -> (GenerationStats, usize) {
    let key = |f: f64| if f.is_nan() { f64::NEG_INFINITY } else { f };
    let mut best = 0;
    let mut sum = 0.0;
    for (i, ind) in population.iter().enumerate() {
        sum += ind.fitness();
        if key(ind.fitness()) > key(population[best].fitness()) {
            best = i;
        }
    }
    let stats = GenerationStats {
        generation,
        best_fitness: population[best].fitness(),
        mean_fitness: sum / population.len() as f64,
    };
    (stats, best)
}
