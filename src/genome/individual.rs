//! Individuals: the unit of selection and reproduction.

use super::chromosome::{Chromosome, ChromosomeLayout};
use crate::error::{GepError, Result};
use crate::random::RandomSource;
use std::fmt;

/// Anything carrying a scalar fitness the selection step can rank.
///
/// Higher fitness is better.
pub trait Scored {
    /// Fitness assigned by the last evaluation.
    fn fitness(&self) -> f64;

    /// Stores the fitness computed by the evaluation step.
    fn set_fitness(&mut self, fitness: f64);
}

/// One or more chromosomes plus a fitness value.
///
/// A fresh individual has fitness `0.0` until the evaluation step sets it.
pub struct Individual<T, C = ()> {
    chromosomes: Vec<Chromosome<T, C>>,
    fitness: f64,
}

impl<T, C> Individual<T, C> {
    /// # Errors
    /// [`GepError::Configuration`] when `chromosomes` is empty.
    pub fn new(chromosomes: Vec<Chromosome<T, C>>) -> Result<Self> {
        if chromosomes.is_empty() {
            return Err(GepError::Configuration(
                "an individual needs at least one chromosome".into(),
            ));
        }
        Ok(Self {
            chromosomes,
            fitness: 0.0,
        })
    }

    pub fn chromosomes(&self) -> &[Chromosome<T, C>] {
        &self.chromosomes
    }

    pub fn chromosome(&self, index: usize) -> &Chromosome<T, C> {
        &self.chromosomes[index]
    }

    pub(crate) fn chromosomes_mut(&mut self) -> &mut [Chromosome<T, C>] {
        &mut self.chromosomes
    }

    /// Evaluates every chromosome in order.
    pub fn evaluate(&self, context: &C) -> Vec<T> {
        self.chromosomes.iter().map(|c| c.evaluate(context)).collect()
    }

    /// Whether `other` has the same chromosome count and structurally
    /// compatible chromosomes at every position.
    pub fn is_compatible(&self, other: &Individual<T, C>) -> bool {
        self.chromosomes.len() == other.chromosomes.len()
            && self
                .chromosomes
                .iter()
                .zip(&other.chromosomes)
                .all(|(a, b)| a.is_compatible(b))
    }

    pub fn is_valid(&self) -> bool {
        self.chromosomes.iter().all(|c| c.is_valid())
    }
}

impl<T, C> Scored for Individual<T, C> {
    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

impl<T, C> Clone for Individual<T, C> {
    fn clone(&self) -> Self {
        Self {
            chromosomes: self.chromosomes.clone(),
            fitness: self.fitness,
        }
    }
}

impl<T, C> fmt::Debug for Individual<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Individual")
            .field("chromosomes", &self.chromosomes)
            .field("fitness", &self.fitness)
            .finish()
    }
}

impl<T, C> fmt::Display for Individual<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chromosome) in self.chromosomes.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{chromosome}")?;
        }
        Ok(())
    }
}

/// Chromosome layouts of an individual; creates random individuals and
/// initial populations.
pub struct IndividualLayout<T, C = ()> {
    chromosomes: Vec<ChromosomeLayout<T, C>>,
}

impl<T, C> IndividualLayout<T, C> {
    /// # Errors
    /// [`GepError::Configuration`] when `chromosomes` is empty.
    pub fn new(chromosomes: Vec<ChromosomeLayout<T, C>>) -> Result<Self> {
        if chromosomes.is_empty() {
            return Err(GepError::Configuration(
                "an individual needs at least one chromosome".into(),
            ));
        }
        Ok(Self { chromosomes })
    }

    /// Layout with a single chromosome.
    pub fn single(chromosome: ChromosomeLayout<T, C>) -> Self {
        Self {
            chromosomes: vec![chromosome],
        }
    }

    pub fn chromosomes(&self) -> &[ChromosomeLayout<T, C>] {
        &self.chromosomes
    }

    pub fn create_random<R: RandomSource>(&self, rng: &mut R) -> Individual<T, C> {
        Individual {
            chromosomes: self
                .chromosomes
                .iter()
                .map(|layout| layout.create_random(rng))
                .collect(),
            fitness: 0.0,
        }
    }

    /// Random initial population of `size` individuals.
    ///
    /// # Errors
    /// [`GepError::Configuration`] when `size` is zero.
    pub fn create_population<R: RandomSource>(&self, size: usize, rng: &mut R) -> Result<Vec<Individual<T, C>>> {
        if size == 0 {
            return Err(GepError::Configuration(
                "population size must be at least 1".into(),
            ));
        }
        Ok((0..size).map(|_| self.create_random(rng)).collect())
    }
}

impl<T, C> Clone for IndividualLayout<T, C> {
    fn clone(&self) -> Self {
        Self {
            chromosomes: self.chromosomes.clone(),
        }
    }
}

impl<T, C> fmt::Debug for IndividualLayout<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndividualLayout")
            .field("chromosomes", &self.chromosomes)
            .finish()
    }
}
