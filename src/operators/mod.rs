//! Genetic operators.
//!
//! Each operator acts at exactly one [`Granularity`], fixed by its kind:
//!
//! | Operator | Granularity |
//! |---|---|
//! | [`Mutation`], [`Inversion`] | gene |
//! | [`RootTransposition`], [`IsTransposition`] | chromosome |
//! | [`GeneRecombination`], [`OnePointRecombination`], [`TwoPointRecombination`] | population |
//!
//! [`GeneticOperator`] wraps them so a [`Reproducer`] can run any sequence of
//! operators over the mutable part of a population, lifting gene- and
//! chromosome-level operators to every gene or chromosome it holds.

mod config;
mod mutation;
mod recombination;
mod transposition;

pub use config::{OperatorConfig, OperatorKind, ReproductionConfig};
pub use mutation::{Inversion, Mutation};
pub use recombination::{GeneRecombination, OnePointRecombination, TwoPointRecombination};
pub use transposition::{IsTransposition, RootTransposition};

use crate::error::{GepError, Result};
use crate::genome::{Chromosome, Gene, Individual};
use crate::random::RandomSource;
use std::fmt;

/// The level an operator works at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Granularity {
    /// Needs other individuals as partners.
    Population,
    /// Rearranges the genes of one chromosome in place.
    Chromosome,
    /// Edits one gene in place.
    Gene,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Granularity::Population => "population",
            Granularity::Chromosome => "chromosome",
            Granularity::Gene => "gene",
        })
    }
}

/// Any of the built-in operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneticOperator {
    Mutation(Mutation),
    Inversion(Inversion),
    RootTransposition(RootTransposition),
    IsTransposition(IsTransposition),
    GeneRecombination(GeneRecombination),
    OnePointRecombination(OnePointRecombination),
    TwoPointRecombination(TwoPointRecombination),
}

impl GeneticOperator {
    pub fn kind(&self) -> OperatorKind {
        match self {
            GeneticOperator::Mutation(_) => OperatorKind::Mutation,
            GeneticOperator::Inversion(_) => OperatorKind::Inversion,
            GeneticOperator::RootTransposition(_) => OperatorKind::RootTransposition,
            GeneticOperator::IsTransposition(_) => OperatorKind::IsTransposition,
            GeneticOperator::GeneRecombination(_) => OperatorKind::GeneRecombination,
            GeneticOperator::OnePointRecombination(_) => OperatorKind::OnePointRecombination,
            GeneticOperator::TwoPointRecombination(_) => OperatorKind::TwoPointRecombination,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn rate(&self) -> f64 {
        match self {
            GeneticOperator::Mutation(op) => op.rate(),
            GeneticOperator::Inversion(op) => op.rate(),
            GeneticOperator::RootTransposition(op) => op.rate(),
            GeneticOperator::IsTransposition(op) => op.rate(),
            GeneticOperator::GeneRecombination(op) => op.rate(),
            GeneticOperator::OnePointRecombination(op) => op.rate(),
            GeneticOperator::TwoPointRecombination(op) => op.rate(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.kind().granularity()
    }

    /// Applies the operator to every individual of `mutable`, at the
    /// operator's own granularity.
    ///
    /// # Errors
    /// Propagates the errors of the recombination operators.
    pub fn apply<T, C, R: RandomSource>(&self, mutable: &mut [Individual<T, C>], rng: &mut R) -> Result<()> {
        match self {
            GeneticOperator::Mutation(op) => for_each_gene(mutable, |g| op.apply(g, rng)),
            GeneticOperator::Inversion(op) => for_each_gene(mutable, |g| op.apply(g, rng)),
            GeneticOperator::RootTransposition(op) => {
                for_each_chromosome(mutable, |c| op.apply(c, rng))
            }
            GeneticOperator::IsTransposition(op) => {
                for_each_chromosome(mutable, |c| op.apply(c, rng))
            }
            GeneticOperator::GeneRecombination(op) => return op.apply(mutable, rng),
            GeneticOperator::OnePointRecombination(op) => return op.apply(mutable, rng),
            GeneticOperator::TwoPointRecombination(op) => return op.apply(mutable, rng),
        }
        Ok(())
    }
}

fn for_each_chromosome<T, C>(population: &mut [Individual<T, C>], mut f: impl FnMut(&mut Chromosome<T, C>)) {
    for individual in population {
        for chromosome in individual.chromosomes_mut() {
            f(chromosome);
        }
    }
}

fn for_each_gene<T, C>(population: &mut [Individual<T, C>], mut f: impl FnMut(&mut Gene<T, C>)) {
    for_each_chromosome(population, |chromosome| {
        for gene in chromosome.genes_mut() {
            f(gene);
        }
    });
}

/// Ordered list of operators applied to a population after selection.
///
/// # Examples
///
/// ```
/// use u_gep::operators::{Reproducer, ReproductionConfig};
///
/// let reproducer = Reproducer::from_config(&ReproductionConfig::standard()).unwrap();
/// assert_eq!(reproducer.operators().len(), 7);
/// assert_eq!(reproducer.operators()[0].name(), "mutation");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reproducer {
    operators: Vec<GeneticOperator>,
}

impl Reproducer {
    pub fn new(operators: Vec<GeneticOperator>) -> Self {
        Self { operators }
    }

    /// Operators for every non-zero rate of `config`, in canonical order.
    ///
    /// # Errors
    /// [`GepError::Configuration`] when a rate is outside `[0, 1]`.
    pub fn from_config(config: &ReproductionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.operators()))
    }

    /// Builds the operators from explicit per-operator settings.
    ///
    /// # Errors
    /// See [`OperatorConfig::build`].
    pub fn from_operator_configs(configs: &[OperatorConfig]) -> Result<Self> {
        let operators = configs
            .iter()
            .map(OperatorConfig::build)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(operators))
    }

    pub fn with_operator(mut self, operator: GeneticOperator) -> Self {
        self.operators.push(operator);
        self
    }

    pub fn operators(&self) -> &[GeneticOperator] {
        &self.operators
    }

    /// Whether any operator needs partners from the population.
    pub fn needs_partners(&self) -> bool {
        self.operators
            .iter()
            .any(|op| op.granularity() == Granularity::Population)
    }

    /// Applies every operator, in order, to `mutable`.
    ///
    /// `mutable` is the part of the population past the elite boundary;
    /// elites are never handed to an operator.
    ///
    /// # Errors
    /// The first error reported by an operator. Operators already applied
    /// are not rolled back.
    pub fn reproduce<T, C, R: RandomSource>(&self, mutable: &mut [Individual<T, C>], rng: &mut R) -> Result<()> {
        for operator in &self.operators {
            operator.apply(mutable, rng)?;
        }
        Ok(())
    }

    /// Splits `population` at `elite_boundary` and reproduces the tail.
    ///
    /// # Errors
    /// [`GepError::InvalidArgument`] when the boundary lies past the end of
    /// the population, otherwise as [`reproduce`](Reproducer::reproduce).
    pub fn reproduce_from<T, C, R: RandomSource>(
        &self,
        population: &mut [Individual<T, C>],
        elite_boundary: usize,
        rng: &mut R,
    ) -> Result<()> {
        if elite_boundary > population.len() {
            return Err(GepError::InvalidArgument(format!(
                "elite boundary {elite_boundary} past population of {}",
                population.len()
            )));
        }
        let (_elites, mutable) = population.split_at_mut(elite_boundary);
        self.reproduce(mutable, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{ChromosomeLayout, GeneArchitecture, GeneElement, IndividualLayout};
    use crate::random::SeededRandom;

    fn layout() -> IndividualLayout<bool> {
        let and = GeneElement::function("and", "&", 2, |v: &[bool]| v[0] && v[1]);
        let not = GeneElement::function("not", "!", 1, |v: &[bool]| !v[0]);
        let t0 = GeneElement::constant("false", "0", false);
        let t1 = GeneElement::constant("true", "1", true);
        let arch = GeneArchitecture::new(4, vec![and, not], vec![t0, t1]).unwrap();
        IndividualLayout::single(ChromosomeLayout::new(vec![arch.clone(), arch], 0).unwrap())
    }

    #[test]
    fn test_granularity_display() {
        assert_eq!(Granularity::Population.to_string(), "population");
        assert_eq!(Granularity::Chromosome.to_string(), "chromosome");
        assert_eq!(Granularity::Gene.to_string(), "gene");
    }

    #[test]
    fn test_operator_granularity() {
        assert_eq!(GeneticOperator::Mutation(Mutation::new(0.1)).granularity(), Granularity::Gene);
        assert_eq!(
            GeneticOperator::IsTransposition(IsTransposition::new(0.1)).granularity(),
            Granularity::Chromosome
        );
        assert_eq!(
            GeneticOperator::TwoPointRecombination(TwoPointRecombination::new(0.1)).granularity(),
            Granularity::Population
        );
    }

    #[test]
    fn test_elites_untouched() {
        let layout = layout();
        let mut rng = SeededRandom::new(42);
        let mut population = layout.create_population(12, &mut rng).unwrap();
        let elite_karva: Vec<String> = population[..3]
            .iter()
            .flat_map(|i| i.chromosome(0).genes().iter().map(|g| g.karva()).collect::<Vec<_>>())
            .collect();

        let reproducer = Reproducer::from_config(&ReproductionConfig::standard().with_mutation(1.0)).unwrap();
        for _ in 0..50 {
            reproducer.reproduce_from(&mut population, 3, &mut rng).unwrap();
        }

        let after_karva: Vec<String> = population[..3]
            .iter()
            .flat_map(|i| i.chromosome(0).genes().iter().map(|g| g.karva()).collect::<Vec<_>>())
            .collect();
        assert_eq!(elite_karva, after_karva);
        assert!(population.iter().all(|i| i.is_valid()));
    }

    #[test]
    fn test_boundary_past_end() {
        let layout = layout();
        let mut rng = SeededRandom::new(1);
        let mut population = layout.create_population(4, &mut rng).unwrap();
        let reproducer = Reproducer::default();
        assert!(matches!(
            reproducer.reproduce_from(&mut population, 5, &mut rng),
            Err(GepError::InvalidArgument(_))
        ));
        assert!(reproducer.reproduce_from(&mut population, 4, &mut rng).is_ok());
    }

    #[test]
    fn test_needs_partners() {
        assert!(!Reproducer::default().needs_partners());
        let r = Reproducer::default().with_operator(GeneticOperator::Inversion(Inversion::new(0.1)));
        assert!(!r.needs_partners());
        let r = r.with_operator(GeneticOperator::GeneRecombination(GeneRecombination::new(0.1)));
        assert!(r.needs_partners());
    }
}
