//! Operator configuration.

use super::{
    GeneRecombination, GeneticOperator, Granularity, Inversion, IsTransposition, Mutation,
    OnePointRecombination, RootTransposition, TwoPointRecombination,
};
use crate::error::{GepError, Result};

/// Application rate of every built-in operator.
///
/// A rate of zero disables the operator. [`Default`] disables all of them;
/// [`standard`](ReproductionConfig::standard) uses the rates commonly used
/// for GEP.
///
/// # Examples
///
/// ```
/// use u_gep::operators::ReproductionConfig;
///
/// let config = ReproductionConfig::standard()
///     .with_mutation(0.05)
///     .with_gene_recombination(0.0);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.operators().len(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReproductionConfig {
    /// Per-position probability of point mutation.
    pub mutation: f64,
    /// Per-gene probability of a head inversion.
    pub inversion: f64,
    /// Per-chromosome probability of an IS transposition.
    pub is_transposition: f64,
    /// Per-chromosome probability of a root transposition.
    pub root_transposition: f64,
    /// Per-chromosome probability of one-point recombination.
    pub one_point_recombination: f64,
    /// Per-chromosome probability of two-point recombination.
    pub two_point_recombination: f64,
    /// Per-gene probability of whole-gene recombination.
    pub gene_recombination: f64,
}

impl ReproductionConfig {
    /// Mutation 0.044, inversion 0.1, IS and root transposition 0.1,
    /// one-point and two-point recombination 0.3, gene recombination 0.1.
    pub fn standard() -> Self {
        Self {
            mutation: 0.044,
            inversion: 0.1,
            is_transposition: 0.1,
            root_transposition: 0.1,
            one_point_recombination: 0.3,
            two_point_recombination: 0.3,
            gene_recombination: 0.1,
        }
    }

    pub fn with_mutation(mut self, rate: f64) -> Self {
        self.mutation = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_inversion(mut self, rate: f64) -> Self {
        self.inversion = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_is_transposition(mut self, rate: f64) -> Self {
        self.is_transposition = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_root_transposition(mut self, rate: f64) -> Self {
        self.root_transposition = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_one_point_recombination(mut self, rate: f64) -> Self {
        self.one_point_recombination = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_two_point_recombination(mut self, rate: f64) -> Self {
        self.two_point_recombination = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_gene_recombination(mut self, rate: f64) -> Self {
        self.gene_recombination = rate.clamp(0.0, 1.0);
        self
    }

    /// Validates that every rate lies in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        for (kind, rate) in self.rates() {
            check_rate(kind.name(), rate)?;
        }
        Ok(())
    }

    /// Enabled operators in the order they are applied: mutation,
    /// inversion, IS transposition, root transposition, one-point, two-point
    /// and gene recombination.
    pub fn operators(&self) -> Vec<GeneticOperator> {
        self.rates()
            .into_iter()
            .filter(|&(_, rate)| rate > 0.0)
            .map(|(kind, rate)| kind.instantiate(rate))
            .collect()
    }

    fn rates(&self) -> [(OperatorKind, f64); 7] {
        [
            (OperatorKind::Mutation, self.mutation),
            (OperatorKind::Inversion, self.inversion),
            (OperatorKind::IsTransposition, self.is_transposition),
            (OperatorKind::RootTransposition, self.root_transposition),
            (OperatorKind::OnePointRecombination, self.one_point_recombination),
            (OperatorKind::TwoPointRecombination, self.two_point_recombination),
            (OperatorKind::GeneRecombination, self.gene_recombination),
        ]
    }
}

fn check_rate(name: &str, rate: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(GepError::Configuration(format!(
            "{name} rate must be in [0.0, 1.0], got {rate}"
        )));
    }
    Ok(())
}

/// Identity of a built-in operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperatorKind {
    Mutation,
    Inversion,
    RootTransposition,
    IsTransposition,
    GeneRecombination,
    OnePointRecombination,
    TwoPointRecombination,
}

impl OperatorKind {
    pub fn name(self) -> &'static str {
        match self {
            OperatorKind::Mutation => Mutation::NAME,
            OperatorKind::Inversion => Inversion::NAME,
            OperatorKind::RootTransposition => RootTransposition::NAME,
            OperatorKind::IsTransposition => IsTransposition::NAME,
            OperatorKind::GeneRecombination => GeneRecombination::NAME,
            OperatorKind::OnePointRecombination => OnePointRecombination::NAME,
            OperatorKind::TwoPointRecombination => TwoPointRecombination::NAME,
        }
    }

    /// The only granularity this operator can be applied at.
    pub fn granularity(self) -> Granularity {
        match self {
            OperatorKind::Mutation | OperatorKind::Inversion => Granularity::Gene,
            OperatorKind::RootTransposition | OperatorKind::IsTransposition => Granularity::Chromosome,
            OperatorKind::GeneRecombination
            | OperatorKind::OnePointRecombination
            | OperatorKind::TwoPointRecombination => Granularity::Population,
        }
    }

    fn instantiate(self, rate: f64) -> GeneticOperator {
        match self {
            OperatorKind::Mutation => GeneticOperator::Mutation(Mutation::new(rate)),
            OperatorKind::Inversion => GeneticOperator::Inversion(Inversion::new(rate)),
            OperatorKind::RootTransposition => {
                GeneticOperator::RootTransposition(RootTransposition::new(rate))
            }
            OperatorKind::IsTransposition => GeneticOperator::IsTransposition(IsTransposition::new(rate)),
            OperatorKind::GeneRecombination => {
                GeneticOperator::GeneRecombination(GeneRecombination::new(rate))
            }
            OperatorKind::OnePointRecombination => {
                GeneticOperator::OnePointRecombination(OnePointRecombination::new(rate))
            }
            OperatorKind::TwoPointRecombination => {
                GeneticOperator::TwoPointRecombination(TwoPointRecombination::new(rate))
            }
        }
    }
}

/// Settings for one operator.
///
/// `granularity` records the level the caller intends to apply the operator
/// at. Leaving it `None` accepts the operator's own granularity; naming a
/// different one is rejected when the operator is built.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperatorConfig {
    pub kind: OperatorKind,
    pub rate: f64,
    pub granularity: Option<Granularity>,
}

impl OperatorConfig {
    pub fn new(kind: OperatorKind, rate: f64) -> Self {
        Self {
            kind,
            rate,
            granularity: None,
        }
    }

    pub fn at(mut self, granularity: Granularity) -> Self {
        self.granularity = Some(granularity);
        self
    }

    /// # Errors
    /// [`GepError::UnsupportedOperation`] when the requested granularity is
    /// not the operator's, [`GepError::Configuration`] when the rate is
    /// outside `[0, 1]`.
    pub fn build(&self) -> Result<GeneticOperator> {
        if let Some(granularity) = self.granularity {
            if granularity != self.kind.granularity() {
                return Err(GepError::UnsupportedOperation {
                    operator: self.kind.name(),
                    granularity,
                });
            }
        }
        check_rate(self.kind.name(), self.rate)?;
        Ok(self.kind.instantiate(self.rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::Reproducer;

    #[test]
    fn test_default_disables_everything() {
        let config = ReproductionConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.operators().is_empty());
    }

    #[test]
    fn test_standard_order() {
        let names: Vec<&str> = ReproductionConfig::standard()
            .operators()
            .iter()
            .map(|op| op.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "mutation",
                "inversion",
                "IS transposition",
                "root transposition",
                "one-point recombination",
                "two-point recombination",
                "gene recombination",
            ]
        );
        let rates: Vec<f64> = ReproductionConfig::standard()
            .operators()
            .iter()
            .map(|op| op.rate())
            .collect();
        assert_eq!(rates, vec![0.044, 0.1, 0.1, 0.1, 0.3, 0.3, 0.1]);
    }

    #[test]
    fn test_builders_clamp() {
        let config = ReproductionConfig::default()
            .with_mutation(2.0)
            .with_inversion(-1.0);
        assert_eq!(config.mutation, 1.0);
        assert_eq!(config.inversion, 0.0);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = ReproductionConfig {
            two_point_recombination: 1.5,
            ..ReproductionConfig::default()
        };
        assert!(matches!(config.validate(), Err(GepError::Configuration(_))));
        assert!(Reproducer::from_config(&config).is_err());

        let config = ReproductionConfig {
            mutation: f64::NAN,
            ..ReproductionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_operator_config_granularity_mismatch() {
        let err = OperatorConfig::new(OperatorKind::Mutation, 0.1)
            .at(Granularity::Population)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GepError::UnsupportedOperation {
                operator: "mutation",
                granularity: Granularity::Population,
            }
        );
        let err = OperatorConfig::new(OperatorKind::OnePointRecombination, 0.3)
            .at(Granularity::Gene)
            .build()
            .unwrap_err();
        assert!(matches!(err, GepError::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_operator_config_builds() {
        let op = OperatorConfig::new(OperatorKind::RootTransposition, 0.2)
            .at(Granularity::Chromosome)
            .build()
            .unwrap();
        assert_eq!(op.name(), "root transposition");
        assert_eq!(op.granularity(), Granularity::Chromosome);
        assert_eq!(op.rate(), 0.2);

        let op = OperatorConfig::new(OperatorKind::TwoPointRecombination, 0.3).build().unwrap();
        assert_eq!(op.granularity(), OperatorKind::TwoPointRecombination.granularity());

        assert!(OperatorConfig::new(OperatorKind::Inversion, 1.2).build().is_err());
    }

    #[test]
    fn test_reproducer_from_operator_configs() {
        let reproducer = Reproducer::from_operator_configs(&[
            OperatorConfig::new(OperatorKind::Mutation, 0.05),
            OperatorConfig::new(OperatorKind::GeneRecombination, 0.1),
        ])
        .unwrap();
        assert_eq!(reproducer.operators().len(), 2);
        assert!(reproducer.needs_partners());
        assert!(Reproducer::from_operator_configs(&[
            OperatorConfig::new(OperatorKind::Inversion, 0.1).at(Granularity::Chromosome)
        ])
        .is_err());
    }
}
