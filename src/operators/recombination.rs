//! Population-level recombination.
//!
//! Every recombination works on the mutable part of the population only.
//! Partners are drawn from that same part, and the whole exchange plan is
//! drawn before the first swap, so an individual that already exchanged
//! material can still be picked as a partner later in the same pass with a
//! well-defined result.
//!
//! Exchanged segments always cover the same loci on both sides. Since the
//! two chromosomes share their per-position architectures, every exchange
//! preserves gene lengths and the head/tail typing of both.

use crate::error::{GepError, Result};
use crate::genome::{Chromosome, Individual};
use crate::random::RandomSource;

/// Position inside a chromosome: gene index plus position in that gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Locus {
    gene: usize,
    position: usize,
}

/// One planned exchange between two individuals of the mutable slice.
#[derive(Debug, Clone, Copy)]
struct Exchange {
    individual: usize,
    partner: usize,
    chromosome: usize,
    from: Locus,
    to: Locus,
}

/// Whole-gene recombination.
///
/// For each individual, chromosome and gene position, with probability
/// `rate`, swaps the gene at that position with the one of a random partner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneRecombination {
    rate: f64,
}

impl GeneRecombination {
    pub const NAME: &'static str = "gene recombination";

    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// # Errors
    /// [`GepError::InvalidArgument`] when `population` holds exactly one
    /// individual, [`GepError::Configuration`] when a partner is not
    /// structurally compatible.
    pub fn apply<T, C, R: RandomSource>(&self, population: &mut [Individual<T, C>], rng: &mut R) -> Result<()> {
        require_partners(population.len(), Self::NAME)?;
        let mut plan = Vec::new();
        for individual in 0..population.len() {
            for (chromosome, layout) in population[individual].chromosomes().iter().enumerate() {
                for gene in 0..layout.len() {
                    if !rng.decide_binary(self.rate) {
                        continue;
                    }
                    let partner = draw_partner(population, individual, rng)?;
                    let locus = Locus { gene, position: 0 };
                    plan.push(Exchange {
                        individual,
                        partner,
                        chromosome,
                        from: locus,
                        to: locus,
                    });
                }
            }
        }
        execute(population, &plan, |a, b, exchange| {
            std::mem::swap(&mut a.genes_mut()[exchange.from.gene], &mut b.genes_mut()[exchange.from.gene]);
            Ok(())
        })
    }
}

/// One-point recombination.
///
/// With probability `rate` per chromosome, picks a partner and a cut (gene
/// index, position) and swaps everything from the cut to the chromosome end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnePointRecombination {
    rate: f64,
}

impl OnePointRecombination {
    pub const NAME: &'static str = "one-point recombination";

    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// # Errors
    /// Same as [`GeneRecombination::apply`].
    pub fn apply<T, C, R: RandomSource>(&self, population: &mut [Individual<T, C>], rng: &mut R) -> Result<()> {
        require_partners(population.len(), Self::NAME)?;
        let mut plan = Vec::new();
        for individual in 0..population.len() {
            for (chromosome, layout) in population[individual].chromosomes().iter().enumerate() {
                if !rng.decide_binary(self.rate) {
                    continue;
                }
                let partner = draw_partner(population, individual, rng)?;
                let last = layout.len() - 1;
                plan.push(Exchange {
                    individual,
                    partner,
                    chromosome,
                    from: draw_locus(layout, rng),
                    to: Locus {
                        gene: last,
                        position: layout.gene(last).len(),
                    },
                });
            }
        }
        execute(population, &plan, exchange_segment)
    }
}

/// Two-point recombination.
///
/// Like [`OnePointRecombination`] with two ordered cuts. Cuts in the same
/// gene exchange the half-open range between them; otherwise the first
/// gene's part from its cut, every gene in between, and the last gene's part
/// up to its cut are exchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoPointRecombination {
    rate: f64,
}

impl TwoPointRecombination {
    pub const NAME: &'static str = "two-point recombination";

    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// # Errors
    /// Same as [`GeneRecombination::apply`].
    pub fn apply<T, C, R: RandomSource>(&self, population: &mut [Individual<T, C>], rng: &mut R) -> Result<()> {
        require_partners(population.len(), Self::NAME)?;
        let mut plan = Vec::new();
        for individual in 0..population.len() {
            for (chromosome, layout) in population[individual].chromosomes().iter().enumerate() {
                if !rng.decide_binary(self.rate) {
                    continue;
                }
                let partner = draw_partner(population, individual, rng)?;
                let a = draw_locus(layout, rng);
                let b = draw_locus(layout, rng);
                plan.push(Exchange {
                    individual,
                    partner,
                    chromosome,
                    from: a.min(b),
                    to: a.max(b),
                });
            }
        }
        execute(population, &plan, exchange_segment)
    }
}

fn require_partners(len: usize, operator: &str) -> Result<()> {
    if len == 1 {
        return Err(GepError::InvalidArgument(format!(
            "{operator} needs at least two individuals to pick a distinct partner"
        )));
    }
    Ok(())
}

/// Uniform partner other than `individual`, checked for compatibility.
fn draw_partner<T, C, R: RandomSource>(
    population: &[Individual<T, C>],
    individual: usize,
    rng: &mut R,
) -> Result<usize> {
    let mut partner = rng.uniform_int(0, population.len() - 1);
    if partner >= individual {
        partner += 1;
    }
    if !population[individual].is_compatible(&population[partner]) {
        return Err(GepError::Configuration(format!(
            "individuals {individual} and {partner} have different genome layouts"
        )));
    }
    Ok(partner)
}

fn draw_locus<T, C, R: RandomSource>(chromosome: &Chromosome<T, C>, rng: &mut R) -> Locus {
    let gene = rng.uniform_int(0, chromosome.len());
    let position = rng.uniform_int(0, chromosome.gene(gene).len());
    Locus { gene, position }
}

/// Exchanges the loci `from..to` between two chromosomes.
fn exchange_segment<T, C>(a: &mut Chromosome<T, C>, b: &mut Chromosome<T, C>, exchange: &Exchange) -> Result<()> {
    let (from, to) = (exchange.from, exchange.to);
    let (left, right) = (a.genes_mut(), b.genes_mut());
    if from.gene == to.gene {
        return left[from.gene].swap_range(&mut right[from.gene], from.position..to.position);
    }
    let first_len = left[from.gene].len();
    left[from.gene].swap_range(&mut right[from.gene], from.position..first_len)?;
    for gene in from.gene + 1..to.gene {
        std::mem::swap(&mut left[gene], &mut right[gene]);
    }
    left[to.gene].swap_range(&mut right[to.gene], 0..to.position)
}

fn execute<T, C, F>(population: &mut [Individual<T, C>], plan: &[Exchange], mut swap: F) -> Result<()>
where
    F: FnMut(&mut Chromosome<T, C>, &mut Chromosome<T, C>, &Exchange) -> Result<()>,
{
    for exchange in plan {
        let (a, b) = pair_mut(population, exchange.individual, exchange.partner);
        swap(
            &mut a.chromosomes_mut()[exchange.chromosome],
            &mut b.chromosomes_mut()[exchange.chromosome],
            exchange,
        )?;
    }
    if !plan.is_empty() {
        log::trace!("recombination exchanged {} segments", plan.len());
    }
    Ok(())
}

/// Two distinct mutable elements of one slice.
fn pair_mut<I>(items: &mut [I], a: usize, b: usize) -> (&mut I, &mut I) {
    assert_ne!(a, b, "an individual cannot recombine with itself");
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
