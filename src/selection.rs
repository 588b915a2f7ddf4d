//! Selection with elite preservation.
//!
//! [`Selector::select`] replaces a scored population in place with the next
//! generation. The best individuals go first, unchanged; the remaining slots
//! are filled by the configured [`Selection`] strategy. The returned elite
//! boundary is the index from which genetic operators may modify the
//! population.
//!
//! All strategies **maximize** fitness.
//!
//! # References
//!
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning", roulette wheel selection
//! - Ferreira (2001), "Gene Expression Programming: a New Adaptive
//!   Algorithm for Solving Problems", roulette wheel with simple elitism

use crate::error::{GepError, Result};
use crate::genome::Scored;
use crate::random::RandomSource;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Strategy used to fill the non-elite slots.
///
/// # Examples
///
/// ```
/// use u_gep::selection::Selection;
///
/// let sel = Selection::Roulette;
/// let sel = Selection::Tournament(3);
/// assert_eq!(Selection::default(), Selection::Roulette);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Fitness-proportionate selection over the cumulative fitness array.
    ///
    /// Negative fitness counts as zero weight. When the total fitness is
    /// zero every draw resolves to index 0.
    ///
    /// # Complexity
    /// O(n) per generation to build the wheel, O(log n) per draw
    #[default]
    Roulette,

    /// Pick `k` individuals uniformly with replacement and keep the fittest.
    ///
    /// # Complexity
    /// O(k) per draw
    Tournament(usize),
}

/// Replaces populations by elite preservation plus a [`Selection`] strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selector {
    /// Strategy for the non-elite slots.
    pub strategy: Selection,

    /// Fraction of the population kept as elites (0.0–1.0). At least one
    /// elite is always kept.
    pub preservation_fraction: f64,
}

impl Default for Selector {
    fn default() -> Self {
        Self {
            strategy: Selection::Roulette,
            preservation_fraction: 0.1,
        }
    }
}

impl Selector {
    pub fn new(strategy: Selection, preservation_fraction: f64) -> Self {
        Self {
            strategy,
            preservation_fraction: preservation_fraction.clamp(0.0, 1.0),
        }
    }

    /// Number of elites kept for a population of `population_size`:
    /// `max(1, floor(size * fraction))`, never more than the population.
    pub fn elite_count(&self, population_size: usize) -> usize {
        let k = (population_size as f64 * self.preservation_fraction).floor() as usize;
        k.max(1).min(population_size)
    }

    /// Replaces `population` with the next generation and returns the elite
    /// boundary.
    ///
    /// The population size is unchanged. Each chosen individual is moved
    /// into one slot and cloned for any other, so no two slots alias one
    /// individual.
    ///
    /// # Errors
    /// [`GepError::InvalidArgument`] when `population` is empty.
    pub fn select<I, R>(&self, population: &mut Vec<I>, rng: &mut R) -> Result<usize>
    where
        I: Scored + Clone,
        R: RandomSource,
    {
        let n = population.len();
        if n == 0 {
            return Err(GepError::InvalidArgument(
                "cannot select from an empty population".into(),
            ));
        }

        let elites = self.elite_count(n);
        let mut picks = top_indices(population, elites);
        match self.strategy {
            Selection::Roulette => {
                let cumulative = cumulative_fitness(population);
                let total = cumulative[n - 1];
                if total <= 0.0 {
                    log::debug!("total fitness is zero; roulette draws resolve to index 0");
                }
                picks.extend((elites..n).map(|_| roulette_pick(&cumulative, rng)));
            }
            Selection::Tournament(k) => {
                picks.extend((elites..n).map(|_| tournament_pick(population, k, rng)));
            }
        }

        *population = materialize(std::mem::take(population), &picks);
        Ok(elites)
    }
}

/// Fitness used for ranking; NaN ranks below everything.
fn rank_key(fitness: f64) -> f64 {
    if fitness.is_nan() {
        f64::NEG_INFINITY
    } else {
        fitness
    }
}

#[derive(Debug, Clone, Copy)]
struct Ranked {
    fitness: f64,
    index: usize,
}

impl Ord for Ranked {
    /// Higher fitness ranks higher; on ties the lower index does.
    fn cmp(&self, other: &Self) -> Ordering {
        self.fitness
            .total_cmp(&other.fitness)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Indices of the `k` fittest individuals, best first.
///
/// Keeps a min-heap of the current best `k`.
fn top_indices<I: Scored>(population: &[I], k: usize) -> Vec<usize> {
    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(k + 1);
    for (index, individual) in population.iter().enumerate() {
        heap.push(Reverse(Ranked {
            fitness: rank_key(individual.fitness()),
            index,
        }));
        if heap.len() > k {
            heap.pop();
        }
    }
    // ascending order of Reverse = best first
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(r)| r.index)
        .collect()
}

/// Prefix sums of fitness with negative (and NaN) values counted as zero.
fn cumulative_fitness<I: Scored>(population: &[I]) -> Vec<f64> {
    let mut clamped = false;
    let mut sum = 0.0;
    let cumulative = population
        .iter()
        .map(|individual| {
            let f = individual.fitness();
            if f < 0.0 || f.is_nan() {
                clamped = true;
            }
            sum += f.max(0.0);
            sum
        })
        .collect();
    if clamped {
        log::warn!("negative or NaN fitness treated as zero weight by roulette selection");
    }
    cumulative
}

/// First index whose cumulative fitness reaches a uniform draw scaled by
/// the total.
fn roulette_pick<R: RandomSource>(cumulative: &[f64], rng: &mut R) -> usize {
    let total = cumulative[cumulative.len() - 1];
    let draw = rng.uniform_double() * total;
    cumulative
        .partition_point(|&c| c < draw)
        .min(cumulative.len() - 1)
}

fn tournament_pick<I: Scored, R: RandomSource>(population: &[I], k: usize, rng: &mut R) -> usize {
    let n = population.len();
    let mut best = rng.uniform_int(0, n);
    for _ in 1..k.max(1) {
        let candidate = rng.uniform_int(0, n);
        if rank_key(population[candidate].fitness()) > rank_key(population[best].fitness()) {
            best = candidate;
        }
    }
    best
}

/// Builds the new population from `picks`. The last pick of an individual
/// takes ownership; earlier picks get clones.
fn materialize<I: Clone>(population: Vec<I>, picks: &[usize]) -> Vec<I> {
    let mut remaining = vec![0usize; population.len()];
    for &i in picks {
        remaining[i] += 1;
    }
    let mut slots: Vec<Option<I>> = population.into_iter().map(Some).collect();
    picks
        .iter()
        .map(|&i| {
            remaining[i] -= 1;
            let slot = if remaining[i] == 0 {
                slots[i].take()
            } else {
                slots[i].clone()
            };
            slot.expect("slot emptied before its last pick")
        })
        .collect()
}
