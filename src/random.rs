//! Randomness abstraction.
//!
//! Every operator, genesis routine and selection strategy draws through
//! [`RandomSource`] and never touches a concrete generator. Substituting a
//! seeded or scripted source makes a run reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of all random decisions made by the engine.
///
/// Only [`uniform_double`](RandomSource::uniform_double),
/// [`uniform_int`](RandomSource::uniform_int) and
/// [`decide_binary`](RandomSource::decide_binary) are required; the rest
/// have default implementations in terms of those.
pub trait RandomSource {
    /// Uniform value in `[0.0, 1.0)`.
    fn uniform_double(&mut self) -> f64;

    /// Uniform integer in `lo..hi_exclusive`.
    ///
    /// # Panics
    /// Panics if the range is empty.
    fn uniform_int(&mut self, lo: usize, hi_exclusive: usize) -> usize;

    /// Returns `true` with probability `p` (clamped to `[0, 1]`).
    fn decide_binary(&mut self, p: f64) -> bool;

    /// Fair coin.
    fn decide_fair(&mut self) -> bool {
        self.decide_binary(0.5)
    }

    /// Decides whether a head position receives a function (`true`) or a
    /// terminal (`false`) during random genesis and mutation.
    fn decide_take_function(&mut self) -> bool {
        self.decide_fair()
    }

    /// Picks one element uniformly.
    ///
    /// # Panics
    /// Panics if `items` is empty.
    fn pick_uniform<'a, E>(&mut self, items: &'a [E]) -> &'a E
    where
        Self: Sized,
    {
        assert!(!items.is_empty(), "cannot pick from an empty alphabet");
        &items[self.uniform_int(0, items.len())]
    }
}

/// [`RandomSource`] backed by the standard seeded generator.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic source for reproducible runs.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Uses `seed` when given, otherwise seeds from the operating system.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_os_rng(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform_double(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn uniform_int(&mut self, lo: usize, hi_exclusive: usize) -> usize {
        assert!(
            lo < hi_exclusive,
            "empty integer range {lo}..{hi_exclusive}"
        );
        self.rng.random_range(lo..hi_exclusive)
    }

    fn decide_binary(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.rng.random_bool(p.clamp(0.0, 1.0))
    }
}

/// Replays a fixed script of draws. Used to drive operators through exact
/// positions in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedRandom {
    ints: std::collections::VecDeque<usize>,
    bools: std::collections::VecDeque<bool>,
    doubles: std::collections::VecDeque<f64>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ints(mut self, values: &[usize]) -> Self {
        self.ints.extend(values.iter().copied());
        self
    }

    pub(crate) fn bools(mut self, values: &[bool]) -> Self {
        self.bools.extend(values.iter().copied());
        self
    }

    pub(crate) fn doubles(mut self, values: &[f64]) -> Self {
        self.doubles.extend(values.iter().copied());
        self
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.ints.is_empty() && self.bools.is_empty() && self.doubles.is_empty()
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn uniform_double(&mut self) -> f64 {
        self.doubles.pop_front().expect("scripted doubles exhausted")
    }

    fn uniform_int(&mut self, lo: usize, hi_exclusive: usize) -> usize {
        let value = self.ints.pop_front().expect("scripted ints exhausted");
        assert!(
            (lo..hi_exclusive).contains(&value),
            "scripted int {value} outside {lo}..{hi_exclusive}"
        );
        value
    }

    fn decide_binary(&mut self, _p: f64) -> bool {
        self.bools.pop_front().expect("scripted bools exhausted")
    }
}
