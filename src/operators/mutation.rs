//! Gene-level operators: point mutation and head inversion.

use crate::genome::Gene;
use crate::random::RandomSource;
use std::sync::Arc;

/// Point mutation.
///
/// Every position is resampled independently with probability `rate`. Head
/// positions may receive a function or a terminal, tail positions a terminal
/// only, so the gene stays valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mutation {
    rate: f64,
}

impl Mutation {
    pub const NAME: &'static str = "mutation";

    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn apply<T, C, R: RandomSource>(&self, gene: &mut Gene<T, C>, rng: &mut R) {
        let architecture = Arc::clone(gene.architecture());
        for position in 0..gene.len() {
            if rng.decide_binary(self.rate) {
                let id = architecture.random_element_at(position, rng);
                gene.sequence_mut()[position] = id;
            }
        }
    }
}

/// Head inversion.
///
/// With probability `rate`, reverses the head segment between two random
/// head positions (inclusive). The tail is never touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inversion {
    rate: f64,
}

impl Inversion {
    pub const NAME: &'static str = "inversion";

    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn apply<T, C, R: RandomSource>(&self, gene: &mut Gene<T, C>, rng: &mut R) {
        if !rng.decide_binary(self.rate) {
            return;
        }
        let head = gene.architecture().head_length();
        let a = rng.uniform_int(0, head);
        let b = rng.uniform_int(0, head);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if lo == hi {
            log::trace!("inversion drew a single position; gene unchanged");
            return;
        }
        gene.sequence_mut()[lo..=hi].reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{GeneArchitecture, GeneElement};
    use crate::random::{ScriptedRandom, SeededRandom};

    fn arch() -> Arc<GeneArchitecture<bool>> {
        let f2 = GeneElement::function("and", "F2", 2, |v: &[bool]| v[0] && v[1]);
        let f1 = GeneElement::function("not", "F1", 1, |v: &[bool]| !v[0]);
        let t0 = GeneElement::constant("false", "T0", false);
        let t1 = GeneElement::constant("true", "T1", true);
        GeneArchitecture::new(3, vec![f2, f1], vec![t0, t1]).unwrap()
    }

    fn gene(arch: &Arc<GeneArchitecture<bool>>, symbols: &[&str]) -> Gene<bool> {
        let elements: Vec<_> = symbols
            .iter()
            .map(|s| arch.elements().iter().find(|e| e.symbol() == *s).unwrap().clone())
            .collect();
        arch.gene_from_elements(&elements).unwrap()
    }

    /// The edited gene dropped its old tree and decodes like a gene rebuilt
    /// from its sequence.
    fn assert_redecoded(g: &Gene<bool>) {
        assert!(!g.is_expressed());
        let rebuilt = Gene::from_ids(g.architecture().clone(), g.sequence().to_vec()).unwrap();
        assert_eq!(*g.express(), *rebuilt.express());
    }

    // ---- Mutation ----

    #[test]
    fn test_full_rate_mutation_invalidates_cache() {
        let arch = arch();
        let mut g = gene(&arch, &["F2", "T0", "F2", "T1", "T0", "T1", "T0"]);
        let before = g.express();
        Mutation::new(1.0).apply(&mut g, &mut SeededRandom::new(42));
        assert!(!g.is_expressed());
        let after = g.express();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(g.len(), 7);
        assert!(g.is_valid());
    }

    #[test]
    fn test_zero_rate_keeps_cache() {
        let arch = arch();
        let mut g = gene(&arch, &["F2", "T0", "F2", "T1", "T0", "T1", "T0"]);
        let before = g.express();
        Mutation::new(0.0).apply(&mut g, &mut SeededRandom::new(42));
        assert!(g.is_expressed());
        assert!(Arc::ptr_eq(&before, &g.express()));
    }

    #[test]
    fn test_scripted_mutation() {
        let arch = arch();
        let mut g = gene(&arch, &["F2", "T0", "F2", "T1", "T0", "T1", "T0"]);
        // position 0: mutate, take terminal, pick T1
        // positions 1..6: skip, except position 5: mutate, pick T0
        let mut rng = ScriptedRandom::new()
            .bools(&[true, false, false, false, false, false, true, false])
            .ints(&[1, 0]);
        Mutation::new(0.5).apply(&mut g, &mut rng);
        assert!(rng.is_exhausted());
        assert_eq!(g.karva(), "T1 T0 F2 T1 T0 T0 T0");
        assert_eq!(g.to_string(), "T1");
    }

    #[test]
    fn test_mutation_never_puts_function_in_tail() {
        let arch = arch();
        let mut rng = SeededRandom::new(7);
        let mut g = arch.create_random_gene(&mut rng);
        let m = Mutation::new(0.8);
        for _ in 0..500 {
            m.apply(&mut g, &mut rng);
            assert!(g.is_valid());
        }
    }

    // ---- Inversion ----

    #[test]
    fn test_inversion_reverses_head_segment() {
        let arch = arch();
        let mut g = gene(&arch, &["F2", "F1", "T1", "T1", "T0", "T0", "T0"]);
        let before = g.express();
        assert_eq!(before.size(), 4);
        let mut rng = ScriptedRandom::new().bools(&[true]).ints(&[2, 0]);
        Inversion::new(1.0).apply(&mut g, &mut rng);
        assert_eq!(g.karva(), "T1 F1 F2 T1 T0 T0 T0");
        assert_redecoded(&g);
        assert_eq!(g.express().size(), 1);
        assert!(g.is_valid());
    }

    #[test]
    fn test_inversion_skips_without_draw() {
        let arch = arch();
        let mut g = gene(&arch, &["F2", "F1", "T1", "T1", "T0", "T0", "T0"]);
        g.express();
        let mut rng = ScriptedRandom::new().bools(&[false]);
        Inversion::new(0.3).apply(&mut g, &mut rng);
        assert!(g.is_expressed());
        assert!(rng.is_exhausted());
    }

    #[test]
    fn test_inversion_keeps_tail() {
        let arch = arch();
        let mut rng = SeededRandom::new(11);
        let inv = Inversion::new(1.0);
        for _ in 0..200 {
            let mut g = arch.create_random_gene(&mut rng);
            let tail = g.sequence()[3..].to_vec();
            inv.apply(&mut g, &mut rng);
            assert_eq!(&g.sequence()[3..], &tail[..]);
            assert!(g.is_valid());
        }
    }
}
