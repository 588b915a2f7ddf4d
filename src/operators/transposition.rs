//! Chromosome-level transposition of insertion sequences.
//!
//! Both operators copy a short segment (the transposon) out of one gene and
//! insert it into the head of a gene sharing the same architecture, which
//! may be the source gene itself. The head is shifted right to make room and
//! whatever is pushed past the head end is discarded, so the tail and the
//! gene length never change.

use crate::genome::{Chromosome, ElementId, Gene};
use crate::random::RandomSource;

/// Root transposition (RIS).
///
/// The transposon starts at a function found by scanning the head forward
/// from a random position and always lands at position 0, becoming the new
/// root. If no function follows the scan start, nothing happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootTransposition {
    rate: f64,
}

impl RootTransposition {
    pub const NAME: &'static str = "root transposition";

    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn apply<T, C, R: RandomSource>(&self, chromosome: &mut Chromosome<T, C>, rng: &mut R) {
        if !rng.decide_binary(self.rate) {
            return;
        }
        let genes = chromosome.genes_mut();
        let source = rng.uniform_int(0, genes.len());
        let gene = &genes[source];
        let head = gene.architecture().head_length();

        let scan_from = rng.uniform_int(0, head);
        let Some(start) = (scan_from..head).find(|&pos| gene.element_at(pos).is_function()) else {
            log::trace!("root transposition found no function in head after {scan_from}");
            return;
        };
        let end = rng.uniform_int(start, head);
        let transposon = gene.sequence()[start..=end].to_vec();

        let target = pick_target(genes, source, rng);
        insert_into_head(&mut genes[target], 0, &transposon);
    }
}

/// Insertion-sequence transposition (IS).
///
/// The transposon is any contiguous segment of a random gene and is inserted
/// at a random head position other than the root. Genes with a head of
/// length 1 have no such position and are left unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsTransposition {
    rate: f64,
}

impl IsTransposition {
    pub const NAME: &'static str = "IS transposition";

    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn apply<T, C, R: RandomSource>(&self, chromosome: &mut Chromosome<T, C>, rng: &mut R) {
        if !rng.decide_binary(self.rate) {
            return;
        }
        let genes = chromosome.genes_mut();
        let source = rng.uniform_int(0, genes.len());
        let gene = &genes[source];
        let start = rng.uniform_int(0, gene.len());
        let end = rng.uniform_int(start, gene.len());
        let transposon = gene.sequence()[start..=end].to_vec();

        let target = pick_target(genes, source, rng);
        let head = genes[target].architecture().head_length();
        if head < 2 {
            log::trace!("IS transposition target has no insertion site");
            return;
        }
        let site = rng.uniform_int(1, head);
        insert_into_head(&mut genes[target], site, &transposon);
    }
}

/// Uniform pick among the genes sharing the source gene's architecture.
fn pick_target<T, C, R: RandomSource>(genes: &[Gene<T, C>], source: usize, rng: &mut R) -> usize {
    let candidates: Vec<usize> = (0..genes.len())
        .filter(|&i| genes[i].shares_architecture(&genes[source]))
        .collect();
    *rng.pick_uniform(&candidates)
}

/// Inserts `transposon` at `site`, shifting the rest of the head right and
/// truncating at the head end.
fn insert_into_head<T, C>(gene: &mut Gene<T, C>, site: usize, transposon: &[ElementId]) {
    let head = gene.architecture().head_length();
    let len = transposon.len().min(head - site);
    let sequence = gene.sequence_mut();
    sequence.copy_within(site..head - len, site + len);
    sequence[site..site + len].copy_from_slice(&transposon[..len]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{ChromosomeLayout, GeneArchitecture, GeneElement};
    use crate::random::{ScriptedRandom, SeededRandom};
    use std::sync::Arc;

    type Arch = Arc<GeneArchitecture<bool>>;

    fn arch() -> Arch {
        let f2 = GeneElement::function("and", "F2", 2, |v: &[bool]| v[0] && v[1]);
        let f1 = GeneElement::function("not", "F1", 1, |v: &[bool]| !v[0]);
        let t0 = GeneElement::constant("false", "T0", false);
        let t1 = GeneElement::constant("true", "T1", true);
        GeneArchitecture::new(4, vec![f2, f1], vec![t0, t1]).unwrap()
    }

    fn gene(arch: &Arch, karva: &str) -> Gene<bool> {
        let elements: Vec<_> = karva
            .split(' ')
            .map(|s| arch.elements().iter().find(|e| e.symbol() == s).unwrap().clone())
            .collect();
        arch.gene_from_elements(&elements).unwrap()
    }

    fn chromosome(genes: Vec<Gene<bool>>) -> Chromosome<bool> {
        Chromosome::new(genes, 0).unwrap()
    }

    fn express_all(c: &Chromosome<bool>) {
        for g in c.genes() {
            g.express();
        }
    }

    /// The edited gene dropped its old tree and decodes like a gene rebuilt
    /// from its sequence.
    fn assert_redecoded(g: &Gene<bool>) {
        assert!(!g.is_expressed());
        let rebuilt = Gene::from_ids(g.architecture().clone(), g.sequence().to_vec()).unwrap();
        assert_eq!(*g.express(), *rebuilt.express());
    }

    // ---- Root transposition ----

    #[test]
    fn test_ris_moves_function_segment_to_root() {
        let arch = arch();
        let mut c = chromosome(vec![gene(&arch, "T0 T1 F1 F2 T0 T1 T0 T1 T0")]);
        express_all(&c);
        // fire, source gene 0, scan from 1 -> F1 at 2, end 3, target gene 0
        let mut rng = ScriptedRandom::new().bools(&[true]).ints(&[0, 1, 3, 0]);
        RootTransposition::new(1.0).apply(&mut c, &mut rng);
        assert!(rng.is_exhausted());
        assert_eq!(c.gene(0).karva(), "F1 F2 T0 T1 T0 T1 T0 T1 T0");
        assert_redecoded(c.gene(0));
        assert_eq!(c.gene(0).to_string(), "F1(F2(T0, T1))");
        assert!(c.is_valid());
    }

    #[test]
    fn test_ris_without_function_is_noop() {
        let arch = arch();
        let mut c = chromosome(vec![gene(&arch, "F2 T1 T0 T0 T0 T1 T0 T1 T0")]);
        c.gene(0).express();
        let mut rng = ScriptedRandom::new().bools(&[true]).ints(&[0, 1]);
        RootTransposition::new(1.0).apply(&mut c, &mut rng);
        assert_eq!(c.gene(0).karva(), "F2 T1 T0 T0 T0 T1 T0 T1 T0");
        assert!(c.gene(0).is_expressed());
    }

    #[test]
    fn test_ris_into_other_gene() {
        let arch = arch();
        let mut c = chromosome(vec![
            gene(&arch, "F2 F1 T0 T0 T0 T1 T0 T1 T0"),
            gene(&arch, "T1 T1 T1 T1 T1 T1 T1 T1 T1"),
        ]);
        express_all(&c);
        // source gene 0, scan from 0 -> F2, end 1, target gene 1
        let mut rng = ScriptedRandom::new().bools(&[true]).ints(&[0, 0, 1, 1]);
        RootTransposition::new(1.0).apply(&mut c, &mut rng);
        assert_eq!(c.gene(1).karva(), "F2 F1 T1 T1 T1 T1 T1 T1 T1");
        assert_eq!(c.gene(0).karva(), "F2 F1 T0 T0 T0 T1 T0 T1 T0");
        assert_redecoded(c.gene(1));
        assert!(c.gene(0).is_expressed());
    }

    // ---- IS transposition ----

    #[test]
    fn test_is_inserts_and_truncates_head() {
        let arch = arch();
        let mut c = chromosome(vec![gene(&arch, "F2 F1 F2 T0 T0 T1 T0 T1 T0")]);
        express_all(&c);
        // source 0, segment 5..=7 (T1 T0 T1), target 0, site 2
        let mut rng = ScriptedRandom::new().bools(&[true]).ints(&[0, 5, 7, 0, 2]);
        IsTransposition::new(1.0).apply(&mut c, &mut rng);
        assert!(rng.is_exhausted());
        assert_eq!(c.gene(0).karva(), "F2 F1 T1 T0 T0 T1 T0 T1 T0");
        assert_redecoded(c.gene(0));
        assert_eq!(c.gene(0).to_string(), "F2(F1(T0), T1)");
        assert!(c.is_valid());
    }

    #[test]
    fn test_is_single_head_is_noop() {
        let f2 = GeneElement::function("and", "F2", 2, |v: &[bool]| v[0] && v[1]);
        let t0 = GeneElement::constant("false", "T0", false);
        let arch = GeneArchitecture::new(1, vec![f2.clone()], vec![t0.clone()]).unwrap();
        let g = arch.gene_from_elements(&[f2, t0.clone(), t0]).unwrap();
        let mut c = chromosome(vec![g]);
        let mut rng = ScriptedRandom::new().bools(&[true]).ints(&[0, 0, 2, 0]);
        IsTransposition::new(1.0).apply(&mut c, &mut rng);
        assert_eq!(c.gene(0).karva(), "F2 T0 T0");
    }

    #[test]
    fn test_transposition_only_targets_same_architecture() {
        let a = arch();
        // smaller alphabet: any handle copied over from `a` would be foreign
        let f2 = GeneElement::function("and", "F2", 2, |v: &[bool]| v[0] && v[1]);
        let t0 = GeneElement::constant("false", "T0", false);
        let b = GeneArchitecture::new(4, vec![f2], vec![t0]).unwrap();
        let layout = ChromosomeLayout::new(vec![a.clone(), b, a], 0).unwrap();
        let mut rng = SeededRandom::new(3);
        let ris = RootTransposition::new(1.0);
        let is = IsTransposition::new(1.0);
        for _ in 0..300 {
            let mut c = layout.create_random(&mut rng);
            ris.apply(&mut c, &mut rng);
            is.apply(&mut c, &mut rng);
            assert!(c.is_valid());
            for g in c.genes() {
                assert_eq!(g.len(), 9);
            }
        }
    }
}
