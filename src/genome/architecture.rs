//! Per-slot gene layout: alphabet, head length and derived gene length.

use super::element::{ElementId, GeneElement};
use super::gene::Gene;
use crate::error::{GepError, Result};
use crate::random::RandomSource;
use std::fmt;
use std::sync::Arc;

/// Immutable descriptor of one gene role.
///
/// An architecture interns its alphabet: every distinct element gets an
/// [`ElementId`] at construction time, and genes built under the
/// architecture store those ids. For architectures built with
/// [`new`](GeneArchitecture::new) the gene length is
/// `head_length * max_arity + 1`, which guarantees that the breadth-first
/// decode of any valid sequence stays in bounds: the tail holds terminals
/// only, so it can always close every open branch of the head.
///
/// Architectures are shared behind [`Arc`]. Two genes are structurally
/// compatible exactly when they point at the same architecture.
pub struct GeneArchitecture<T, C = ()> {
    head_length: usize,
    gene_length: usize,
    max_arity: usize,
    elements: Vec<Arc<GeneElement<T, C>>>,
    functions: Vec<ElementId>,
    terminals: Vec<ElementId>,
}

impl<T, C> GeneArchitecture<T, C> {
    /// Creates an architecture from a head length and the allowed alphabets.
    ///
    /// Elements repeated in the input (same `Arc`) are interned once.
    ///
    /// # Errors
    /// [`GepError::Configuration`] when `head_length` is zero, the terminal
    /// alphabet is empty, or an element sits in the wrong alphabet.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_gep::genome::{GeneArchitecture, GeneElement};
    ///
    /// let or = GeneElement::<bool>::function("or", "|", 2, |v| v[0] || v[1]);
    /// let a = GeneElement::<bool>::constant("a", "a", true);
    /// let arch = GeneArchitecture::new(4, vec![or], vec![a]).unwrap();
    /// assert_eq!(arch.gene_length(), 9);
    /// assert_eq!(arch.tail_length(), 5);
    /// ```
    pub fn new(
        head_length: usize,
        functions: Vec<Arc<GeneElement<T, C>>>,
        terminals: Vec<Arc<GeneElement<T, C>>>,
    ) -> Result<Arc<Self>> {
        if head_length == 0 {
            return Err(GepError::Configuration(
                "head_length must be at least 1".into(),
            ));
        }
        if terminals.is_empty() {
            return Err(GepError::Configuration("terminal alphabet is empty".into()));
        }
        if let Some(bad) = functions.iter().find(|e| !e.is_function()) {
            return Err(GepError::Configuration(format!(
                "`{}` is a terminal but was listed as a function",
                bad.name()
            )));
        }
        if let Some(bad) = terminals.iter().find(|e| !e.is_terminal()) {
            return Err(GepError::Configuration(format!(
                "`{}` is a function but was listed as a terminal",
                bad.name()
            )));
        }

        let mut table = Vec::with_capacity(functions.len() + terminals.len());
        let functions = intern_all(&mut table, functions);
        let terminals = intern_all(&mut table, terminals);
        let max_arity = max_arity_of(&table);

        Ok(Arc::new(Self {
            head_length,
            gene_length: head_length * max_arity + 1,
            max_arity,
            elements: table,
            functions,
            terminals,
        }))
    }

    /// Rebuilds a gene, together with a fresh architecture, from a flat
    /// element sequence.
    ///
    /// The head length is inferred as one past the last function in the
    /// sequence (at least 1) and the alphabet is the set of distinct
    /// elements observed. The gene length is the sequence length, which
    /// must leave room for a full tail: `len >= head * max_arity + 1`.
    ///
    /// # Errors
    /// [`GepError::Configuration`] when the sequence is empty, contains no
    /// terminal, or is too short for the inferred head.
    pub fn from_sequence(sequence: &[Arc<GeneElement<T, C>>]) -> Result<Gene<T, C>> {
        if sequence.is_empty() {
            return Err(GepError::Configuration(
                "cannot infer an architecture from an empty sequence".into(),
            ));
        }

        let mut table: Vec<Arc<GeneElement<T, C>>> = Vec::new();
        let ids: Vec<ElementId> = sequence
            .iter()
            .map(|e| intern(&mut table, e.clone()))
            .collect();

        let functions: Vec<ElementId> = (0..table.len())
            .filter(|&i| table[i].is_function())
            .map(|i| ElementId(i as u32))
            .collect();
        let terminals: Vec<ElementId> = (0..table.len())
            .filter(|&i| table[i].is_terminal())
            .map(|i| ElementId(i as u32))
            .collect();
        if terminals.is_empty() {
            return Err(GepError::Configuration("terminal alphabet is empty".into()));
        }

        let head_length = sequence
            .iter()
            .rposition(|e| e.is_function())
            .map_or(1, |last| last + 1);
        let max_arity = max_arity_of(&table);
        let required = head_length * max_arity + 1;
        if sequence.len() < required {
            return Err(GepError::Configuration(format!(
                "sequence of length {} is too short for head length {} \
                 and max arity {} (need {})",
                sequence.len(),
                head_length,
                max_arity,
                required
            )));
        }

        let architecture = Arc::new(Self {
            head_length,
            gene_length: sequence.len(),
            max_arity,
            elements: table,
            functions,
            terminals,
        });
        Gene::from_ids(architecture, ids)
    }

    /// Builds a gene under this architecture from element handles.
    ///
    /// # Errors
    /// [`GepError::Configuration`] when an element is not part of this
    /// architecture, the length is wrong, or a function sits in the tail.
    pub fn gene_from_elements(self: &Arc<Self>, elements: &[Arc<GeneElement<T, C>>]) -> Result<Gene<T, C>> {
        let ids = elements
            .iter()
            .map(|e| {
                self.id_of(e).ok_or_else(|| {
                    GepError::Configuration(format!(
                        "`{}` is not part of this architecture",
                        e.name()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Gene::from_ids(Arc::clone(self), ids)
    }

    /// Random gene: each head position takes a function or a terminal by
    /// [`RandomSource::decide_take_function`], each tail position a terminal.
    pub fn create_random_gene<R: RandomSource>(self: &Arc<Self>, rng: &mut R) -> Gene<T, C> {
        let sequence = (0..self.gene_length)
            .map(|pos| self.random_element_at(pos, rng))
            .collect();
        Gene::new_unchecked(Arc::clone(self), sequence)
    }

    /// Draws a replacement element that is valid at `position`.
    pub(crate) fn random_element_at<R: RandomSource>(&self, position: usize, rng: &mut R) -> ElementId {
        if self.is_head(position) && !self.functions.is_empty() && rng.decide_take_function() {
            *rng.pick_uniform(&self.functions)
        } else {
            *rng.pick_uniform(&self.terminals)
        }
    }

    pub fn head_length(&self) -> usize {
        self.head_length
    }

    pub fn tail_length(&self) -> usize {
        self.gene_length - self.head_length
    }

    pub fn gene_length(&self) -> usize {
        self.gene_length
    }

    /// Largest arity among the allowed functions, at least 1.
    pub fn max_arity(&self) -> usize {
        self.max_arity
    }

    pub fn is_head(&self, position: usize) -> bool {
        position < self.head_length
    }

    pub fn functions(&self) -> &[ElementId] {
        &self.functions
    }

    pub fn terminals(&self) -> &[ElementId] {
        &self.terminals
    }

    /// Resolves a handle issued by this architecture.
    ///
    /// # Panics
    /// Panics if `id` was issued by a different architecture with a larger
    /// table.
    pub fn element(&self, id: ElementId) -> &Arc<GeneElement<T, C>> {
        &self.elements[id.index()]
    }

    /// Every interned element, indexed by [`ElementId::index`].
    pub fn elements(&self) -> &[Arc<GeneElement<T, C>>] {
        &self.elements
    }

    /// Handle of `element` if it belongs to this architecture.
    pub fn id_of(&self, element: &Arc<GeneElement<T, C>>) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|e| Arc::ptr_eq(e, element))
            .map(|i| ElementId(i as u32))
    }

    pub(crate) fn contains(&self, id: ElementId) -> bool {
        id.index() < self.elements.len()
    }

    /// Gene indices referenced by linking terminals in this alphabet.
    pub fn linked_genes(&self) -> impl Iterator<Item = usize> + '_ {
        self.terminals
            .iter()
            .filter_map(|&id| self.element(id).linked_gene())
    }
}

impl<T, C> fmt::Debug for GeneArchitecture<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = |ids: &[ElementId]| {
            ids.iter()
                .map(|&id| self.element(id).symbol().to_owned())
                .collect::<Vec<_>>()
        };
        f.debug_struct("GeneArchitecture")
            .field("head_length", &self.head_length)
            .field("gene_length", &self.gene_length)
            .field("max_arity", &self.max_arity)
            .field("functions", &symbols(&self.functions))
            .field("terminals", &symbols(&self.terminals))
            .finish()
    }
}

fn intern<T, C>(table: &mut Vec<Arc<GeneElement<T, C>>>, element: Arc<GeneElement<T, C>>) -> ElementId {
    match table.iter().position(|e| Arc::ptr_eq(e, &element)) {
        Some(i) => ElementId(i as u32),
        None => {
            table.push(element);
            ElementId((table.len() - 1) as u32)
        }
    }
}

fn intern_all<T, C>(
    table: &mut Vec<Arc<GeneElement<T, C>>>,
    elements: Vec<Arc<GeneElement<T, C>>>,
) -> Vec<ElementId> {
    let mut ids = Vec::with_capacity(elements.len());
    for element in elements {
        let id = intern(table, element);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

fn max_arity_of<T, C>(table: &[Arc<GeneElement<T, C>>]) -> usize {
    table.iter().map(|e| e.arity()).max().unwrap_or(0).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    type El = Arc<GeneElement<bool>>;

    fn alphabet() -> (El, El, El, El) {
        let and = GeneElement::function("and", "&", 2, |v: &[bool]| v[0] && v[1]);
        let not = GeneElement::function("not", "!", 1, |v: &[bool]| !v[0]);
        let t0 = GeneElement::constant("t0", "T0", false);
        let t1 = GeneElement::constant("t1", "T1", true);
        (and, not, t0, t1)
    }

    #[test]
    fn test_gene_length_from_max_arity() {
        let (and, not, t0, t1) = alphabet();
        let arch = GeneArchitecture::new(5, vec![and, not], vec![t0, t1]).unwrap();
        assert_eq!(arch.max_arity(), 2);
        assert_eq!(arch.gene_length(), 11);
        assert_eq!(arch.tail_length(), 6);
        assert!(arch.is_head(4));
        assert!(!arch.is_head(5));
    }

    #[test]
    fn test_terminal_only_architecture() {
        let (_, _, t0, _) = alphabet();
        let arch = GeneArchitecture::new(3, vec![], vec![t0]).unwrap();
        assert_eq!(arch.max_arity(), 1);
        assert_eq!(arch.gene_length(), 4);
    }

    #[test]
    fn test_rejects_empty_terminals() {
        let (and, ..) = alphabet();
        let err = GeneArchitecture::new(3, vec![and], vec![]).unwrap_err();
        assert!(matches!(err, GepError::Configuration(_)));
    }

    #[test]
    fn test_rejects_zero_head() {
        let (_, _, t0, _) = alphabet();
        assert!(GeneArchitecture::new(0, vec![], vec![t0]).is_err());
    }

    #[test]
    fn test_rejects_misplaced_elements() {
        let (and, _, t0, _) = alphabet();
        assert!(GeneArchitecture::new(2, vec![t0.clone()], vec![t0.clone()]).is_err());
        assert!(GeneArchitecture::new(2, vec![], vec![and, t0]).is_err());
    }

    #[test]
    fn test_interns_duplicates() {
        let (and, _, t0, _) = alphabet();
        let arch =
            GeneArchitecture::new(2, vec![and.clone(), and.clone()], vec![t0.clone(), t0.clone()])
                .unwrap();
        assert_eq!(arch.functions().len(), 1);
        assert_eq!(arch.terminals().len(), 1);
        assert_eq!(arch.elements().len(), 2);
        assert_eq!(arch.id_of(&and), Some(arch.functions()[0]));
    }

    #[test]
    fn test_random_gene_respects_tail() {
        let (and, not, t0, t1) = alphabet();
        let arch = GeneArchitecture::new(6, vec![and, not], vec![t0, t1]).unwrap();
        let mut rng = SeededRandom::new(42);
        for _ in 0..200 {
            let gene = arch.create_random_gene(&mut rng);
            assert_eq!(gene.len(), arch.gene_length());
            for (pos, &id) in gene.sequence().iter().enumerate() {
                if !arch.is_head(pos) {
                    assert!(arch.element(id).is_terminal(), "function in tail at {pos}");
                }
            }
        }
    }

    #[test]
    fn test_random_gene_uses_functions_in_head() {
        let (and, _, t0, _) = alphabet();
        let arch = GeneArchitecture::new(8, vec![and], vec![t0]).unwrap();
        let mut rng = SeededRandom::new(1);
        let has_function = (0..50).any(|_| {
            let gene = arch.create_random_gene(&mut rng);
            gene.sequence().iter().any(|&id| arch.element(id).is_function())
        });
        assert!(has_function);
    }

    #[test]
    fn test_from_sequence_infers_head() {
        let (and, _, t0, t1) = alphabet();
        let seq = vec![
            and.clone(),
            t0.clone(),
            and.clone(),
            t1.clone(),
            t0.clone(),
            t1.clone(),
            t0.clone(),
        ];
        let gene = GeneArchitecture::from_sequence(&seq).unwrap();
        let arch = gene.architecture();
        assert_eq!(arch.head_length(), 3);
        assert_eq!(arch.gene_length(), 7);
        assert_eq!(arch.functions().len(), 1);
        assert_eq!(arch.terminals().len(), 2);
    }

    #[test]
    fn test_from_sequence_terminal_only() {
        let (_, _, t0, t1) = alphabet();
        let gene = GeneArchitecture::from_sequence(&[t1, t0]).unwrap();
        assert_eq!(gene.architecture().head_length(), 1);
        assert_eq!(gene.len(), 2);
    }

    #[test]
    fn test_from_sequence_errors() {
        let (and, _, t0, _) = alphabet();
        assert!(GeneArchitecture::<bool>::from_sequence(&[]).is_err());
        // no terminals at all
        assert!(GeneArchitecture::from_sequence(&[and.clone(), and.clone()]).is_err());
        // function too close to the end to be closed by the tail
        assert!(GeneArchitecture::from_sequence(&[t0.clone(), and, t0]).is_err());
    }

    #[test]
    fn test_gene_from_elements_rejects_foreign() {
        let (and, not, t0, _) = alphabet();
        let arch = GeneArchitecture::new(1, vec![and.clone()], vec![t0.clone()]).unwrap();
        assert!(arch.gene_from_elements(&[and.clone(), t0.clone(), t0.clone()]).is_ok());
        assert!(arch.gene_from_elements(&[not, t0.clone(), t0]).is_err());
    }

    #[test]
    fn test_linked_genes() {
        let (and, ..) = alphabet();
        let arch = GeneArchitecture::new(
            2,
            vec![and],
            vec![GeneElement::link(0), GeneElement::link(2)],
        )
        .unwrap();
        let linked: Vec<usize> = arch.linked_genes().collect();
        assert_eq!(linked, vec![0, 2]);
    }
}
