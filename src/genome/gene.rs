//! Fixed-length linear genes and their cached expression.

use super::architecture::GeneArchitecture;
use super::element::{ElementId, ElementKind, GeneElement};
use super::expression::{ExpressionNode, ExpressionTree};
use crate::error::{GepError, Result};
use std::fmt;
use std::ops::Range;
use std::sync::{Arc, OnceLock};

/// A fixed-length sequence of element handles conforming to one
/// [`GeneArchitecture`].
///
/// The decoded tree is computed on first [`express`](Gene::express) and kept
/// until the sequence is written. Every write in the crate goes through a
/// single entry point that drops the cached tree first, so `express` never
/// observes a stale decode.
pub struct Gene<T, C = ()> {
    architecture: Arc<GeneArchitecture<T, C>>,
    sequence: Vec<ElementId>,
    expression: OnceLock<Arc<ExpressionTree>>,
}

impl<T, C> Gene<T, C> {
    pub(crate) fn new_unchecked(architecture: Arc<GeneArchitecture<T, C>>, sequence: Vec<ElementId>) -> Self {
        let gene = Self {
            architecture,
            sequence,
            expression: OnceLock::new(),
        };
        debug_assert!(gene.is_valid(), "gene built with an invalid sequence");
        gene
    }

    /// Builds a gene from handles issued by `architecture`.
    ///
    /// # Errors
    /// [`GepError::Configuration`] when the length differs from the
    /// architecture's gene length, a handle is foreign, or a function sits
    /// in the tail.
    pub fn from_ids(architecture: Arc<GeneArchitecture<T, C>>, sequence: Vec<ElementId>) -> Result<Self> {
        if sequence.len() != architecture.gene_length() {
            return Err(GepError::Configuration(format!(
                "gene length {} does not match architecture gene length {}",
                sequence.len(),
                architecture.gene_length()
            )));
        }
        if let Some(pos) = sequence.iter().position(|&id| !architecture.contains(id)) {
            return Err(GepError::Configuration(format!(
                "element at position {pos} is not part of the architecture"
            )));
        }
        if let Some(pos) = (architecture.head_length()..sequence.len())
            .find(|&pos| architecture.element(sequence[pos]).is_function())
        {
            return Err(GepError::Configuration(format!(
                "function in tail position {pos}"
            )));
        }
        Ok(Self::new_unchecked(architecture, sequence))
    }

    pub fn architecture(&self) -> &Arc<GeneArchitecture<T, C>> {
        &self.architecture
    }

    pub fn sequence(&self) -> &[ElementId] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Always `false`: a gene holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn element_at(&self, position: usize) -> &Arc<GeneElement<T, C>> {
        self.architecture.element(self.sequence[position])
    }

    /// Returns `true` when `other` was built under the same architecture.
    pub fn shares_architecture(&self, other: &Gene<T, C>) -> bool {
        Arc::ptr_eq(&self.architecture, &other.architecture)
    }

    /// Decoded expression tree, computed once per sequence state.
    pub fn express(&self) -> Arc<ExpressionTree> {
        Arc::clone(
            self.expression
                .get_or_init(|| Arc::new(ExpressionTree::decode(&self.architecture, &self.sequence))),
        )
    }

    /// Whether a decoded tree is currently cached.
    pub fn is_expressed(&self) -> bool {
        self.expression.get().is_some()
    }

    /// Replaces the element at `position`.
    ///
    /// # Errors
    /// [`GepError::InvalidArgument`] for an out-of-range position,
    /// [`GepError::Configuration`] for a foreign handle or a function in the
    /// tail.
    pub fn set(&mut self, position: usize, id: ElementId) -> Result<()> {
        if position >= self.sequence.len() {
            return Err(GepError::InvalidArgument(format!(
                "position {position} outside gene of length {}",
                self.sequence.len()
            )));
        }
        if !self.architecture.contains(id) {
            return Err(GepError::Configuration(
                "element is not part of the architecture".into(),
            ));
        }
        if !self.architecture.is_head(position) && self.architecture.element(id).is_function() {
            return Err(GepError::Configuration(format!(
                "function in tail position {position}"
            )));
        }
        self.sequence_mut()[position] = id;
        Ok(())
    }

    /// The only write path to the sequence. Drops the cached tree before
    /// handing out the slice; the length cannot change through it.
    pub(crate) fn sequence_mut(&mut self) -> &mut [ElementId] {
        self.expression.take();
        &mut self.sequence
    }

    /// Exchanges `range` of this gene's sequence with the same range of
    /// `other`.
    ///
    /// # Errors
    /// [`GepError::Configuration`] when the genes do not share an
    /// architecture, [`GepError::InvalidArgument`] when `range` is reversed
    /// or runs past the end of the gene.
    pub fn swap_range(&mut self, other: &mut Gene<T, C>, range: Range<usize>) -> Result<()> {
        if !self.shares_architecture(other) {
            return Err(GepError::Configuration(
                "cannot exchange segments between genes of different architectures".into(),
            ));
        }
        if range.start > range.end || range.end > self.sequence.len() {
            return Err(GepError::InvalidArgument(format!(
                "range {}..{} outside gene of length {}",
                range.start,
                range.end,
                self.sequence.len()
            )));
        }
        if range.is_empty() {
            return Ok(());
        }
        self.sequence_mut()[range.clone()].swap_with_slice(&mut other.sequence_mut()[range]);
        Ok(())
    }

    /// Checks the length and tail invariants.
    pub fn is_valid(&self) -> bool {
        self.sequence.len() == self.architecture.gene_length()
            && self.sequence.iter().all(|&id| self.architecture.contains(id))
            && self.sequence[self.architecture.head_length().min(self.sequence.len())..]
                .iter()
                .all(|&id| self.architecture.element(id).is_terminal())
    }

    /// Karva notation: the raw sequence of symbols.
    pub fn karva(&self) -> String {
        self.sequence
            .iter()
            .map(|&id| self.architecture.element(id).symbol())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Evaluates the expressed tree against `context`.
    ///
    /// # Errors
    /// [`GepError::InvalidArgument`] when the gene's alphabet contains
    /// linking terminals; such genes only make sense inside a
    /// [`Chromosome`](super::Chromosome).
    pub fn evaluate(&self, context: &C) -> Result<T> {
        if self.architecture.linked_genes().next().is_some() {
            return Err(GepError::InvalidArgument(
                "gene uses linking terminals; evaluate it through its chromosome".into(),
            ));
        }
        Ok(self.evaluate_with(context, &mut |_: usize| -> T {
            unreachable!("alphabet has no linking terminals")
        }))
    }

    /// Evaluates the expressed tree, resolving linking terminals through
    /// `link`.
    pub fn evaluate_with(&self, context: &C, link: &mut dyn FnMut(usize) -> T) -> T {
        let tree = self.express();
        self.evaluate_node(tree.root(), context, link)
    }

    fn evaluate_node(&self, node: &ExpressionNode, context: &C, link: &mut dyn FnMut(usize) -> T) -> T {
        match self.architecture.element(node.element()).kind() {
            ElementKind::Terminal(eval) => eval(context),
            ElementKind::Link(gene) => link(*gene),
            ElementKind::Function { eval, .. } => {
                let mut args = Vec::with_capacity(node.children().len());
                for child in node.children() {
                    args.push(self.evaluate_node(child, context, link));
                }
                eval(&args)
            }
        }
    }

    fn write_prefix(&self, node: &ExpressionNode, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.architecture.element(node.element()).symbol())?;
        if !node.is_leaf() {
            f.write_str("(")?;
            for (i, child) in node.children().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                self.write_prefix(child, f)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl<T, C> Clone for Gene<T, C> {
    /// Copies the sequence; the clone decodes its own tree on demand.
    fn clone(&self) -> Self {
        Self {
            architecture: Arc::clone(&self.architecture),
            sequence: self.sequence.clone(),
            expression: OnceLock::new(),
        }
    }
}

impl<T, C> PartialEq for Gene<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.shares_architecture(other) && self.sequence == other.sequence
    }
}

impl<T, C> fmt::Debug for Gene<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gene")
            .field("head_length", &self.architecture.head_length())
            .field("karva", &self.karva())
            .field("expressed", &self.is_expressed())
            .finish()
    }
}

/// Prefix notation of the expressed tree, e.g. `and(a, not(b))`.
impl<T, C> fmt::Display for Gene<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.express();
        self.write_prefix(tree.root(), f)
    }
}
