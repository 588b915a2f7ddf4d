//! Multi-gene chromosomes composed through a linking gene.

use super::architecture::GeneArchitecture;
use super::expression::ExpressionNode;
use super::gene::Gene;
use crate::error::{GepError, Result};
use crate::random::RandomSource;
use std::fmt;
use std::sync::Arc;

/// Per-position architectures of a chromosome plus the index of its
/// linking gene. Acts as the factory for random chromosomes.
///
/// Only the linking gene's architecture may contain linking terminals, and
/// they must point at other, in-range genes. A single-gene layout uses gene
/// 0 as its own linking gene.
pub struct ChromosomeLayout<T, C = ()> {
    architectures: Vec<Arc<GeneArchitecture<T, C>>>,
    linking_gene: usize,
}

impl<T, C> ChromosomeLayout<T, C> {
    /// # Errors
    /// [`GepError::Configuration`] when the layout is empty or its links are
    /// inconsistent.
    pub fn new(architectures: Vec<Arc<GeneArchitecture<T, C>>>, linking_gene: usize) -> Result<Self> {
        validate_links(&architectures, linking_gene)?;
        Ok(Self {
            architectures,
            linking_gene,
        })
    }

    /// Layout with one gene and no linking.
    pub fn single(architecture: Arc<GeneArchitecture<T, C>>) -> Result<Self> {
        Self::new(vec![architecture], 0)
    }

    pub fn architectures(&self) -> &[Arc<GeneArchitecture<T, C>>] {
        &self.architectures
    }

    pub fn linking_gene(&self) -> usize {
        self.linking_gene
    }

    pub fn gene_count(&self) -> usize {
        self.architectures.len()
    }

    pub fn create_random<R: RandomSource>(&self, rng: &mut R) -> Chromosome<T, C> {
        Chromosome {
            genes: self
                .architectures
                .iter()
                .map(|a| a.create_random_gene(rng))
                .collect(),
            linking_gene: self.linking_gene,
        }
    }
}

impl<T, C> Clone for ChromosomeLayout<T, C> {
    fn clone(&self) -> Self {
        Self {
            architectures: self.architectures.clone(),
            linking_gene: self.linking_gene,
        }
    }
}

impl<T, C> fmt::Debug for ChromosomeLayout<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromosomeLayout")
            .field("architectures", &self.architectures)
            .field("linking_gene", &self.linking_gene)
            .finish()
    }
}

fn validate_links<T, C>(architectures: &[Arc<GeneArchitecture<T, C>>], linking_gene: usize) -> Result<()> {
    if architectures.is_empty() {
        return Err(GepError::Configuration(
            "a chromosome needs at least one gene".into(),
        ));
    }
    if linking_gene >= architectures.len() {
        return Err(GepError::Configuration(format!(
            "linking gene {linking_gene} outside chromosome of {} genes",
            architectures.len()
        )));
    }
    for (index, architecture) in architectures.iter().enumerate() {
        for target in architecture.linked_genes() {
            if index != linking_gene {
                return Err(GepError::Configuration(format!(
                    "gene {index} contains a link but is not the linking gene"
                )));
            }
            if target == linking_gene || target >= architectures.len() {
                return Err(GepError::Configuration(format!(
                    "link to gene {target} does not name another gene of the chromosome"
                )));
            }
        }
    }
    Ok(())
}

/// Ordered genes plus a designated linking gene.
///
/// Evaluating the chromosome evaluates its linking gene; every linking
/// terminal met on the way is resolved by index to another gene of the same
/// chromosome and evaluated in place. Links are positions, not references,
/// so a chromosome can be cloned or have genes swapped freely.
pub struct Chromosome<T, C = ()> {
    genes: Vec<Gene<T, C>>,
    linking_gene: usize,
}

impl<T, C> Chromosome<T, C> {
    /// Assembles a chromosome from existing genes.
    ///
    /// # Errors
    /// [`GepError::Configuration`] under the same rules as
    /// [`ChromosomeLayout::new`].
    pub fn new(genes: Vec<Gene<T, C>>, linking_gene: usize) -> Result<Self> {
        let architectures: Vec<_> = genes.iter().map(|g| Arc::clone(g.architecture())).collect();
        validate_links(&architectures, linking_gene)?;
        Ok(Self {
            genes,
            linking_gene,
        })
    }

    pub fn genes(&self) -> &[Gene<T, C>] {
        &self.genes
    }

    /// Mutable view of the genes. The slice keeps the gene count fixed.
    pub(crate) fn genes_mut(&mut self) -> &mut [Gene<T, C>] {
        &mut self.genes
    }

    pub fn gene(&self, index: usize) -> &Gene<T, C> {
        &self.genes[index]
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn linking_gene(&self) -> usize {
        self.linking_gene
    }

    /// Gene a linking terminal with `gene_index` resolves to.
    pub fn linked(&self, gene_index: usize) -> Option<&Gene<T, C>> {
        if gene_index == self.linking_gene {
            return None;
        }
        self.genes.get(gene_index)
    }

    /// Same gene count, same linking gene and the same architecture at every
    /// position.
    pub fn is_compatible(&self, other: &Chromosome<T, C>) -> bool {
        self.linking_gene == other.linking_gene
            && self.genes.len() == other.genes.len()
            && self
                .genes
                .iter()
                .zip(&other.genes)
                .all(|(a, b)| a.shares_architecture(b))
    }

    pub fn is_valid(&self) -> bool {
        self.genes.iter().all(|g| g.is_valid())
    }

    /// Evaluates the whole chromosome through its linking gene.
    pub fn evaluate(&self, context: &C) -> T {
        self.evaluate_gene(self.linking_gene, context)
    }

    fn evaluate_gene(&self, index: usize, context: &C) -> T {
        self.genes[index].evaluate_with(context, &mut |linked| self.evaluate_gene(linked, context))
    }

    fn write_node(&self, gene: &Gene<T, C>, node: &ExpressionNode, out: &mut String) {
        let element = gene.architecture().element(node.element());
        match element.linked_gene() {
            Some(target) => out.push_str(&self.genes[target].to_string()),
            None => {
                out.push_str(element.symbol());
                if !node.is_leaf() {
                    out.push('(');
                    for (i, child) in node.children().iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.write_node(gene, child, out);
                    }
                    out.push(')');
                }
            }
        }
    }
}

impl<T, C> Clone for Chromosome<T, C> {
    fn clone(&self) -> Self {
        Self {
            genes: self.genes.clone(),
            linking_gene: self.linking_gene,
        }
    }
}

impl<T, C> PartialEq for Chromosome<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.linking_gene == other.linking_gene && self.genes == other.genes
    }
}

impl<T, C> fmt::Debug for Chromosome<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chromosome")
            .field("genes", &self.genes)
            .field("linking_gene", &self.linking_gene)
            .finish()
    }
}

/// Prefix notation of the linking gene with every link expanded.
impl<T, C> fmt::Display for Chromosome<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gene = &self.genes[self.linking_gene];
        let tree = gene.express();
        let mut out = String::new();
        self.write_node(gene, tree.root(), &mut out);
        f.write_str(&out)
    }
}
