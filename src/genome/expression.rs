//! Decoded expression trees.

use super::architecture::GeneArchitecture;
use super::element::ElementId;

/// One node of a decoded gene.
///
/// Nodes own their children exclusively; the element they carry is a handle
/// into the shared architecture alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionNode {
    element: ElementId,
    position: usize,
    children: Vec<ExpressionNode>,
}

impl ExpressionNode {
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Index in the gene sequence this node was read from.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn children(&self) -> &[ExpressionNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }
}

/// Tree decoded from a gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionTree {
    root: ExpressionNode,
    coding_length: usize,
}

impl ExpressionTree {
    /// Breadth-first (Karva) decode of `sequence`.
    ///
    /// Reading the sequence left to right is the breadth-first traversal of
    /// the tree: the unread positions between `next` and `cursor` form the
    /// FIFO of nodes awaiting their children, and each dequeued node claims
    /// the next `arity` positions. The architecture guarantees `cursor`
    /// never passes the end of the sequence.
    pub(crate) fn decode<T, C>(architecture: &GeneArchitecture<T, C>, sequence: &[ElementId]) -> Self {
        let arity = |pos: usize| architecture.element(sequence[pos]).arity();

        let mut first_child = Vec::with_capacity(sequence.len());
        let mut cursor = 1;
        let mut next = 0;
        while next < cursor {
            first_child.push(cursor);
            cursor += arity(next);
            next += 1;
        }
        debug_assert!(cursor <= sequence.len(), "decode read past the gene end");

        // Children always sit at higher positions than their parent, so
        // assembling back to front sees every child before its parent.
        let mut built: Vec<Option<ExpressionNode>> = vec![None; cursor];
        for pos in (0..cursor).rev() {
            let start = first_child[pos];
            let children = (start..start + arity(pos))
                .map(|c| built[c].take().expect("child assembled before parent"))
                .collect();
            built[pos] = Some(ExpressionNode {
                element: sequence[pos],
                position: pos,
                children,
            });
        }

        Self {
            root: built[0].take().expect("gene has a root"),
            coding_length: cursor,
        }
    }

    pub fn root(&self) -> &ExpressionNode {
        &self.root
    }

    /// Number of sequence positions expressed in the tree (the open reading
    /// frame). Positions past it are non-coding.
    pub fn coding_length(&self) -> usize {
        self.coding_length
    }

    /// Number of nodes; equal to the coding length.
    pub fn size(&self) -> usize {
        self.coding_length
    }

    /// Levels from root to the deepest leaf; a lone terminal has depth 1.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Nodes in breadth-first order, which is also sequence order.
    pub fn breadth_first(&self) -> Vec<&ExpressionNode> {
        let mut out = vec![&self.root];
        let mut next = 0;
        while next < out.len() {
            let node = out[next];
            out.extend(node.children.iter());
            next += 1;
        }
        out
    }
}
