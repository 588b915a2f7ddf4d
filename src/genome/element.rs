//! The gene alphabet: terminals, functions and linking terminals.

use std::fmt;
use std::sync::Arc;

/// Handle of an element inside a [`GeneArchitecture`](super::GeneArchitecture).
///
/// Genes store handles, never the elements themselves. A handle is only
/// meaningful together with the architecture that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    /// Position of the element in its architecture's element table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Evaluation function of a terminal: a pure function of the external context.
pub type TerminalFn<T, C> = dyn Fn(&C) -> T + Send + Sync;

/// Evaluation function of a function element over its ordered child values.
pub type FunctionFn<T> = dyn Fn(&[T]) -> T + Send + Sync;

pub(crate) enum ElementKind<T, C> {
    Terminal(Box<TerminalFn<T, C>>),
    Function {
        arity: usize,
        eval: Box<FunctionFn<T>>,
    },
    /// Homoeotic terminal deferring to the gene at this chromosome index.
    Link(usize),
}

/// One symbol of the gene alphabet.
///
/// Elements are immutable and shared behind [`Arc`] by every gene of every
/// individual in a population. Constructors therefore return `Arc<Self>`.
///
/// `T` is the value produced by evaluation, `C` the external context that
/// terminals read (defaults to `()`).
///
/// # Examples
///
/// ```
/// use u_gep::genome::GeneElement;
///
/// let and = GeneElement::<bool>::function("and", "&", 2, |v| v[0] && v[1]);
/// let yes = GeneElement::<bool>::constant("true", "1", true);
/// assert_eq!(and.arity(), 2);
/// assert!(yes.is_terminal());
/// ```
pub struct GeneElement<T, C = ()> {
    name: String,
    symbol: String,
    kind: ElementKind<T, C>,
}

impl<T, C> GeneElement<T, C> {
    /// Terminal computing its value from the evaluation context.
    pub fn terminal<F>(name: impl Into<String>, symbol: impl Into<String>, eval: F) -> Arc<Self>
    where
        F: Fn(&C) -> T + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            symbol: symbol.into(),
            kind: ElementKind::Terminal(Box::new(eval)),
        })
    }

    /// Terminal that always yields `value`.
    pub fn constant(name: impl Into<String>, symbol: impl Into<String>, value: T) -> Arc<Self>
    where
        T: Clone + Send + Sync + 'static,
    {
        Self::terminal(name, symbol, move |_: &C| value.clone())
    }

    /// Function combining `arity` child values.
    ///
    /// # Panics
    /// Panics if `arity` is zero; zero-arity symbols are terminals.
    pub fn function<F>(
        name: impl Into<String>,
        symbol: impl Into<String>,
        arity: usize,
        eval: F,
    ) -> Arc<Self>
    where
        F: Fn(&[T]) -> T + Send + Sync + 'static,
    {
        assert!(arity >= 1, "function elements need arity >= 1");
        Arc::new(Self {
            name: name.into(),
            symbol: symbol.into(),
            kind: ElementKind::Function {
                arity,
                eval: Box::new(eval),
            },
        })
    }

    /// Linking (homoeotic) terminal referring to gene `gene_index` of the
    /// chromosome that evaluates it.
    pub fn link(gene_index: usize) -> Arc<Self> {
        Arc::new(Self {
            name: format!("link to gene {gene_index}"),
            symbol: format!("G{gene_index}"),
            kind: ElementKind::Link(gene_index),
        })
    }

    /// Number of children this element consumes when decoded.
    pub fn arity(&self) -> usize {
        match &self.kind {
            ElementKind::Function { arity, .. } => *arity,
            ElementKind::Terminal(_) | ElementKind::Link(_) => 0,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, ElementKind::Function { .. })
    }

    /// Terminals include linking terminals.
    pub fn is_terminal(&self) -> bool {
        !self.is_function()
    }

    /// Index of the gene a linking terminal defers to.
    pub fn linked_gene(&self) -> Option<usize> {
        match self.kind {
            ElementKind::Link(index) => Some(index),
            _ => None,
        }
    }

    /// Long, human readable description.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short symbol used in Karva and prefix notation.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub(crate) fn kind(&self) -> &ElementKind<T, C> {
        &self.kind
    }
}

impl<T, C> fmt::Debug for GeneElement<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ElementKind::Terminal(_) => "terminal",
            ElementKind::Function { .. } => "function",
            ElementKind::Link(_) => "link",
        };
        f.debug_struct("GeneElement")
            .field("name", &self.name)
            .field("symbol", &self.symbol)
            .field("kind", &kind)
            .field("arity", &self.arity())
            .finish()
    }
}

impl<T, C> fmt::Display for GeneElement<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}
