//! Genome representation.
//!
//! An [`Individual`] owns [`Chromosome`]s, a chromosome owns [`Gene`]s, and a
//! gene is a fixed-length sequence of [`ElementId`] handles into the shared
//! alphabet of its [`GeneArchitecture`]. Decoding a gene reads its sequence
//! breadth-first into an [`ExpressionTree`].

mod architecture;
mod chromosome;
mod element;
mod expression;
mod gene;
mod individual;

pub use architecture::GeneArchitecture;
pub use chromosome::{Chromosome, ChromosomeLayout};
pub use element::{ElementId, FunctionFn, GeneElement, TerminalFn};
pub use expression::{ExpressionNode, ExpressionTree};
pub use gene::Gene;
pub use individual::{Individual, IndividualLayout, Scored};
