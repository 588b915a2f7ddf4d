//! Generational loop.
//!
//! Users describe the genome with an [`IndividualLayout`](crate::genome::IndividualLayout)
//! and score individuals with a [`FitnessEvaluator`]; [`GepRunner`] does the
//! rest.
//!
//! # Key Types
//!
//! - [`GepConfig`]: Run parameters (population size, selection, operator rates)
//! - [`GepRunner`]: Executes the evolutionary loop
//! - [`GepResult`]: Best individual and per-generation [`GenerationStats`]
//!
//! # References
//!
//! - Ferreira (2001), "Gene Expression Programming: a New Adaptive Algorithm
//!   for Solving Problems", Complex Systems 13(2)
//! - Ferreira (2006), *Gene Expression Programming: Mathematical Modeling by
//!   an Artificial Intelligence*, 2nd ed.

mod config;
mod runner;
mod types;

pub use config::GepConfig;
pub use runner::{GenerationStats, GepResult, GepRunner};
pub use types::FitnessEvaluator;
