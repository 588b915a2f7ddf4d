//! Gene Expression Programming engine.
//!
//! Evolves populations of fixed-length linear genes that decode
//! deterministically (Karva notation, breadth first) into expression trees.
//!
//! - **Genome**: [`genome`] holds gene elements, gene architectures
//!   (head/tail layout), genes with a cached decode, multigenic chromosomes
//!   with an optional linking gene, and individuals.
//! - **Operators**: [`operators`] implements point mutation, inversion,
//!   IS and root transposition, and gene, one-point and two-point
//!   recombination, each at a fixed granularity.
//! - **Selection**: [`selection`] keeps the best individuals unchanged and
//!   fills the rest by roulette wheel or tournament.
//! - **Engine**: [`engine`] runs evaluate → select → reproduce until a
//!   target fitness or generation limit is reached.
//!
//! All randomness flows through [`random::RandomSource`], so a run with a
//! fixed seed is reproducible.
//!
//! # Example
//!
//! ```
//! use u_gep::engine::{GepConfig, GepRunner};
//! use u_gep::genome::{ChromosomeLayout, GeneArchitecture, GeneElement, Individual, IndividualLayout};
//!
//! // Boolean functions of two inputs; find XOR.
//! let and = GeneElement::function("and", "&", 2, |v: &[bool]| v[0] && v[1]);
//! let or = GeneElement::function("or", "|", 2, |v: &[bool]| v[0] || v[1]);
//! let not = GeneElement::function("not", "!", 1, |v: &[bool]| !v[0]);
//! let a = GeneElement::terminal("a", "a", |ctx: &(bool, bool)| ctx.0);
//! let b = GeneElement::terminal("b", "b", |ctx: &(bool, bool)| ctx.1);
//! let arch = GeneArchitecture::new(7, vec![and, or, not], vec![a, b]).unwrap();
//! let layout = IndividualLayout::single(ChromosomeLayout::single(arch).unwrap());
//!
//! let cases = [(false, false), (false, true), (true, false), (true, true)];
//! let hits = |ind: &Individual<bool, (bool, bool)>| {
//!     cases.iter().filter(|&&c| ind.evaluate(&c)[0] == (c.0 ^ c.1)).count() as f64
//! };
//!
//! let config = GepConfig::default()
//!     .with_population_size(50)
//!     .with_max_generations(200)
//!     .with_target_fitness(4.0)
//!     .with_seed(42);
//! let result = GepRunner::run(&layout, &hits, &config).unwrap();
//! println!("{} (fitness {})", result.best, result.best_fitness);
//! ```

pub mod engine;
pub mod error;
pub mod genome;
pub mod operators;
pub mod random;
pub mod selection;

pub use engine::{FitnessEvaluator, GepConfig, GepResult, GepRunner};
pub use error::{GepError, Result};
