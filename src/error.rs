//! Error taxonomy for the GEP engine.
//!
//! All errors are fatal for the call that produced them. No operation in
//! this crate retries or rolls back a partially applied change.

use crate::operators::Granularity;
use thiserror::Error;

/// Errors raised by genome construction, operators, selection and the runner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GepError {
    /// Invalid setup: empty terminal alphabet, bad population size,
    /// out-of-range rates, or two genes that must share an architecture
    /// but do not.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operator was configured for a granularity it does not implement.
    #[error("operator `{operator}` does not apply at {granularity} level")]
    UnsupportedOperation {
        operator: &'static str,
        granularity: Granularity,
    },

    /// A call received arguments it cannot work with, such as a
    /// recombination over fewer than two individuals.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = GepError::Configuration("terminal alphabet is empty".into());
        assert_eq!(
            err.to_string(),
            "configuration error: terminal alphabet is empty"
        );

        let err = GepError::UnsupportedOperation {
            operator: "mutation",
            granularity: Granularity::Population,
        };
        assert_eq!(
            err.to_string(),
            "operator `mutation` does not apply at population level"
        );

        let err = GepError::InvalidArgument("need two individuals".into());
        assert_eq!(err.to_string(), "invalid argument: need two individuals");
    }
}
