//! Error types for the Flock environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// Lower bound exceeds upper bound (or the bounds are not comparable)
    #[error("Invalid bounds: lower {lower} is not <= upper {upper}")]
    InvalidBounds { lower: String, upper: String },

    /// Identifier text could not be parsed
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl EnvError {
    /// Creates a bounds error.
    pub fn invalid_bounds(lower: impl std::fmt::Debug, upper: impl std::fmt::Debug) -> Self {
        Self::InvalidBounds {
            lower: format!("{:?}", lower),
            upper: format!("{:?}", upper),
        }
    }

    /// Creates an identifier error.
    pub fn invalid_identifier(text: impl Into<String>) -> Self {
        Self::InvalidIdentifier(text.into())
    }
}
