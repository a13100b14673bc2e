//! Configuration errors shared by the graph, the agents and the engine.

use shepherd_env::EnvError;
use thiserror::Error;

/// Errors raised while validating configuration.
///
/// These only ever surface at construction time; a running simulation has
/// no recoverable error path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A count range has `lower > upper`
    #[error("Invalid bounds for {field}: {source}")]
    Bounds {
        field: &'static str,
        #[source]
        source: EnvError,
    },

    /// A weight range falls outside `(0, max]`
    #[error("{field} weights must lie in (0, {max}], got {lower}..={upper}")]
    WeightRange {
        field: &'static str,
        lower: f64,
        upper: f64,
        max: f64,
    },

    /// A probability falls outside `[0, 1]`
    #[error("{field} must be a probability in [0, 1], got {value}")]
    Probability { field: &'static str, value: f64 },

    /// A size that must be at least one is zero
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    /// Feed mix percentages do not add up
    #[error("Feed mix must sum to {expected}%, got {actual}%")]
    FeedMixTotal { expected: u32, actual: u32 },
}

impl ConfigError {
    /// Creates a bounds error for the named field.
    pub fn bounds(field: &'static str, lower: impl std::fmt::Debug, upper: impl std::fmt::Debug) -> Self {
        Self::Bounds {
            field,
            source: EnvError::invalid_bounds(lower, upper),
        }
    }
}
