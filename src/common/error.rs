//! Error types for journey_control

use thiserror::Error;

use crate::common::types::Curve;
use crate::config::ConfigError;

/// Main error type for curve generation
///
/// All variants are local to a single entity's curve; the batch generator
/// records them and carries on with the other entities.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Start or goal pose contains NaN or infinite values
    #[error("Invalid journey: {0}")]
    InvalidJourney(String),

    /// Feedback simulation hit its step cap before reaching the goal radius.
    /// `partial` holds the points accumulated so far.
    #[error("Did not converge after {iterations} iterations ({} points generated)", .partial.len())]
    DidNotConverge {
        iterations: usize,
        partial: Curve,
    },

    /// No path family produced a real, non-negative solution
    #[error("No feasible path: {0}")]
    NoFeasiblePath(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration file could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Visualization error
    #[error("Visualization error: {0}")]
    Visualization(String),
}

impl ControlError {
    /// Partial curve carried by a `DidNotConverge` error, if any
    pub fn partial_curve(&self) -> Option<&Curve> {
        match self {
            ControlError::DidNotConverge { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// Take ownership of the partial curve of a `DidNotConverge` error
    pub fn into_partial_curve(self) -> Option<Curve> {
        match self {
            ControlError::DidNotConverge { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// Result type alias for controller operations
pub type ControlResult<T> = Result<T, ControlError>;
