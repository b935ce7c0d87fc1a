//! Error types for the GAP learner
//!
//! Provides a unified error type for caller contract violations, growth
//! failures and configuration problems. "No path" is not an error: planners
//! report it as `Ok(None)`.

use thiserror::Error;

use crate::types::ids::StateId;

/// Result type alias using GapError
pub type Result<T> = std::result::Result<T, GapError>;

/// Unified error type for GAP operations
#[derive(Debug, Error)]
pub enum GapError {
    // Caller contract violations
    #[error("Invalid action {action}: action space is [0, {action_count})")]
    InvalidAction { action: u32, action_count: usize },

    #[error("Unknown state: {0}")]
    UnknownState(StateId),

    // Growth errors
    #[error("State space limit reached: {limit} states")]
    CapacityExceeded { limit: usize },

    #[error("Table allocation failed: {0}")]
    Allocation(String),

    // Search guard
    #[error("Search frontier exceeded {limit} entries")]
    FrontierExceeded { limit: usize },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::collections::TryReserveError> for GapError {
    fn from(err: std::collections::TryReserveError) -> Self {
        GapError::Allocation(err.to_string())
    }
}

impl From<anyhow::Error> for GapError {
    fn from(err: anyhow::Error) -> Self {
        GapError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GapError::InvalidAction {
            action: 9,
            action_count: 4,
        };
        assert!(err.to_string().contains("[0, 4)"));
    }

    #[test]
    fn test_unknown_state_display() {
        let err = GapError::UnknownState(StateId(12));
        assert!(err.to_string().contains("s12"));
    }

    #[test]
    fn test_try_reserve_conversion() {
        let mut v: Vec<u8> = Vec::new();
        let err: GapError = v.try_reserve(usize::MAX).unwrap_err().into();
        assert!(matches!(err, GapError::Allocation(_)));
    }
}
