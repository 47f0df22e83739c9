//! Error types for RSO

use thiserror::Error;

/// Main error type for RSO
#[derive(Error, Debug)]
pub enum RsoError {
    /// Manual amount was non-numeric, non-positive or over the usage limit
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Cannot remove {requested} GB: only {available} GB in use")]
    InsufficientUsage { requested: u64, available: u64 },

    /// Configuration or learner parameters out of range
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RsoError {
    /// Whether this error is a rejected manual operation (no state was touched)
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            RsoError::InvalidAmount(_) | RsoError::InsufficientUsage { .. }
        )
    }
}

/// Result type alias for RSO operations
pub type Result<T> = std::result::Result<T, RsoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        assert!(RsoError::InvalidAmount("-3".to_string()).is_rejection());
        assert!(RsoError::InsufficientUsage {
            requested: 30,
            available: 20
        }
        .is_rejection());
        assert!(!RsoError::Config("bad".to_string()).is_rejection());
    }

    #[test]
    fn test_insufficient_usage_message() {
        let err = RsoError::InsufficientUsage {
            requested: 30,
            available: 20,
        };
        assert_eq!(err.to_string(), "Cannot remove 30 GB: only 20 GB in use");
    }
}
