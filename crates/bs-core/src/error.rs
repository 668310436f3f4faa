//! Error types for BitSlot

use thiserror::Error;

/// Core error type
///
/// Gameplay conditions (`InsufficientBalance`, `SpinInProgress`, `InvalidBet`)
/// are returned to the caller as values. `InvalidConfiguration` and
/// `MissingGridReference` indicate a broken deployment and are fatal at startup.
#[derive(Error, Debug)]
pub enum BsError {
    #[error("Insufficient balance: {balance} available, bet is {bet}")]
    InsufficientBalance { balance: f64, bet: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Missing grid reference: no cell at row {row}, col {col}")]
    MissingGridReference { row: usize, col: usize },

    #[error("A spin is already being resolved")]
    SpinInProgress,

    #[error("Invalid bet: {0}")]
    InvalidBet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BsError {
    /// True for errors that reject a single spin but leave the session usable
    pub fn is_gameplay(&self) -> bool {
        matches!(
            self,
            Self::InsufficientBalance { .. } | Self::SpinInProgress | Self::InvalidBet(_)
        )
    }
}

/// Result type alias
pub type BsResult<T> = Result<T, BsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gameplay_classification() {
        assert!(BsError::SpinInProgress.is_gameplay());
        assert!(
            BsError::InsufficientBalance {
                balance: 3.0,
                bet: 10.0
            }
            .is_gameplay()
        );
        assert!(!BsError::InvalidConfiguration("empty catalog".into()).is_gameplay());
        assert!(!BsError::MissingGridReference { row: 9, col: 0 }.is_gameplay());
    }

    #[test]
    fn test_display() {
        let err = BsError::MissingGridReference { row: 5, col: 2 };
        assert_eq!(err.to_string(), "Missing grid reference: no cell at row 5, col 2");
    }
}
