//! Arbiter error types

use thiserror::Error;

/// Errors from submitting work to the driver
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArbiterError {
    #[error("Driver channel closed")]
    Closed,

    #[error("Cancelled while waiting for the driver")]
    Cancelled,

    #[error("Driver dropped the reply for {0:?}")]
    ReplyDropped(String),

    #[error("Driver already busy with {0:?}")]
    Contended(String),
}

impl ArbiterError {
    /// Check if this error is an expected consequence of shutting down
    ///
    /// `Closed` and `ReplyDropped` only count when cancellation was already requested.
    pub fn is_shutdown(&self, cancelled: bool) -> bool {
        match self {
            ArbiterError::Cancelled => true,
            ArbiterError::Closed | ArbiterError::ReplyDropped(_) => cancelled,
            ArbiterError::Contended(_) => false,
        }
    }
}

/// Response from arbiter operations
pub type ArbiterResult<T> = Result<T, ArbiterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_shutdown() {
        assert!(ArbiterError::Cancelled.is_shutdown(false));
        assert!(ArbiterError::Closed.is_shutdown(true));
        assert!(!ArbiterError::Closed.is_shutdown(false));
        assert!(ArbiterError::ReplyDropped("I'm bored".to_string()).is_shutdown(true));
        assert!(!ArbiterError::Contended("ambulance".to_string()).is_shutdown(true));
    }

    #[test]
    fn test_display() {
        assert_eq!(ArbiterError::Closed.to_string(), "Driver channel closed");
        assert!(
            ArbiterError::Contended("ambulance".to_string())
                .to_string()
                .contains("ambulance")
        );
    }
}
