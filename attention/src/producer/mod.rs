//! Event producers competing for the driver's attention
//!
//! - [`Road`] throws alerts at the driver and never waits for an outcome
//! - [`Passenger`] asks questions and waits for each answer before the next

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::arbiter::{ArbiterError, ArbiterResult};
use crate::cancel::CancellationToken;

mod passenger;
mod road;

pub use passenger::Passenger;
pub use road::Road;

/// What a producer did before it stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerStats {
    /// Events accepted by the arbiter (answered, for questions)
    pub submitted: u64,
    /// Replies received (questions only)
    pub replies: u64,
}

/// Turn an arbiter error into a quiet stop or a task failure
///
/// Errors caused by shutdown end the loop normally; anything else is fatal.
fn stop_or_fail(producer: &str, error: ArbiterError, cancel: &CancellationToken) -> ArbiterResult<()> {
    if error.is_shutdown(cancel.is_cancelled()) {
        debug!(%producer, %error, "stop_or_fail: stopping on shutdown");
        Ok(())
    } else {
        warn!(%producer, %error, "Producer failed");
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_or_fail() {
        let cancel = CancellationToken::new();
        assert!(stop_or_fail("road", ArbiterError::Cancelled, &cancel).is_ok());
        assert_eq!(
            stop_or_fail("road", ArbiterError::Closed, &cancel),
            Err(ArbiterError::Closed)
        );

        cancel.cancel();
        assert!(stop_or_fail("road", ArbiterError::Closed, &cancel).is_ok());
        assert!(
            stop_or_fail("passenger", ArbiterError::Contended("x".to_string()), &cancel).is_err()
        );
    }
}
