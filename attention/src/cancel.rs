//! Cooperative cancellation helpers

use std::time::Duration;

pub use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::arbiter::{ArbiterError, ArbiterResult};

/// Sleep for `duration` unless `cancel` fires first
///
/// Returns `ArbiterError::Cancelled` when the sleep was cut short.
pub async fn sleep(duration: Duration, cancel: &CancellationToken) -> ArbiterResult<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(?duration, "sleep: cancelled");
            Err(ArbiterError::Cancelled)
        }
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes() {
        let cancel = CancellationToken::new();
        let start = tokio::time::Instant::now();
        sleep(Duration::from_secs(3), &cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_interrupted() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let start = tokio::time::Instant::now();
        let result = sleep(Duration::from_secs(60), &cancel).await;
        assert_eq!(result, Err(ArbiterError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_sleep_already_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(sleep(Duration::from_secs(60), &cancel).await, Err(ArbiterError::Cancelled));
    }
}
