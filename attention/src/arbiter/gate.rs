//! Gate arbitration: a single permit around every attention action

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::debug;

use super::error::{ArbiterError, ArbiterResult};
use super::{AttentionArbiter, Strategy};
use crate::cancel::CancellationToken;
use crate::driver::Driver;

/// Callers take the driver's single permit and run the attention action inline
///
/// There is no queue and no driver task. Waiters are not guaranteed to be
/// served in arrival order; only exclusion is.
pub struct Gate {
    driver: Arc<Driver>,
    permit: Semaphore,
}

impl Gate {
    pub fn new(driver: Arc<Driver>) -> Self {
        debug!("Gate::new: called");
        Self {
            driver,
            permit: Semaphore::new(1),
        }
    }

    async fn acquire(&self, cancel: &CancellationToken) -> ArbiterResult<SemaphorePermit<'_>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ArbiterError::Cancelled),
            permit = self.permit.acquire() => permit.map_err(|_| ArbiterError::Closed),
        }
    }
}

#[async_trait]
impl AttentionArbiter for Gate {
    fn strategy(&self) -> Strategy {
        Strategy::Gate
    }

    async fn notify(&self, subject: &str, duration: Duration, cancel: &CancellationToken) -> ArbiterResult<()> {
        debug!(%subject, ?duration, "Gate::notify: called");
        let _permit = self.acquire(cancel).await?;
        self.driver.attend_alert(subject, duration, cancel).await
    }

    async fn ask(&self, subject: &str, cancel: &CancellationToken) -> ArbiterResult<String> {
        debug!(%subject, "Gate::ask: called");
        let _permit = self.acquire(cancel).await?;
        self.driver.answer(subject, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DriverConfig, DurationRange};
    use crate::status::{AttentionKind, MemorySink};

    impl Gate {
        fn is_held(&self) -> bool {
            self.permit.available_permits() == 0
        }
    }

    fn setup(answer_ms: u64) -> (Arc<Gate>, Arc<Driver>, MemorySink) {
        let sink = MemorySink::new();
        let config = DriverConfig {
            answer_ms: DurationRange::fixed(answer_ms),
            ..Default::default()
        };
        let driver = Arc::new(Driver::new(config, Arc::new(sink.clone()), Some(9)));
        (Arc::new(Gate::new(driver.clone())), driver, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_runs_inline() {
        let (gate, driver, sink) = setup(100);
        let cancel = CancellationToken::new();

        let start = tokio::time::Instant::now();
        gate.notify("ambulance", Duration::from_secs(4), &cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(4));
        assert_eq!(driver.stats().alerts_handled, 1);
        assert_eq!(sink.spans().len(), 1);
        assert!(!gate.is_held());
    }

    #[tokio::test(start_paused = true)]
    async fn test_question_waits_for_gate_release() {
        let (gate, _driver, sink) = setup(1_000);
        let cancel = CancellationToken::new();

        let alert = {
            let gate = gate.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { gate.notify("cat on the road", Duration::from_secs(3), &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(gate.is_held());

        let reply = gate.ask("I'm hungry", &cancel).await.unwrap();
        assert_eq!(reply, "Pffft");
        alert.await.unwrap().unwrap();

        let spans = sink.spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].kind, AttentionKind::Alert);
        assert_eq!(spans[1].kind, AttentionKind::Question);
        assert!(spans[1].start >= spans[0].end);
        assert!(sink.is_serialized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_callers_never_overlap() {
        let (gate, driver, sink) = setup(30);
        let cancel = CancellationToken::new();

        let mut tasks = Vec::new();
        for i in 0..8 {
            let gate = gate.clone();
            let cancel = cancel.clone();
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    gate.notify(&format!("truck {}", i), Duration::from_millis(50), &cancel)
                        .await
                        .map(|()| String::new())
                } else {
                    gate.ask(&format!("question {}", i), &cancel).await
                }
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stats = driver.stats();
        assert_eq!(stats.alerts_handled, 4);
        assert_eq!(stats.questions_answered, 4);
        assert_eq!(sink.spans().len(), 8);
        assert!(sink.is_serialized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_observes_cancellation() {
        let (gate, _driver, _sink) = setup(100);
        let cancel = CancellationToken::new();
        let holder_cancel = CancellationToken::new();

        let holder = {
            let gate = gate.clone();
            let holder_cancel = holder_cancel.clone();
            tokio::spawn(async move { gate.notify("drunk driver", Duration::from_secs(60), &holder_cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;

        let waiter = {
            let gate = gate.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { gate.ask("are we there yet?", &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;
        cancel.cancel();

        assert_eq!(waiter.await.unwrap(), Err(ArbiterError::Cancelled));
        holder_cancel.cancel();
        assert_eq!(holder.await.unwrap(), Err(ArbiterError::Cancelled));
        assert!(!gate.is_held());
    }

    #[tokio::test]
    async fn test_closed_gate() {
        let (gate, _driver, _sink) = setup(100);
        gate.permit.close();
        let cancel = CancellationToken::new();
        assert_eq!(gate.ask("I'm bored", &cancel).await, Err(ArbiterError::Closed));
    }
}
