//! Mailbox arbitration: one queue, one driver loop

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::error::{ArbiterError, ArbiterResult};
use super::{AttentionArbiter, Strategy};
use crate::cancel::CancellationToken;
use crate::driver::{Driver, DriverMessage, DriverStats, reply_slot};

/// The driver loop
///
/// Owns the receiving end of the mailbox. Events are handled one at a time
/// in submission order until cancellation or until every handle is gone.
pub struct Mailbox {
    driver: Arc<Driver>,
    rx: mpsc::UnboundedReceiver<DriverMessage>,
}

impl Mailbox {
    /// Create a mailbox for `driver` and the first handle to it
    pub fn new(driver: Arc<Driver>) -> (Self, MailboxHandle) {
        debug!("Mailbox::new: called");
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { driver, rx }, MailboxHandle { tx })
    }

    /// Run the driver loop
    ///
    /// This consumes the mailbox. On cancellation the queue is closed and
    /// whatever is still in it is discarded; askers waiting on a discarded
    /// question see their reply slot dropped.
    pub async fn run(mut self, cancel: CancellationToken) -> ArbiterResult<DriverStats> {
        info!("Driver mailbox started");

        let result = loop {
            let msg = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Driver mailbox cancelled");
                    break Ok(());
                }
                msg = self.rx.recv() => match msg {
                    Some(msg) => msg,
                    None => {
                        info!("All mailbox handles dropped");
                        break Ok(());
                    }
                },
            };

            match self.dispatch(msg, &cancel).await {
                Ok(()) => {}
                Err(e) if e.is_shutdown(cancel.is_cancelled()) => {
                    debug!(error = %e, "Mailbox::run: attention interrupted by shutdown");
                    break Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "Driver mailbox failed");
                    break Err(e);
                }
            }
        };

        self.drain();
        info!("Driver mailbox stopped");
        result.map(|()| self.driver.stats())
    }

    async fn dispatch(&self, msg: DriverMessage, cancel: &CancellationToken) -> ArbiterResult<()> {
        debug!(id = %msg.id(), kind = ?msg.kind(), subject = %msg.subject(), "Mailbox::dispatch: called");
        match msg {
            DriverMessage::Alert { subject, duration, .. } => self.driver.attend_alert(&subject, duration, cancel).await,
            DriverMessage::Question { subject, reply, .. } => {
                let answer = self.driver.answer(&subject, cancel).await?;
                if !reply.complete(answer) {
                    debug!(%subject, "Mailbox::dispatch: asker stopped waiting");
                }
                Ok(())
            }
        }
    }

    /// Close the queue and drop everything left in it
    fn drain(&mut self) {
        self.rx.close();
        let mut discarded = 0u64;
        while let Ok(msg) = self.rx.try_recv() {
            debug!(id = %msg.id(), subject = %msg.subject(), "Mailbox::drain: discarding");
            discarded += 1;
        }
        if discarded > 0 {
            warn!(discarded, "Discarded queued events on shutdown");
        }
        self.driver.record_discarded(discarded);
    }
}

/// Cloneable handle for submitting events to the driver loop
#[derive(Clone)]
pub struct MailboxHandle {
    tx: mpsc::UnboundedSender<DriverMessage>,
}

impl MailboxHandle {
    /// Queue an event; never waits for the driver
    pub fn submit(&self, msg: DriverMessage) -> ArbiterResult<()> {
        debug!(id = %msg.id(), kind = ?msg.kind(), "MailboxHandle::submit: called");
        self.tx.send(msg).map_err(|_| ArbiterError::Closed)
    }
}

#[async_trait]
impl AttentionArbiter for MailboxHandle {
    fn strategy(&self) -> Strategy {
        Strategy::Mailbox
    }

    async fn notify(&self, subject: &str, duration: Duration, _cancel: &CancellationToken) -> ArbiterResult<()> {
        self.submit(DriverMessage::alert(subject, duration))
    }

    async fn ask(&self, subject: &str, cancel: &CancellationToken) -> ArbiterResult<String> {
        let (reply_tx, reply_rx) = reply_slot(subject);
        self.submit(DriverMessage::question(reply_tx))?;
        debug!(%subject, "MailboxHandle::ask: waiting for reply");
        reply_rx.wait(cancel).await
    }
}
