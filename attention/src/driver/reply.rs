//! Single-use reply slot linking a question to its answer

use tokio::sync::oneshot;
use tracing::debug;

use crate::arbiter::{ArbiterError, ArbiterResult};
use crate::cancel::CancellationToken;

/// Create a reply slot for a question about `subject`
///
/// The sender is written at most once (it is consumed by `complete`), the
/// receiver is read at most once (it is consumed by `wait`).
pub fn reply_slot(subject: impl Into<String>) -> (ReplySender, ReplyReceiver) {
    let subject = subject.into();
    let (tx, rx) = oneshot::channel();
    (
        ReplySender {
            subject: subject.clone(),
            tx,
        },
        ReplyReceiver { subject, rx },
    )
}

/// Write side of a reply slot, held by the driver
#[derive(Debug)]
pub struct ReplySender {
    subject: String,
    tx: oneshot::Sender<String>,
}

impl ReplySender {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Deliver the reply; returns false if the asker stopped waiting
    pub fn complete(self, reply: impl Into<String>) -> bool {
        debug!(subject = %self.subject, "ReplySender::complete: called");
        self.tx.send(reply.into()).is_ok()
    }
}

/// Read side of a reply slot, held by the asker
#[derive(Debug)]
pub struct ReplyReceiver {
    subject: String,
    rx: oneshot::Receiver<String>,
}

impl ReplyReceiver {
    /// Wait for the reply unless `cancel` fires first
    ///
    /// A reply that is already available wins over cancellation.
    pub async fn wait(self, cancel: &CancellationToken) -> ArbiterResult<String> {
        debug!(subject = %self.subject, "ReplyReceiver::wait: called");
        let subject = self.subject;
        tokio::select! {
            biased;
            reply = self.rx => reply.map_err(|_| ArbiterError::ReplyDropped(subject)),
            _ = cancel.cancelled() => Err(ArbiterError::Cancelled),
        }
    }
}
