//! Arbitration of the driver's attention
//!
//! Two interchangeable strategies guarantee that at most one attention
//! action runs at a time:
//! - **Mailbox:** every event goes through one unbounded FIFO queue drained
//!   by a single driver loop; submitting never blocks, questions wait on a
//!   reply slot
//! - **Gate:** every caller takes a single-permit semaphore around the
//!   attention action and runs it inline
//!
//! Producers only see [`AttentionArbiter`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::driver::Driver;

mod error;
mod gate;
mod mailbox;

pub use error::{ArbiterError, ArbiterResult};
pub use gate::Gate;
pub use mailbox::{Mailbox, MailboxHandle};

/// Something that hands out the driver's attention
#[async_trait]
pub trait AttentionArbiter: Send + Sync {
    /// Which strategy this arbiter implements
    fn strategy(&self) -> Strategy;

    /// Fire-and-forget alert; the driver attends to it for `duration`
    ///
    /// Mailbox returns once the alert is queued; Gate returns once the
    /// driver has finished attending to it.
    async fn notify(&self, subject: &str, duration: Duration, cancel: &CancellationToken) -> ArbiterResult<()>;

    /// Ask the driver something and wait for the reply
    async fn ask(&self, subject: &str, cancel: &CancellationToken) -> ArbiterResult<String>;
}

/// Arbitration strategy selected at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Unbounded queue drained by a single driver loop
    #[default]
    Mailbox,
    /// Single-permit semaphore around each attention action
    Gate,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mailbox => write!(f, "mailbox"),
            Self::Gate => write!(f, "gate"),
        }
    }
}

/// Build the arbiter for `strategy`
///
/// The mailbox strategy also returns the driver loop, which the caller must
/// run (usually on its own task) for any event to be handled.
pub fn create_arbiter(strategy: Strategy, driver: Arc<Driver>) -> (Arc<dyn AttentionArbiter>, Option<Mailbox>) {
    debug!(%strategy, "create_arbiter: called");
    match strategy {
        Strategy::Mailbox => {
            let (mailbox, handle) = Mailbox::new(driver);
            (Arc::new(handle), Some(mailbox))
        }
        Strategy::Gate => (Arc::new(Gate::new(driver)), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriverConfig;
    use crate::status::MemorySink;

    fn driver() -> Arc<Driver> {
        Arc::new(Driver::new(DriverConfig::default(), Arc::new(MemorySink::new()), Some(1)))
    }

    #[test]
    fn test_strategy_display_and_serde() {
        assert_eq!(Strategy::Mailbox.to_string(), "mailbox");
        assert_eq!(Strategy::Gate.to_string(), "gate");
        let parsed: Strategy = serde_yaml::from_str("gate").unwrap();
        assert_eq!(parsed, Strategy::Gate);
    }

    #[test]
    fn test_create_arbiter_mailbox_has_loop() {
        let (arbiter, mailbox) = create_arbiter(Strategy::Mailbox, driver());
        assert_eq!(arbiter.strategy(), Strategy::Mailbox);
        assert!(mailbox.is_some());
    }

    #[test]
    fn test_create_arbiter_gate_has_no_loop() {
        let (arbiter, mailbox) = create_arbiter(Strategy::Gate, driver());
        assert_eq!(arbiter.strategy(), Strategy::Gate);
        assert!(mailbox.is_none());
    }
}
