//! Passenger: the question producer

use std::sync::Arc;

use tracing::{debug, info};

use super::{ProducerStats, stop_or_fail};
use crate::arbiter::{ArbiterResult, AttentionArbiter};
use crate::cancel::{self, CancellationToken};
use crate::config::PassengerConfig;
use crate::picker::Picker;

/// Asks the driver random questions, one at a time, until cancelled
pub struct Passenger {
    arbiter: Arc<dyn AttentionArbiter>,
    config: PassengerConfig,
    picker: Picker,
}

impl Passenger {
    pub fn new(arbiter: Arc<dyn AttentionArbiter>, config: PassengerConfig, seed: Option<u64>) -> Self {
        debug!(strategy = %arbiter.strategy(), "Passenger::new: called");
        Self {
            arbiter,
            config,
            picker: Picker::for_task(seed, 2),
        }
    }

    /// Run the passenger loop
    ///
    /// The next question is only asked once the previous one is answered.
    pub async fn be_bored(mut self, cancel: CancellationToken) -> ArbiterResult<ProducerStats> {
        info!("Passenger started");
        let mut stats = ProducerStats::default();

        while !cancel.is_cancelled() {
            let question = self.picker.subject(&self.config.subjects);
            debug!(%question, "Passenger::be_bored: asking");

            match self.arbiter.ask(&question, &cancel).await {
                Ok(answer) => {
                    debug!(%question, %answer, "Passenger::be_bored: got answer");
                    stats.submitted += 1;
                    stats.replies += 1;
                }
                Err(e) => {
                    stop_or_fail("passenger", e, &cancel)?;
                    break;
                }
            }

            let pause = self.picker.duration(self.config.pause_ms);
            if cancel::sleep(pause, &cancel).await.is_err() {
                break;
            }
        }

        info!(submitted = stats.submitted, replies = stats.replies, "Passenger stopped");
        Ok(stats)
    }
}
