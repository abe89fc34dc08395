//! Road: the alert producer

use std::sync::Arc;

use tracing::{debug, info};

use super::{ProducerStats, stop_or_fail};
use crate::arbiter::{ArbiterResult, AttentionArbiter};
use crate::cancel::{self, CancellationToken};
use crate::config::RoadConfig;
use crate::picker::Picker;

/// Throws random dangers at the driver until cancelled
pub struct Road {
    arbiter: Arc<dyn AttentionArbiter>,
    config: RoadConfig,
    picker: Picker,
}

impl Road {
    pub fn new(arbiter: Arc<dyn AttentionArbiter>, config: RoadConfig, seed: Option<u64>) -> Self {
        debug!(strategy = %arbiter.strategy(), "Road::new: called");
        Self {
            arbiter,
            config,
            picker: Picker::for_task(seed, 1),
        }
    }

    /// Run the road loop
    ///
    /// Returns normally on cancellation. Fails only if the arbiter fails for
    /// a reason other than shutdown.
    pub async fn drive(mut self, cancel: CancellationToken) -> ArbiterResult<ProducerStats> {
        info!("Road started");
        let mut stats = ProducerStats::default();

        while !cancel.is_cancelled() {
            let subject = self.picker.subject(&self.config.subjects);
            let duration = self.picker.duration(self.config.attention_ms);
            debug!(%subject, ?duration, "Road::drive: danger ahead");

            if let Err(e) = self.arbiter.notify(&subject, duration, &cancel).await {
                stop_or_fail("road", e, &cancel)?;
                break;
            }
            stats.submitted += 1;

            let pause = self.picker.duration(self.config.pause_ms);
            if cancel::sleep(pause, &cancel).await.is_err() {
                break;
            }
        }

        info!(submitted = stats.submitted, "Road stopped");
        Ok(stats)
    }
}
