//! Driver attention actions

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use super::messages::DriverStats;
use crate::arbiter::{ArbiterError, ArbiterResult};
use crate::cancel::{self, CancellationToken};
use crate::config::DriverConfig;
use crate::picker::Picker;
use crate::status::{AttentionKind, Phase, StatusLine, StatusSink};

/// Clears the busy flag when an attention action ends, cancelled or not
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// The shared actor whose attention is being fought over
///
/// The driver does not serialize callers itself; it only checks that
/// whoever is arbitrating did. An overlapping call fails with
/// `ArbiterError::Contended`.
pub struct Driver {
    config: DriverConfig,
    sink: Arc<dyn StatusSink>,
    picker: Mutex<Picker>,
    busy: AtomicBool,
    alerts_handled: AtomicU64,
    questions_answered: AtomicU64,
    discarded: AtomicU64,
}

impl Driver {
    /// Create a new driver writing status lines to `sink`
    pub fn new(config: DriverConfig, sink: Arc<dyn StatusSink>, seed: Option<u64>) -> Self {
        debug!(?config, ?seed, "Driver::new: called");
        Self {
            config,
            sink,
            picker: Mutex::new(Picker::for_task(seed, 3)),
            busy: AtomicBool::new(false),
            alerts_handled: AtomicU64::new(0),
            questions_answered: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Whether an attention action is in progress
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Snapshot of what the driver has done so far
    pub fn stats(&self) -> DriverStats {
        DriverStats {
            alerts_handled: self.alerts_handled.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }

    /// Pay attention to a road alert for `duration`
    pub async fn attend_alert(&self, subject: &str, duration: Duration, cancel: &CancellationToken) -> ArbiterResult<()> {
        debug!(%subject, ?duration, "Driver::attend_alert: called");
        let _guard = self.enter(subject)?;

        self.emit(Phase::Started, AttentionKind::Alert, subject);
        cancel::sleep(duration, cancel).await?;
        self.emit(Phase::Finished, AttentionKind::Alert, subject);

        self.alerts_handled.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Think about a question briefly and produce the reply
    pub async fn answer(&self, subject: &str, cancel: &CancellationToken) -> ArbiterResult<String> {
        debug!(%subject, "Driver::answer: called");
        let _guard = self.enter(subject)?;

        let thinking = self.think_time();
        self.emit(Phase::Started, AttentionKind::Question, subject);
        cancel::sleep(thinking, cancel).await?;
        self.emit(Phase::Finished, AttentionKind::Question, subject);

        self.questions_answered.fetch_add(1, Ordering::Relaxed);
        Ok(self.config.reply.clone())
    }

    /// Count events that were queued but never attended to
    pub(crate) fn record_discarded(&self, count: u64) {
        if count > 0 {
            self.discarded.fetch_add(count, Ordering::Relaxed);
        }
    }

    fn enter(&self, subject: &str) -> ArbiterResult<BusyGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(%subject, "Driver::enter: attention already taken");
            return Err(ArbiterError::Contended(subject.to_string()));
        }
        Ok(BusyGuard { busy: &self.busy })
    }

    fn think_time(&self) -> Duration {
        match self.picker.lock() {
            Ok(mut picker) => picker.duration(self.config.answer_ms),
            Err(_) => self.config.answer_ms.min_duration(),
        }
    }

    fn emit(&self, phase: Phase, kind: AttentionKind, subject: &str) {
        self.sink.emit(StatusLine::new(phase, kind, subject));
    }
}
