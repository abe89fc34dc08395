//! Status lines emitted around every attention action

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use colored::Colorize;
use serde::Serialize;
use tokio::time::{Duration, Instant};
use tracing::debug;

/// What kind of event the driver is attending to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionKind {
    Alert,
    Question,
}

/// Whether an attention action is starting or finishing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Started,
    Finished,
}

/// One status line
#[derive(Debug, Clone)]
pub struct StatusLine {
    pub phase: Phase,
    pub kind: AttentionKind,
    pub subject: String,
    pub at: Instant,
}

impl StatusLine {
    pub fn new(phase: Phase, kind: AttentionKind, subject: impl Into<String>) -> Self {
        Self {
            phase,
            kind,
            subject: subject.into(),
            at: Instant::now(),
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.phase) {
            (AttentionKind::Alert, Phase::Started) => write!(f, "paying attention to {}", self.subject),
            (AttentionKind::Alert, Phase::Finished) => write!(f, "finished paying attention to {}", self.subject),
            (AttentionKind::Question, Phase::Started) => write!(f, "processing \"{}\"", self.subject),
            (AttentionKind::Question, Phase::Finished) => write!(f, "answering {}", self.subject),
        }
    }
}

/// Receiver of status lines
pub trait StatusSink: Send + Sync {
    fn emit(&self, line: StatusLine);
}

/// Writes colored status lines to stdout: alerts red, questions green
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn emit(&self, line: StatusLine) {
        let text = line.to_string();
        let colored = match line.kind {
            AttentionKind::Alert => text.red(),
            AttentionKind::Question => text.green(),
        };
        let mut stdout = io::stdout().lock();
        // A closed stdout is not the driver's problem
        let _ = writeln!(stdout, "{}", colored);
    }
}

/// Records status lines in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<StatusLine>>>,
}

/// A completed attention action reconstructed from a start/finish pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttentionSpan {
    pub kind: AttentionKind,
    pub subject: String,
    pub start: Instant,
    pub end: Instant,
}

impl AttentionSpan {
    pub fn elapsed(&self) -> Duration {
        self.end.duration_since(self.start)
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line recorded so far
    pub fn lines(&self) -> Vec<StatusLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Rendered text of every line recorded so far
    pub fn rendered(&self) -> Vec<String> {
        self.lines().iter().map(ToString::to_string).collect()
    }

    /// Pair up start/finish lines into spans, in recorded order
    ///
    /// A start that is followed by another start (or by nothing) was
    /// interrupted and produces no span.
    pub fn spans(&self) -> Vec<AttentionSpan> {
        let mut spans = Vec::new();
        let mut open: Option<StatusLine> = None;
        for line in self.lines() {
            match line.phase {
                Phase::Started => open = Some(line),
                Phase::Finished => {
                    if let Some(start) = open.take()
                        && start.kind == line.kind
                        && start.subject == line.subject
                    {
                        spans.push(AttentionSpan {
                            kind: line.kind,
                            subject: line.subject,
                            start: start.at,
                            end: line.at,
                        });
                    }
                }
            }
        }
        spans
    }

    /// True when no two recorded lines show overlapping attention
    ///
    /// Lines must strictly alternate started/finished, except that the
    /// final line may be an unfinished start.
    pub fn is_serialized(&self) -> bool {
        let lines = self.lines();
        let mut expect_start = true;
        let mut open: Option<&StatusLine> = None;
        for line in &lines {
            match (line.phase, expect_start) {
                (Phase::Started, true) => {
                    open = Some(line);
                    expect_start = false;
                }
                (Phase::Finished, false) => {
                    match open {
                        Some(start) if start.kind == line.kind && start.subject == line.subject => {}
                        _ => return false,
                    }
                    open = None;
                    expect_start = true;
                }
                _ => return false,
            }
        }
        true
    }
}

impl StatusSink for MemorySink {
    fn emit(&self, line: StatusLine) {
        debug!(%line, "MemorySink::emit");
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_text() {
        let line = StatusLine::new(Phase::Started, AttentionKind::Alert, "ambulance");
        assert_eq!(line.to_string(), "paying attention to ambulance");

        let line = StatusLine::new(Phase::Finished, AttentionKind::Alert, "ambulance");
        assert_eq!(line.to_string(), "finished paying attention to ambulance");

        let line = StatusLine::new(Phase::Started, AttentionKind::Question, "I'm bored");
        assert_eq!(line.to_string(), "processing \"I'm bored\"");

        let line = StatusLine::new(Phase::Finished, AttentionKind::Question, "I'm bored");
        assert_eq!(line.to_string(), "answering I'm bored");
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_sink_spans() {
        let sink = MemorySink::new();
        sink.emit(StatusLine::new(Phase::Started, AttentionKind::Alert, "drunk driver"));
        tokio::time::sleep(Duration::from_millis(40)).await;
        sink.emit(StatusLine::new(Phase::Finished, AttentionKind::Alert, "drunk driver"));
        sink.emit(StatusLine::new(Phase::Started, AttentionKind::Question, "I'm hungry"));

        let spans = sink.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].subject, "drunk driver");
        assert_eq!(spans[0].elapsed(), Duration::from_millis(40));
        assert!(sink.is_serialized());
    }

    #[test]
    fn test_memory_sink_detects_overlap() {
        let sink = MemorySink::new();
        sink.emit(StatusLine::new(Phase::Started, AttentionKind::Alert, "ambulance"));
        sink.emit(StatusLine::new(Phase::Started, AttentionKind::Question, "I'm hungry"));
        sink.emit(StatusLine::new(Phase::Finished, AttentionKind::Alert, "ambulance"));
        assert!(!sink.is_serialized());
    }
}
