//! Message types for the Driver

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reply::ReplySender;
use crate::status::AttentionKind;

/// Events submitted to the driver's mailbox
#[derive(Debug)]
pub enum DriverMessage {
    /// Something on the road needs attention for `duration`
    Alert {
        id: Uuid,
        subject: String,
        duration: Duration,
    },

    /// The passenger wants an answer
    Question {
        id: Uuid,
        subject: String,
        reply: ReplySender,
    },
}

impl DriverMessage {
    pub fn alert(subject: impl Into<String>, duration: Duration) -> Self {
        Self::Alert {
            id: Uuid::now_v7(),
            subject: subject.into(),
            duration,
        }
    }

    pub fn question(reply: ReplySender) -> Self {
        Self::Question {
            id: Uuid::now_v7(),
            subject: reply.subject().to_string(),
            reply,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Alert { id, .. } | Self::Question { id, .. } => *id,
        }
    }

    pub fn subject(&self) -> &str {
        match self {
            Self::Alert { subject, .. } | Self::Question { subject, .. } => subject,
        }
    }

    pub fn kind(&self) -> AttentionKind {
        match self {
            Self::Alert { .. } => AttentionKind::Alert,
            Self::Question { .. } => AttentionKind::Question,
        }
    }
}

/// Driver statistics for observability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverStats {
    #[serde(rename = "alerts-handled")]
    pub alerts_handled: u64,
    #[serde(rename = "questions-answered")]
    pub questions_answered: u64,
    /// Events still queued when the driver stopped
    pub discarded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::reply_slot;

    #[test]
    fn test_message_accessors() {
        let alert = DriverMessage::alert("ambulance", Duration::from_secs(3));
        assert_eq!(alert.subject(), "ambulance");
        assert_eq!(alert.kind(), AttentionKind::Alert);

        let (tx, _rx) = reply_slot("I'm hungry");
        let question = DriverMessage::question(tx);
        assert_eq!(question.subject(), "I'm hungry");
        assert_eq!(question.kind(), AttentionKind::Question);
        assert_ne!(alert.id(), question.id());
    }

    #[test]
    fn test_stats_serialization() {
        let stats = DriverStats {
            alerts_handled: 2,
            questions_answered: 1,
            discarded: 0,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("alerts-handled"));
        assert!(json.contains("questions-answered"));
    }
}
