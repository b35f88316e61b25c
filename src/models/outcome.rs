use serde::Deserialize;

use crate::models::event::SkipReason;

/// Result of handling one delivery. Never carries a fatal error: those abort the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    Processed,
    Skipped(SkipReason),
    /// Message-local failure. Redelivering the same body cannot succeed.
    Rejected(String),
    /// A store could not be reached while handling the message.
    Unavailable(String),
}

impl HandleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            HandleOutcome::Processed => "processed",
            HandleOutcome::Skipped(_) => "skipped",
            HandleOutcome::Rejected(_) => "rejected",
            HandleOutcome::Unavailable(_) => "unavailable",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckMode {
    /// Broker acknowledges on delivery; outcomes never reach the broker.
    #[default]
    Auto,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckDecision {
    None,
    Ack,
    Reject { requeue: bool },
    DeadLetter { reason: String },
}

impl AckDecision {
    pub fn for_outcome(mode: AckMode, dead_letter_enabled: bool, outcome: &HandleOutcome) -> Self {
        if mode == AckMode::Auto {
            return AckDecision::None;
        }

        match outcome {
            HandleOutcome::Processed | HandleOutcome::Skipped(_) => AckDecision::Ack,
            HandleOutcome::Rejected(reason) if dead_letter_enabled => AckDecision::DeadLetter {
                reason: reason.clone(),
            },
            HandleOutcome::Rejected(_) => AckDecision::Reject { requeue: false },
            HandleOutcome::Unavailable(_) => AckDecision::Reject { requeue: true },
        }
    }
}
