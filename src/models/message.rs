use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementData {
    pub user_id: i64,
}

/// Record published to the dead-letter queue when a message is rejected in manual ack mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetter {
    pub trace_id: String,
    pub event: Option<String>,
    pub payload: String,
    pub failure_reason: String,
    pub failed_at: String,
}
