use std::{
    fmt::{Display, Formatter, Result},
    str::FromStr,
};

/// Header key carrying the event type of a delivery.
pub const EVENT_HEADER: &str = "event";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReimbursementEvent {
    Submitted,
    Updated,
}

impl ReimbursementEvent {
    pub const ALL: [ReimbursementEvent; 2] =
        [ReimbursementEvent::Submitted, ReimbursementEvent::Updated];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReimbursementEvent::Submitted => "reimbursement.submitted",
            ReimbursementEvent::Updated => "reimbursement.updated",
        }
    }
}

impl FromStr for ReimbursementEvent {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "reimbursement.submitted" => Ok(ReimbursementEvent::Submitted),
            "reimbursement.updated" => Ok(ReimbursementEvent::Updated),
            _ => Err(()),
        }
    }
}

impl Display for ReimbursementEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a delivery goes after its `event` header has been inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRoute {
    MissingEvent,
    NonStringEvent,
    Unrelated(String),
    Recognized(ReimbursementEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingEvent,
    NonStringEvent,
    UnrelatedEvent(String),
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            SkipReason::MissingEvent => write!(f, "Event header is missing"),
            SkipReason::NonStringEvent => write!(f, "Event header is not a string"),
            SkipReason::UnrelatedEvent(event) => write!(f, "Skipping unrelated event: {}", event),
        }
    }
}
