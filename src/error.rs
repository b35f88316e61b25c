use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// SQLSTATEs meaning the server cannot serve this connection right now:
/// class 08 (connection), class 28 (authorization), 57P01..57P03 (shutdown, startup).
pub fn is_unavailable_state(code: &str) -> bool {
    code.starts_with("08") || code.starts_with("28") || code.starts_with("57P")
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let unavailable = match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Protocol(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => true,
            sqlx::Error::Database(db) => {
                db.code().is_some_and(|code| is_unavailable_state(&code))
            }
            _ => false,
        };

        if unavailable {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Query(err.to_string())
        }
    }
}

/// Message-local failures of the reimbursement handler.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("invalid message body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("user {0} not found")]
    UserNotFound(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}
