use std::{future::Future, sync::Arc};

use tracing::{error, info, warn};

use crate::{
    error::{ProcessingError, StoreError},
    models::{message::ReimbursementData, outcome::HandleOutcome, user::User},
};

/// Receives the body of every delivery whose event is recognized.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, body: &[u8]) -> impl Future<Output = HandleOutcome> + Send;
}

/// Read access to user records.
pub trait UserStore: Send + Sync {
    fn find_user(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
}

impl<T: UserStore> UserStore for Arc<T> {
    fn find_user(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send {
        (**self).find_user(user_id)
    }
}

pub fn parse_reimbursement(body: &[u8]) -> Result<ReimbursementData, ProcessingError> {
    Ok(serde_json::from_slice::<ReimbursementData>(body)?)
}

pub struct ReimbursementHandler<S> {
    users: S,
}

impl<S: UserStore> ReimbursementHandler<S> {
    pub fn new(users: S) -> Self {
        Self { users }
    }

    pub async fn process(&self, body: &[u8]) -> Result<User, ProcessingError> {
        let data = parse_reimbursement(body)?;

        self.users
            .find_user(data.user_id)
            .await?
            .ok_or(ProcessingError::UserNotFound(data.user_id))
    }
}

impl<S: UserStore> MessageHandler for ReimbursementHandler<S> {
    async fn handle(&self, body: &[u8]) -> HandleOutcome {
        match self.process(body).await {
            Ok(user) => {
                info!(
                    user_id = user.id,
                    username = %user.username,
                    user = ?user,
                    "User found"
                );
                HandleOutcome::Processed
            }
            Err(ProcessingError::InvalidBody(e)) => {
                warn!(error = %e, "Failed to parse message body");
                HandleOutcome::Rejected(format!("Failed to parse message body: {}", e))
            }
            Err(ProcessingError::Store(StoreError::Unavailable(e))) => {
                error!(error = %e, "Failed to fetch user data: store unavailable");
                HandleOutcome::Unavailable(e)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch user data");
                HandleOutcome::Rejected(format!("Failed to fetch user data: {}", e))
            }
        }
    }
}
