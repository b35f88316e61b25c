use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Snapshot of a row in the users table. Read-only; the worker never writes users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub username: String,
    pub email: String,
    pub level: i32,
    pub id: i32,
    pub joined: String,
    pub is_active: bool,
}
