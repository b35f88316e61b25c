use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{debug, info};

use crate::{config::Config, error::StoreError, handler::UserStore, models::user::User};

const FIND_USER_QUERY: &str =
    "SELECT username, email, level, id, joined, is_active FROM users WHERE id = $1";

pub struct DatabaseClient {
    name: &'static str,
    pool: PgPool,
}

impl DatabaseClient {
    fn pool_options(config: &Config) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_seconds))
    }

    pub async fn connect(
        name: &'static str,
        database_url: &str,
        config: &Config,
    ) -> Result<Self, Error> {
        info!(database = name, "Connecting to PostgreSQL database");

        let pool = Self::pool_options(config)
            .connect(database_url)
            .await
            .map_err(|e| anyhow!("Failed to connect to {} database: {}", name, e))?;

        info!(database = name, "PostgreSQL connection established");

        Ok(Self { name, pool })
    }

    /// Creates the pool without opening a connection; the first query connects.
    pub fn connect_lazy(
        name: &'static str,
        database_url: &str,
        config: &Config,
    ) -> Result<Self, Error> {
        let pool = Self::pool_options(config)
            .connect_lazy(database_url)
            .map_err(|e| anyhow!("Invalid {} database url: {}", name, e))?;

        info!(database = name, "PostgreSQL pool created, connecting on first use");

        Ok(Self { name, pool })
    }

    pub fn from_pool(name: &'static str, pool: PgPool) -> Self {
        Self { name, pool }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!("Database health check failed: {}", e))?;

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        debug!(database = self.name, "PostgreSQL pool closed");
    }
}

impl UserStore for DatabaseClient {
    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        debug!(database = self.name, user_id, "Looking up user");

        let user = sqlx::query_as::<_, User>(FIND_USER_QUERY)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
