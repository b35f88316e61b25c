use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::models::outcome::AckMode;

#[derive(Clone, Copy, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub rabbitmq_url: String,
    #[serde(default = "default_queue_name")]
    pub queue_name: String,
    #[serde(default = "default_consumer_tag")]
    pub consumer_tag: String,
    #[serde(default)]
    pub ack_mode: AckMode,
    #[serde(default = "default_prefetch_count")]
    pub prefetch_count: u16,
    pub dead_letter_queue: Option<String>,

    pub users_db_url: String,
    pub reimbursements_db_url: String,
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_database_acquire_timeout_seconds")]
    pub database_acquire_timeout_seconds: u64,

    #[serde(default = "default_server_port")]
    pub server_port: u16,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_queue_name() -> String {
    "reimbursements.queue".to_string()
}

fn default_consumer_tag() -> String {
    "reimbursements_worker".to_string()
}

fn default_prefetch_count() -> u16 {
    1
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_database_acquire_timeout_seconds() -> u64 {
    5
}

fn default_server_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        Ok(config)
    }

    /// Builds a config from explicit `(KEY, value)` pairs instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let config = envy::from_iter::<_, Self>(
            vars.into_iter().map(|(k, v)| (k.into(), v.into())),
        )
        .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        Ok(config)
    }

    pub fn dead_letter_enabled(&self) -> bool {
        self.dead_letter_queue
            .as_deref()
            .is_some_and(|queue| !queue.is_empty())
    }
}
