use std::{collections::HashMap, sync::Arc, time::Instant};

use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    clients::{database::DatabaseClient, rbmq::RabbitMqClient},
    models::health::{HealthCheckResponse, HealthStatus, ServiceHealth},
};

pub struct HealthChecker {
    rabbitmq: Arc<RabbitMqClient>,
    users_db: Arc<DatabaseClient>,
    reimbursements_db: Arc<DatabaseClient>,
}

impl HealthChecker {
    pub fn new(
        rabbitmq: Arc<RabbitMqClient>,
        users_db: Arc<DatabaseClient>,
        reimbursements_db: Arc<DatabaseClient>,
    ) -> Self {
        Self {
            rabbitmq,
            users_db,
            reimbursements_db,
        }
    }

    pub async fn check_all(&self) -> HealthCheckResponse {
        let mut checks = HashMap::new();

        checks.insert("message_broker".to_string(), self.check_rabbitmq());

        let users_health = Self::check_database(&self.users_db).await;
        checks.insert("users_database".to_string(), users_health);

        let reimbursements_health = Self::check_database(&self.reimbursements_db)
            .await
            .non_critical();
        checks.insert("reimbursements_database".to_string(), reimbursements_health);

        HealthCheckResponse {
            status: determine_overall_status(&checks),
            timestamp: Utc::now(),
            checks,
        }
    }

    fn check_rabbitmq(&self) -> ServiceHealth {
        if self.rabbitmq.is_connected() {
            debug!("RabbitMQ health check passed");
            ServiceHealth::up()
        } else {
            warn!("RabbitMQ connection lost");
            ServiceHealth::unhealthy("Connection lost".to_string())
        }
    }

    async fn check_database(client: &DatabaseClient) -> ServiceHealth {
        let start = Instant::now();

        match client.health_check().await {
            Ok(_) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(
                    database = client.name(),
                    response_time_ms = elapsed,
                    "Database health check passed"
                );
                ServiceHealth::healthy(elapsed)
            }
            Err(e) => {
                warn!(database = client.name(), error = %e, "Database health check failed");
                ServiceHealth::unhealthy(e.to_string())
            }
        }
    }
}

pub fn determine_overall_status(checks: &HashMap<String, ServiceHealth>) -> HealthStatus {
    let has_unhealthy = checks
        .values()
        .any(|health| health.status == HealthStatus::Unhealthy);

    let has_degraded = checks
        .values()
        .any(|health| health.status == HealthStatus::Degraded);

    if has_unhealthy {
        HealthStatus::Unhealthy
    } else if has_degraded {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}
