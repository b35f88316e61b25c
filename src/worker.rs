use std::sync::Arc;

use anyhow::{Error, Result};
use tokio::sync::watch;
use tracing::{error, info};

use crate::{
    api::run_api_server,
    clients::{database::DatabaseClient, health::HealthChecker, rbmq::RabbitMqClient},
    config::Config,
    consumer::EventConsumer,
    handler::ReimbursementHandler,
};

/// Wires the broker, both stores and the health server, then consumes until `shutdown` flips.
///
/// Any error returned here is fatal for the process.
pub async fn run(config: Config, shutdown: watch::Receiver<bool>) -> Result<(), Error> {
    let rabbitmq = Arc::new(RabbitMqClient::connect(&config).await?);

    let users_db =
        Arc::new(DatabaseClient::connect("users", &config.users_db_url, &config).await?);
    let reimbursements_db = Arc::new(DatabaseClient::connect_lazy(
        "reimbursements",
        &config.reimbursements_db_url,
        &config,
    )?);

    let health_checker = HealthChecker::new(
        Arc::clone(&rabbitmq),
        Arc::clone(&users_db),
        Arc::clone(&reimbursements_db),
    );
    let api_shutdown = shutdown.clone();
    let server_port = config.server_port;
    tokio::spawn(async move {
        if let Err(e) = run_api_server(server_port, health_checker, api_shutdown).await {
            error!(error = %e, "Health check server stopped");
        }
    });

    let handler = ReimbursementHandler::new(Arc::clone(&users_db));
    let consumer = EventConsumer::new(
        Arc::clone(&rabbitmq),
        config.ack_mode,
        config.dead_letter_enabled(),
    );

    let result = consumer.run(&handler, shutdown).await;

    users_db.close().await;
    reimbursements_db.close().await;

    if result.is_ok() {
        info!("Worker stopped");
    }

    result
}
