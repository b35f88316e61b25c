use std::process::ExitCode;

use reimbursement_worker::{
    config::{Config, LogFormat},
    utils, worker,
};
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            utils::init_tracing(LogFormat::default());
            return utils::report_fatal("Failed to load configuration", &e);
        }
    };
    utils::init_tracing(config.log_format);

    info!(queue = %config.queue_name, ack_mode = ?config.ack_mode, "Configuration loaded");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        utils::shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    match worker::run(config, shutdown_rx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => utils::report_fatal("Worker terminated", &e),
    }
}
