//! Stockwatch Worker
//!
//! Long-running variant: triggers a watch run on a fixed interval instead of
//! relying on an external cron. Runs are awaited back to back, so at most one
//! touches the state file at a time.

use std::env;
use std::sync::Arc;

use dotenvy::dotenv;
use tokio::signal;
use tracing::info;

use stockwatch::config::Config;
use stockwatch::core::runner::Runner;
use stockwatch::core::scheduler::RunScheduler;
use stockwatch::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    let config_path = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.json".to_string());
    let config = Config::load(&config_path)?;
    logging::init_logging(&config.log)?;

    let interval: u64 = env::var("WATCH_INTERVAL_SECONDS")
        .ok()
        .and_then(|i| i.parse().ok())
        .unwrap_or(300);

    let environment = stockwatch::config::get_environment();
    info!("Starting Stockwatch Worker");
    info!(environment = %environment, config = %config_path, "Environment");
    info!(
        interval = interval,
        tickers = config.tickers.len(),
        "Watch cycle: every {} seconds",
        interval
    );

    let runner = Arc::new(Runner::from_config(config)?);
    let scheduler = RunScheduler::new(runner, interval)?;
    scheduler.start().await;

    // Graceful shutdown
    info!("Worker started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down worker...");
            scheduler.stop().await;
            info!("Worker stopped");
        }
    }

    Ok(())
}
