//! Stockwatch one-shot runner
//!
//! Executes a single watch pass and exits, designed for an external cron
//! trigger. The long-running variant lives in `bin/worker.rs`.

use std::env;

use dotenvy::dotenv;
use tracing::info;

use stockwatch::config::Config;
use stockwatch::core::runner::Runner;
use stockwatch::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    let config_path = env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = Config::load(&config_path)?;
    logging::init_logging(&config.log)?;

    let environment = stockwatch::config::get_environment();
    info!(environment = %environment, config = %config_path, "starting stockwatch run");

    let runner = Runner::from_config(config)?;
    let summary = runner.run_once().await?;

    info!(
        evaluated = summary.tickers_evaluated,
        skipped = summary.tickers_skipped,
        alerts = summary.alerts_fired,
        "run finished"
    );
    Ok(())
}
