//! Logging initialization with environment-based formatters
//!
//! - Production: Structured JSON logs for cloud monitoring
//! - Development: Colorful, human-readable logs
//!
//! An optional plain-text file layer is added when the configuration names a
//! log file, so scheduled runs keep a persistent trail next to the state file.

use std::fs::OpenOptions;
use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{get_environment, LogConfig};
use crate::error::WatchError;

/// Initialize logging based on the environment and the config's log block.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(cfg: &LogConfig) -> Result<(), WatchError> {
    let env = get_environment();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.level.clone()));

    let is_production = matches!(env.as_str(), "production" | "prod");

    let file: Option<Arc<std::fs::File>> = match &cfg.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    WatchError::config(format!("cannot open log file {}: {}", path.display(), e))
                })?;
            Some(Arc::new(file))
        }
        None => None,
    };

    if is_production {
        let file_layer = file
            .clone()
            .map(|f| fmt::layer().with_ansi(false).with_writer(f));
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stdout),
            )
            .with(file_layer)
            .init();
    } else {
        let file_layer = file
            .clone()
            .map(|f| fmt::layer().with_ansi(false).with_writer(f));
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(file_layer)
            .init();
    }

    Ok(())
}
