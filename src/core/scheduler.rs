//! Cron-based scheduler driving periodic watch runs

use std::str::FromStr;
use std::sync::Arc;

use cron::Schedule;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::core::runner::Runner;
use crate::error::WatchError;

/// Triggers one watch run per cron tick. The current run is awaited before
/// the next tick is armed, so two runs never overlap on the state file.
pub struct RunScheduler {
    runner: Arc<Runner>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl RunScheduler {
    /// Create a scheduler firing every `interval_seconds`.
    pub fn new(runner: Arc<Runner>, interval_seconds: u64) -> Result<Self, WatchError> {
        if interval_seconds == 0 {
            return Err(WatchError::config("scheduler disabled: interval_seconds is 0"));
        }

        // Cron format: second minute hour day month weekday
        let cron_expr = if interval_seconds >= 60 {
            format!("0 */{} * * * *", interval_seconds / 60)
        } else {
            format!("*/{} * * * * *", interval_seconds)
        };

        let schedule = Schedule::from_str(&cron_expr).map_err(|e| {
            WatchError::config(format!("invalid cron expression '{}': {}", cron_expr, e))
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            "scheduler created with interval {}s",
            interval_seconds
        );

        Ok(Self {
            runner,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Start the tick loop in a background task.
    pub async fn start(&self) {
        let runner = self.runner.clone();
        let schedule = self.schedule.clone();
        let handle_arc = self.handle.clone();

        let handle = tokio::spawn(async move {
            info!("scheduler started, waiting for first tick");

            loop {
                let mut upcoming = schedule.upcoming(chrono::Utc);
                if let Some(next_tick) = upcoming.next() {
                    let now = chrono::Utc::now();
                    if next_tick > now {
                        let duration = (next_tick - now).to_std().unwrap_or_default();
                        tokio::time::sleep(duration).await;
                    }
                } else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                }

                match runner.run_once().await {
                    Ok(summary) => {
                        info!(
                            evaluated = summary.tickers_evaluated,
                            skipped = summary.tickers_skipped,
                            alerts = summary.alerts_fired,
                            "scheduled run complete"
                        );
                    }
                    Err(e) => {
                        // A failed run must be loud: losing dedupe state means
                        // alert storms on the next tick.
                        error!(error = %e, "scheduled run failed");
                    }
                }
            }
        });

        {
            let mut h = handle_arc.write().await;
            *h = Some(handle);
        }

        info!("scheduler started successfully");
    }

    /// Stop the scheduler.
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("scheduler stopped");
        }
    }

    /// Check if the scheduler is running.
    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}
