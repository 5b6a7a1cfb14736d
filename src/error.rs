//! Error taxonomy for a watch run.

use thiserror::Error;

/// Errors surfaced while running a watch cycle.
///
/// `Config` and `Persistence` are fatal for the run; `Provider` and `Send`
/// are scoped to a single ticker and never abort the batch.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("notification send failed: {0}")]
    Send(String),

    #[error("state persistence error: {0}")]
    Persistence(String),
}

impl WatchError {
    pub fn config(msg: impl Into<String>) -> Self {
        WatchError::Config(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        WatchError::Provider(msg.into())
    }

    pub fn send(msg: impl Into<String>) -> Self {
        WatchError::Send(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        WatchError::Persistence(msg.into())
    }
}
