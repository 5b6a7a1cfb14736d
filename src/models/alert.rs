//! Persisted per-ticker alert state and the outbound notification shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last alert direction recorded for a ticker.
///
/// This is breach *memory*, not the instantaneous direction: it only changes
/// when an alert fires or when the price returns inside the corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corridor {
    #[default]
    None,
    Up,
    Down,
}

/// Per-ticker state persisted across runs. The ticker itself is the key of
/// the state map, so it is not repeated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    pub corridor: Corridor,
    pub last_checked: DateTime<Utc>,
    pub last_price: f64,
}

impl AlertState {
    /// Fresh entry for a never-seen ticker.
    pub fn new(now: DateTime<Utc>, last_price: f64) -> Self {
        Self {
            corridor: Corridor::None,
            last_checked: now,
            last_price,
        }
    }
}

/// Rendered push notification, built once per fired alert.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationMessage {
    pub title: String,
    pub body: String,
    pub click_url: Option<String>,
}
