//! Intraday quote snapshot and threshold classification.

use crate::error::WatchError;

/// Where the current delta sits relative to the alert corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Inside,
}

/// One ticker's intraday move, recomputed every run and never persisted.
#[derive(Debug, Clone)]
pub struct Quote {
    pub ticker: String,
    pub open_price: f64,
    pub last_price: f64,
    pub delta_pct: f64,
}

impl Quote {
    /// Build a quote from raw provider prices. Both prices must be positive;
    /// a zero or negative price means the provider returned garbage and the
    /// ticker is skipped for this run.
    pub fn new(ticker: &str, open_price: f64, last_price: f64) -> Result<Self, WatchError> {
        if open_price <= 0.0 || last_price <= 0.0 {
            return Err(WatchError::provider(format!(
                "non-positive price for {}: open={}, last={}",
                ticker, open_price, last_price
            )));
        }
        let delta_pct = (last_price - open_price) / open_price * 100.0;
        Ok(Self {
            ticker: ticker.to_string(),
            open_price,
            last_price,
            delta_pct,
        })
    }

    /// Replace the computed delta with a forced one (test override) and
    /// back-compute the last price so the notification body stays coherent.
    pub fn with_forced_delta(mut self, delta_pct: f64) -> Self {
        self.delta_pct = delta_pct;
        self.last_price = self.open_price * (1.0 + delta_pct / 100.0);
        self
    }

    pub fn direction(&self, threshold_pct: f64) -> Direction {
        if self.delta_pct >= threshold_pct {
            Direction::Up
        } else if self.delta_pct <= -threshold_pct {
            Direction::Down
        } else {
            Direction::Inside
        }
    }
}
