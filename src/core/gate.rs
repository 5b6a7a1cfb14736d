//! Market-hours gate
//!
//! Decides whether an instant falls inside the configured trading window.
//! All comparisons happen in the configured exchange timezone, so DST shifts
//! are handled by the zone database rather than by offset arithmetic.

use chrono::{DateTime, Datelike, Utc};

use crate::config::{MarketHoursConfig, TestConfig};
use crate::error::WatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketState {
    Open,
    Closed,
}

/// Pure market-clock check: the local weekday must be in the active-days set
/// and the local time within `[open, close)`. `open == close` is a
/// zero-length window and therefore always closed.
pub fn market_state(
    now: DateTime<Utc>,
    cfg: &MarketHoursConfig,
) -> Result<MarketState, WatchError> {
    let tz = cfg.tz()?;
    let open = cfg.open_time()?;
    let close = cfg.close_time()?;

    let local = now.with_timezone(&tz);
    let weekday = local.weekday().number_from_monday() as u8;
    // An empty active-days set means every day is a trading day.
    if !cfg.active_days.is_empty() && !cfg.active_days.contains(&weekday) {
        return Ok(MarketState::Closed);
    }

    let time = local.time();
    if time >= open && time < close {
        Ok(MarketState::Open)
    } else {
        Ok(MarketState::Closed)
    }
}

/// Gate decision including test overrides: an active bypass forces the gate
/// open regardless of the clock.
pub fn effective_state(
    now: DateTime<Utc>,
    cfg: &MarketHoursConfig,
    test: &TestConfig,
) -> Result<MarketState, WatchError> {
    if test.bypass_gate() {
        return Ok(MarketState::Open);
    }
    market_state(now, cfg)
}
