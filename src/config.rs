//! Configuration loading with environment interpolation
//!
//! The configuration is a JSON file mirroring the shape the settings UI
//! writes: tickers, threshold, ntfy endpoint, market hours, news and test
//! blocks. `${VAR}` and `${VAR:default}` placeholders are resolved against
//! the process environment before deserialization, so secrets like the ntfy
//! topic never need to live in the file itself.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::WatchError;
use crate::models::Locale;

/// Deployment environment, used to pick the log format.
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub tickers: Vec<String>,
    pub threshold_pct: f64,
    pub ntfy: NtfyConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default)]
    pub market_hours: MarketHoursConfig,
    #[serde(default)]
    pub test: TestConfig,
    #[serde(default)]
    pub news: NewsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NtfyConfig {
    #[serde(default = "default_ntfy_server")]
    pub server: String,
    pub topic: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketHoursConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_open")]
    pub open: String,
    #[serde(default = "default_close")]
    pub close: String,
    /// Active weekdays, 1 = Monday .. 7 = Sunday.
    #[serde(default = "default_active_days")]
    pub active_days: Vec<u8>,
    #[serde(default = "default_true")]
    pub pause_on_closed: bool,
}

impl MarketHoursConfig {
    pub fn tz(&self) -> Result<Tz, WatchError> {
        self.timezone
            .parse()
            .map_err(|_| WatchError::config(format!("unknown timezone '{}'", self.timezone)))
    }

    pub fn open_time(&self) -> Result<NaiveTime, WatchError> {
        parse_hhmm(&self.open)
    }

    pub fn close_time(&self) -> Result<NaiveTime, WatchError> {
        parse_hhmm(&self.close)
    }
}

impl Default for MarketHoursConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            open: default_open(),
            close: default_close(),
            active_days: default_active_days(),
            pause_on_closed: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_fallback_lang")]
    pub fallback_lang: String,
    #[serde(default = "default_fallback_country")]
    pub fallback_country: String,
}

impl NewsConfig {
    /// Ordered feed attempts: primary locale first, then the fallback.
    /// Evaluated until one yields a non-empty result.
    pub fn locales(&self) -> Vec<Locale> {
        let primary = Locale::new(&self.lang, &self.country);
        let fallback = Locale::new(&self.fallback_lang, &self.fallback_country);
        if fallback == primary {
            vec![primary]
        } else {
            vec![primary, fallback]
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_items: default_max_items(),
            lookback_hours: default_lookback_hours(),
            lang: default_lang(),
            country: default_country(),
            fallback_lang: default_fallback_lang(),
            fallback_country: default_fallback_country(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub bypass_market_hours: bool,
    #[serde(default)]
    pub force_delta_pct: Option<f64>,
    #[serde(default)]
    pub force_run_outside_hours: bool,
}

impl TestConfig {
    /// Whether the market-hours gate should be forced open.
    /// `force_run_outside_hours` is the legacy switch and applies on its own.
    pub fn bypass_gate(&self) -> bool {
        (self.enabled && self.bypass_market_hours) || self.force_run_outside_hours
    }

    pub fn forced_delta(&self) -> Option<f64> {
        if self.enabled {
            self.force_delta_pct
        } else {
            None
        }
    }
}

impl Config {
    /// Read, interpolate and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WatchError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            WatchError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Parse a configuration from raw JSON text, resolving `${VAR}`
    /// placeholders against the process environment.
    pub fn from_json(raw: &str) -> Result<Self, WatchError> {
        let resolved = interpolate(raw, |name| env::var(name).ok())?;
        let config: Config = serde_json::from_str(&resolved)
            .map_err(|e| WatchError::config(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), WatchError> {
        if self.tickers.is_empty() {
            return Err(WatchError::config("ticker list must not be empty"));
        }
        if self.tickers.iter().any(|t| t.trim().is_empty()) {
            return Err(WatchError::config("ticker list contains a blank entry"));
        }
        if !self.threshold_pct.is_finite() || self.threshold_pct <= 0.0 {
            return Err(WatchError::config(format!(
                "threshold_pct must be a positive number, got {}",
                self.threshold_pct
            )));
        }
        if self.news.lookback_hours == 0 {
            return Err(WatchError::config("news.lookback_hours must be > 0"));
        }
        if self.ntfy.topic.trim().is_empty() {
            return Err(WatchError::config("ntfy.topic must not be empty"));
        }
        self.market_hours.tz()?;
        self.market_hours.open_time()?;
        self.market_hours.close_time()?;
        if let Some(day) = self.market_hours.active_days.iter().find(|d| !(1..=7).contains(*d)) {
            return Err(WatchError::config(format!(
                "market_hours.active_days entries must be 1..=7 (Mon..Sun), got {}",
                day
            )));
        }
        Ok(())
    }
}

fn parse_hhmm(value: &str) -> Result<NaiveTime, WatchError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| WatchError::config(format!("expected HH:MM time, got '{}'", value)))
}

/// Resolve `${VAR}` / `${VAR:default}` placeholders. A placeholder with no
/// value and no default is a hard configuration error rather than an empty
/// string, so a missing secret fails the run up front.
pub fn interpolate<F>(raw: &str, lookup: F) -> Result<String, WatchError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| WatchError::config("unterminated ${ placeholder in configuration"))?;
        let expr = &after[..end];
        let (name, default) = match expr.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (expr, None),
        };
        let value = lookup(name)
            .or_else(|| default.map(|d| d.to_string()))
            .ok_or_else(|| {
                WatchError::config(format!(
                    "environment variable '{}' is not set and has no default",
                    name
                ))
            })?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn default_state_file() -> PathBuf {
    PathBuf::from("alert_state.json")
}

fn default_ntfy_server() -> String {
    "https://ntfy.sh".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_open() -> String {
    "09:30".to_string()
}

fn default_close() -> String {
    "16:00".to_string()
}

fn default_active_days() -> Vec<u8> {
    vec![1, 2, 3, 4, 5]
}

fn default_true() -> bool {
    true
}

fn default_max_items() -> usize {
    3
}

fn default_lookback_hours() -> u32 {
    12
}

fn default_lang() -> String {
    "de".to_string()
}

fn default_country() -> String {
    "DE".to_string()
}

fn default_fallback_lang() -> String {
    "en".to_string()
}

fn default_fallback_country() -> String {
    "US".to_string()
}
