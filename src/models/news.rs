//! Headline feed models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A language/country pair for a news feed query, e.g. `de`/`DE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub lang: String,
    pub country: String,
}

impl Locale {
    pub fn new(lang: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            country: country.into(),
        }
    }

    /// The `ceid` value Google News expects, e.g. `DE:de`.
    pub fn ceid(&self) -> String {
        format!("{}:{}", self.country, self.lang)
    }
}

/// One headline attached to an alert. Fetched per alerting ticker only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}
