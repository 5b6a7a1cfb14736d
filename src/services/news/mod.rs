//! News aggregation for alerting tickers
//!
//! Fetches Google News search RSS for a finance query and walks an ordered
//! list of locales until one yields usable headlines. Stale items are
//! dropped, titles are matched against the ticker keywords and every link is
//! sanitized before it reaches a notification body.

pub mod sanitize;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rss::Channel;
use tracing::{debug, warn};

use crate::config::NewsConfig;
use crate::error::WatchError;
use crate::models::{Locale, NewsItem};
use self::sanitize::sanitize_link;

const DEFAULT_BASE_URL: &str = "https://news.google.com";

/// Search terms appended to every query so a bare ticker string returns
/// finance coverage instead of arbitrary matches.
const FINANCE_TERMS: [&str; 16] = [
    "stock",
    "Aktie",
    "Börse",
    "earnings",
    "guidance",
    "outlook",
    "revenue",
    "profit",
    "dividend",
    "forecast",
    "rating",
    "upgrade",
    "downgrade",
    "merger",
    "acquisition",
    "M&A",
];

#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    /// Fetch recency-sorted headlines for a query in the given locale.
    async fn fetch_headlines(
        &self,
        query: &str,
        locale: &Locale,
        lookback_hours: u32,
    ) -> Result<Vec<NewsItem>, WatchError>;
}

/// Queries the Google News search RSS feed.
pub struct GoogleNewsProvider {
    base_url: String,
    client: reqwest::Client,
}

impl GoogleNewsProvider {
    pub fn new() -> Result<Self, WatchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| WatchError::provider(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self::with_client(DEFAULT_BASE_URL, client))
    }

    /// Create a provider against a custom base URL (used by tests).
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl NewsProvider for GoogleNewsProvider {
    async fn fetch_headlines(
        &self,
        query: &str,
        locale: &Locale,
        lookback_hours: u32,
    ) -> Result<Vec<NewsItem>, WatchError> {
        // The time window is part of the query itself via the `when:` operator.
        let windowed = format!("{} when:{}h", query, lookback_hours);
        let endpoint = format!("{}/rss/search", self.base_url);
        let url = url::Url::parse_with_params(
            &endpoint,
            &[
                ("q", windowed.as_str()),
                ("hl", locale.lang.as_str()),
                ("gl", locale.country.as_str()),
                ("ceid", locale.ceid().as_str()),
            ],
        )
        .map_err(|e| WatchError::provider(format!("invalid news URL: {}", e)))?;

        let body = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WatchError::provider(format!("news request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| WatchError::provider(format!("news request failed: {}", e)))?
            .bytes()
            .await
            .map_err(|e| WatchError::provider(format!("news response unreadable: {}", e)))?;

        let channel = Channel::read_from(&body[..])
            .map_err(|e| WatchError::provider(format!("news feed parse failed: {}", e)))?;

        let items = channel
            .items()
            .iter()
            .filter_map(|item| {
                let title = item.title()?.trim().to_string();
                let link = item.link()?.trim().to_string();
                if title.is_empty() || link.is_empty() {
                    return None;
                }
                let published_at = item
                    .pub_date()
                    .and_then(|raw| DateTime::parse_from_rfc2822(raw).ok())
                    .map(|ts| ts.with_timezone(&Utc));
                let source = item.source().and_then(|s| s.title()).map(str::to_string);
                Some(NewsItem {
                    title,
                    link,
                    source,
                    published_at,
                })
            })
            .collect();
        Ok(items)
    }
}

/// Fallback-aware headline selection on top of a [`NewsProvider`].
pub struct NewsAggregator {
    provider: Arc<dyn NewsProvider>,
    config: NewsConfig,
}

impl NewsAggregator {
    pub fn new(provider: Arc<dyn NewsProvider>, config: NewsConfig) -> Self {
        Self { provider, config }
    }

    /// Best-effort headline list for an alerting ticker. Any failure degrades
    /// to an empty list; the alert itself still goes out.
    pub async fn headlines_for(&self, ticker: &str, now: DateTime<Utc>) -> Vec<NewsItem> {
        let query = build_query(None, ticker);
        let keywords = ticker_keywords(ticker);
        for locale in self.config.locales() {
            let fetched = match self
                .provider
                .fetch_headlines(&query, &locale, self.config.lookback_hours)
                .await
            {
                Ok(items) => items,
                Err(e) => {
                    warn!(ticker = %ticker, lang = %locale.lang, error = %e, "news fetch failed");
                    continue;
                }
            };
            let selected = self.select(fetched, &keywords, now);
            if !selected.is_empty() {
                return selected;
            }
            debug!(ticker = %ticker, lang = %locale.lang, "no usable headlines, trying next locale");
        }
        Vec::new()
    }

    /// Drop stale items, keep title matches, cap the list and sanitize links.
    /// Items without a publication date are kept; the feed is already scoped
    /// by the `when:` window.
    fn select(&self, items: Vec<NewsItem>, keywords: &[String], now: DateTime<Utc>) -> Vec<NewsItem> {
        let cutoff = now - chrono::Duration::hours(i64::from(self.config.lookback_hours));
        let fresh: Vec<NewsItem> = items
            .into_iter()
            .filter(|item| item.published_at.map(|ts| ts >= cutoff).unwrap_or(true))
            .collect();
        filter_titles(fresh, keywords)
            .into_iter()
            .take(self.config.max_items)
            .map(|mut item| {
                item.link = sanitize_link(&item.link);
                item
            })
            .collect()
    }
}

/// OR-combine the display name (when known) and the ticker with the finance
/// term block the search feed expects.
pub fn build_query(name: Option<&str>, ticker: &str) -> String {
    let ticker = ticker.trim();
    let mut parts = Vec::new();
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        parts.push(format!("\"{}\"", name));
    }
    if !ticker.is_empty() {
        parts.push(ticker.to_string());
    }
    let base = if parts.is_empty() {
        ticker.to_string()
    } else {
        parts.join(" OR ")
    };
    format!("{} ({})", base, FINANCE_TERMS.join(" OR "))
}

/// `"SAP.DE"` → `"SAP"`, `"BRK-B"` → `"BRK"`; index symbols like `"^GDAXI"`
/// pass through unchanged.
pub fn base_ticker(symbol: &str) -> &str {
    if symbol.starts_with('^') {
        return symbol;
    }
    symbol.split(['.', '-']).next().unwrap_or(symbol)
}

/// Keep only items whose title contains one of the required keywords,
/// case-insensitive. An empty keyword list keeps everything.
pub fn filter_titles(items: Vec<NewsItem>, required_keywords: &[String]) -> Vec<NewsItem> {
    let required: Vec<String> = required_keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if required.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| {
            let title = item.title.to_lowercase();
            required.iter().any(|keyword| title.contains(keyword))
        })
        .collect()
}

fn ticker_keywords(ticker: &str) -> Vec<String> {
    let base = base_ticker(ticker);
    let mut keywords = vec![base.to_string()];
    if !base.eq_ignore_ascii_case(ticker) {
        keywords.push(ticker.to_string());
    }
    keywords
}
