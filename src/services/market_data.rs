//! Quote provider interface and the Yahoo Finance chart implementation.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::WatchError;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Get the day's opening price and the most recent trade price.
    async fn fetch_quote(&self, ticker: &str) -> Result<(f64, f64), WatchError>;
}

/// Fetches intraday quotes from the Yahoo Finance v8 chart endpoint.
pub struct YahooQuoteProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooQuoteProvider {
    pub fn new() -> Result<Self, WatchError> {
        // The chart endpoint rejects requests without a browser-ish UA.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (compatible; stockwatch/0.1)")
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

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
}

#[async_trait::async_trait]
impl QuoteProvider for YahooQuoteProvider {
    async fn fetch_quote(&self, ticker: &str) -> Result<(f64, f64), WatchError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let response = self
            .client
            .get(&url)
            .query(&[("interval", "1m"), ("range", "1d")])
            .send()
            .await
            .map_err(|e| WatchError::provider(format!("quote request for {} failed: {}", ticker, e)))?
            .error_for_status()
            .map_err(|e| WatchError::provider(format!("quote request for {} failed: {}", ticker, e)))?;

        let parsed: ChartResponse = response
            .json()
            .await
            .map_err(|e| WatchError::provider(format!("quote response for {} unreadable: {}", ticker, e)))?;

        if let Some(err) = parsed.chart.error {
            return Err(WatchError::provider(format!(
                "chart error for {}: {} {}",
                ticker,
                err.code.unwrap_or_default(),
                err.description.unwrap_or_default()
            )));
        }

        let result = parsed
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| WatchError::provider(format!("empty chart result for {}", ticker)))?;

        let last = result
            .meta
            .regular_market_price
            .ok_or_else(|| WatchError::provider(format!("no market price for {}", ticker)))?;

        // Opening price is the first filled candle of the session.
        let open = result
            .indicators
            .quote
            .first()
            .and_then(|q| q.open.iter().flatten().copied().next())
            .ok_or_else(|| WatchError::provider(format!("no opening price for {}", ticker)))?;

        debug!(ticker = %ticker, open = open, last = last, "quote fetched");
        Ok((open, last))
    }
}
