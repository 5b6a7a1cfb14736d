//! Unit tests for news aggregation and locale fallback

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use stockwatch::config::NewsConfig;
use stockwatch::error::WatchError;
use stockwatch::models::{Locale, NewsItem};
use stockwatch::services::news::{base_ticker, build_query, filter_titles, NewsAggregator, NewsProvider};

/// Serves canned feeds keyed by language; unknown languages yield an empty
/// feed, `Err` entries a provider failure.
struct StubProvider {
    feeds: HashMap<String, Result<Vec<NewsItem>, String>>,
}

impl StubProvider {
    fn new(feeds: Vec<(&str, Result<Vec<NewsItem>, String>)>) -> Arc<Self> {
        Arc::new(Self {
            feeds: feeds
                .into_iter()
                .map(|(lang, feed)| (lang.to_string(), feed))
                .collect(),
        })
    }
}

#[async_trait::async_trait]
impl NewsProvider for StubProvider {
    async fn fetch_headlines(
        &self,
        _query: &str,
        locale: &Locale,
        _lookback_hours: u32,
    ) -> Result<Vec<NewsItem>, WatchError> {
        match self.feeds.get(&locale.lang) {
            Some(Ok(items)) => Ok(items.clone()),
            Some(Err(message)) => Err(WatchError::provider(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

fn news_config() -> NewsConfig {
    NewsConfig {
        enabled: true,
        max_items: 3,
        lookback_hours: 12,
        lang: "de".to_string(),
        country: "DE".to_string(),
        fallback_lang: "en".to_string(),
        fallback_country: "US".to_string(),
    }
}

fn item(title: &str, age_hours: i64) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        link: "https://example.com/story".to_string(),
        source: Some("Example".to_string()),
        published_at: Some(Utc::now() - Duration::hours(age_hours)),
    }
}

#[test]
fn caps_at_max_items_and_drops_stale_entries() {
    let provider = StubProvider::new(vec![(
        "de",
        Ok(vec![
            item("AAPL rally continues", 1),
            item("AAPL earnings preview", 2),
            item("AAPL supplier update", 3),
            item("AAPL old analysis", 20),
            item("AAPL stale recap", 26),
        ]),
    )]);
    let aggregator = NewsAggregator::new(provider, news_config());

    let headlines = tokio_test::block_on(aggregator.headlines_for("AAPL", Utc::now()));

    assert_eq!(headlines.len(), 3);
    assert!(headlines.iter().all(|h| !h.title.contains("old") && !h.title.contains("stale")));
}

#[test]
fn prefers_primary_locale_when_it_has_results() {
    let provider = StubProvider::new(vec![
        ("de", Ok(vec![item("AAPL Aktie legt zu", 1)])),
        ("en", Ok(vec![item("AAPL stock climbs", 1), item("AAPL beats", 2)])),
    ]);
    let aggregator = NewsAggregator::new(provider, news_config());

    let headlines = tokio_test::block_on(aggregator.headlines_for("AAPL", Utc::now()));

    assert_eq!(headlines.len(), 1);
    assert_eq!(headlines[0].title, "AAPL Aktie legt zu");
}

#[test]
fn falls_back_when_primary_is_empty() {
    let provider = StubProvider::new(vec![
        ("de", Ok(Vec::new())),
        ("en", Ok(vec![item("AAPL stock climbs", 1)])),
    ]);
    let aggregator = NewsAggregator::new(provider, news_config());

    let headlines = tokio_test::block_on(aggregator.headlines_for("AAPL", Utc::now()));

    assert_eq!(headlines.len(), 1);
    assert_eq!(headlines[0].title, "AAPL stock climbs");
}

#[test]
fn falls_back_when_primary_errors() {
    let provider = StubProvider::new(vec![
        ("de", Err("feed unavailable".to_string())),
        ("en", Ok(vec![item("AAPL stock climbs", 1)])),
    ]);
    let aggregator = NewsAggregator::new(provider, news_config());

    let headlines = tokio_test::block_on(aggregator.headlines_for("AAPL", Utc::now()));

    assert_eq!(headlines.len(), 1);
}

#[test]
fn both_locales_failing_yields_empty_list() {
    let provider = StubProvider::new(vec![
        ("de", Err("feed unavailable".to_string())),
        ("en", Err("feed unavailable".to_string())),
    ]);
    let aggregator = NewsAggregator::new(provider, news_config());

    let headlines = tokio_test::block_on(aggregator.headlines_for("AAPL", Utc::now()));

    assert!(headlines.is_empty());
}

#[test]
fn titles_without_ticker_keywords_are_dropped() {
    let provider = StubProvider::new(vec![(
        "de",
        Ok(vec![
            item("Completely unrelated story", 1),
            item("AAPL rallies after earnings", 1),
        ]),
    )]);
    let aggregator = NewsAggregator::new(provider, news_config());

    let headlines = tokio_test::block_on(aggregator.headlines_for("AAPL", Utc::now()));

    assert_eq!(headlines.len(), 1);
    assert_eq!(headlines[0].title, "AAPL rallies after earnings");
}

#[test]
fn base_ticker_matches_titles_for_suffixed_symbols() {
    let provider = StubProvider::new(vec![(
        "de",
        Ok(vec![item("SAP stellt neue Guidance vor", 1)]),
    )]);
    let aggregator = NewsAggregator::new(provider, news_config());

    let headlines = tokio_test::block_on(aggregator.headlines_for("SAP.DE", Utc::now()));

    assert_eq!(headlines.len(), 1);
}

#[test]
fn undated_items_are_kept() {
    let mut undated = item("AAPL update", 0);
    undated.published_at = None;
    let provider = StubProvider::new(vec![("de", Ok(vec![undated]))]);
    let aggregator = NewsAggregator::new(provider, news_config());

    let headlines = tokio_test::block_on(aggregator.headlines_for("AAPL", Utc::now()));

    assert_eq!(headlines.len(), 1);
}

#[test]
fn links_are_sanitized_during_selection() {
    let mut wrapped = item("AAPL jumps", 1);
    wrapped.link =
        "https://news.google.com/rss/articles/x?url=https%3A%2F%2Fexample.com%2Fstory&oc=5"
            .to_string();
    let provider = StubProvider::new(vec![("de", Ok(vec![wrapped]))]);
    let aggregator = NewsAggregator::new(provider, news_config());

    let headlines = tokio_test::block_on(aggregator.headlines_for("AAPL", Utc::now()));

    assert_eq!(headlines[0].link, "https://example.com/story");
}

#[test]
fn query_combines_symbol_name_and_finance_terms() {
    let query = build_query(Some("Apple"), "AAPL");
    assert!(query.starts_with("\"Apple\" OR AAPL ("));
    assert!(query.contains("earnings"));
    assert!(query.contains("dividend"));

    let bare = build_query(None, "AAPL");
    assert!(bare.starts_with("AAPL ("));
}

#[test]
fn base_ticker_strips_exchange_and_class_suffixes() {
    assert_eq!(base_ticker("SAP.DE"), "SAP");
    assert_eq!(base_ticker("BRK-B"), "BRK");
    assert_eq!(base_ticker("AAPL"), "AAPL");
    assert_eq!(base_ticker("^GDAXI"), "^GDAXI");
}

#[test]
fn title_filter_is_case_insensitive_and_optional() {
    let items = vec![item("Apple beats estimates", 1), item("Oranges are fine", 1)];

    let filtered = filter_titles(items.clone(), &["apple".to_string()]);
    assert_eq!(filtered.len(), 1);

    let unfiltered = filter_titles(items, &[]);
    assert_eq!(unfiltered.len(), 2);
}
