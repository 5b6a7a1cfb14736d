//! Integration tests for the watch runner
//!
//! Each test drives one or more full `run_once` passes and asserts on the
//! requests the mocked collaborators received plus the persisted state.


use chrono::{Duration, Utc};
use stockwatch::config::MarketHoursConfig;

use test_utils::{
    mock_news_feed, mock_ntfy_failure, mock_ntfy_ok, mock_quote, mock_quote_failure, ntfy_bodies,
    rss_feed, TestApp, TestOptions,
};

#[tokio::test]
async fn breach_fires_one_alert_and_repeat_runs_stay_silent() {
    let app = TestApp::new().await;
    mock_quote(&app.quotes, "AAPL", 100.0, 102.0).await;
    mock_ntfy_ok(&app.ntfy).await;

    let first = app.runner.run_once().await.unwrap();
    assert!(first.market_open);
    assert_eq!(first.alerts_fired, 1);
    assert_eq!(app.persisted_corridor("AAPL").as_deref(), Some("up"));

    // Same breach on the next run: corridor memory suppresses the repeat.
    let second = app.runner.run_once().await.unwrap();
    assert_eq!(second.alerts_fired, 0);
    assert_eq!(ntfy_bodies(&app.ntfy).await.len(), 1);
}

#[tokio::test]
async fn corridor_reset_allows_the_next_breach_to_fire() {
    let app = TestApp::new().await;
    mock_ntfy_ok(&app.ntfy).await;

    mock_quote(&app.quotes, "AAPL", 100.0, 102.0).await;
    app.runner.run_once().await.unwrap();
    assert_eq!(app.persisted_corridor("AAPL").as_deref(), Some("up"));

    // Back inside the corridor: silent reset.
    app.quotes.reset().await;
    mock_quote(&app.quotes, "AAPL", 100.0, 100.2).await;
    let reset_run = app.runner.run_once().await.unwrap();
    assert_eq!(reset_run.alerts_fired, 0);
    assert_eq!(app.persisted_corridor("AAPL").as_deref(), Some("none"));

    // Re-breach in the same direction fires again.
    app.quotes.reset().await;
    mock_quote(&app.quotes, "AAPL", 100.0, 102.0).await;
    let rebreach = app.runner.run_once().await.unwrap();
    assert_eq!(rebreach.alerts_fired, 1);
    assert_eq!(ntfy_bodies(&app.ntfy).await.len(), 2);
}

#[tokio::test]
async fn direct_flip_between_directions_fires_both_alerts() {
    let app = TestApp::new().await;
    mock_ntfy_ok(&app.ntfy).await;

    mock_quote(&app.quotes, "AAPL", 100.0, 102.0).await;
    app.runner.run_once().await.unwrap();

    app.quotes.reset().await;
    mock_quote(&app.quotes, "AAPL", 100.0, 98.0).await;
    let flipped = app.runner.run_once().await.unwrap();
    assert_eq!(flipped.alerts_fired, 1);
    assert_eq!(app.persisted_corridor("AAPL").as_deref(), Some("down"));

    let bodies = ntfy_bodies(&app.ntfy).await;
    assert_eq!(bodies.len(), 2);
    assert!(bodies[0]["title"].as_str().unwrap().contains("↑"));
    assert!(bodies[1]["title"].as_str().unwrap().contains("↓"));
}

#[tokio::test]
async fn quote_failure_for_one_ticker_does_not_block_the_others() {
    let app = TestApp::with_options(TestOptions {
        tickers: vec!["AAPL".to_string(), "SAP.DE".to_string()],
        ..TestOptions::default()
    })
    .await;
    mock_quote_failure(&app.quotes, "AAPL").await;
    mock_quote(&app.quotes, "SAP.DE", 100.0, 103.0).await;
    mock_ntfy_ok(&app.ntfy).await;

    let summary = app.runner.run_once().await.unwrap();

    assert_eq!(summary.tickers_evaluated, 1);
    assert_eq!(summary.tickers_skipped, 1);
    assert_eq!(summary.alerts_fired, 1);
    assert_eq!(app.persisted_corridor("SAP.DE").as_deref(), Some("up"));
    // The failed ticker has no persisted entry to clobber.
    assert_eq!(app.persisted_corridor("AAPL"), None);
}

#[tokio::test]
async fn alert_carries_news_block_and_sanitized_click_url() {
    let app = TestApp::with_options(TestOptions {
        news_enabled: true,
        ..TestOptions::default()
    })
    .await;
    mock_quote(&app.quotes, "AAPL", 100.0, 102.0).await;
    mock_ntfy_ok(&app.ntfy).await;

    let now = Utc::now();
    let feed = rss_feed(&[
        (
            "AAPL rallies after earnings",
            "https://news.google.com/rss/articles/x?url=https%3A%2F%2Fexample.com%2Fstory&amp;oc=5",
            now - Duration::hours(1),
        ),
        (
            "AAPL supplier roundup",
            "https://example.com/roundup",
            now - Duration::hours(2),
        ),
    ]);
    mock_news_feed(&app.news, &feed).await;

    let summary = app.runner.run_once().await.unwrap();
    assert_eq!(summary.alerts_fired, 1);

    let bodies = ntfy_bodies(&app.ntfy).await;
    assert_eq!(bodies.len(), 1);
    let message = bodies[0]["message"].as_str().unwrap();
    assert!(message.contains("📰 News:"));
    assert!(message.contains("• AAPL rallies after earnings"));
    assert_eq!(bodies[0]["click"].as_str(), Some("https://example.com/story"));
}

#[tokio::test]
async fn news_failure_does_not_stop_the_alert() {
    let app = TestApp::with_options(TestOptions {
        news_enabled: true,
        ..TestOptions::default()
    })
    .await;
    mock_quote(&app.quotes, "AAPL", 100.0, 102.0).await;
    mock_ntfy_ok(&app.ntfy).await;
    // No /rss/search mock mounted: both locale attempts 404.

    let summary = app.runner.run_once().await.unwrap();
    assert_eq!(summary.alerts_fired, 1);

    let bodies = ntfy_bodies(&app.ntfy).await;
    assert_eq!(bodies.len(), 1);
    assert!(!bodies[0]["message"].as_str().unwrap().contains("📰"));
    assert!(bodies[0].get("click").is_none());
}

#[tokio::test]
async fn dry_run_logs_instead_of_delivering() {
    let app = TestApp::with_options(TestOptions {
        dry_run: true,
        ..TestOptions::default()
    })
    .await;
    mock_quote(&app.quotes, "AAPL", 100.0, 102.0).await;

    let summary = app.runner.run_once().await.unwrap();

    // The alert fired and the corridor advanced, but nothing left the process.
    assert_eq!(summary.alerts_fired, 1);
    assert_eq!(summary.sends_failed, 0);
    assert_eq!(app.persisted_corridor("AAPL").as_deref(), Some("up"));
    assert!(ntfy_bodies(&app.ntfy).await.is_empty());
}

#[tokio::test]
async fn closed_market_skips_the_whole_run() {
    // Zero-length window: open == close is always closed.
    let app = TestApp::with_options(TestOptions {
        market_hours: Some(MarketHoursConfig {
            timezone: "UTC".to_string(),
            open: "09:30".to_string(),
            close: "09:30".to_string(),
            active_days: vec![1, 2, 3, 4, 5, 6, 7],
            pause_on_closed: true,
        }),
        ..TestOptions::default()
    })
    .await;
    mock_quote(&app.quotes, "AAPL", 100.0, 102.0).await;

    let summary = app.runner.run_once().await.unwrap();

    assert!(!summary.market_open);
    assert_eq!(summary.tickers_evaluated, 0);
    assert!(app
        .quotes
        .received_requests()
        .await
        .unwrap_or_default()
        .is_empty());
}

#[tokio::test]
async fn delivery_failure_still_advances_the_corridor() {
    let app = TestApp::new().await;
    mock_quote(&app.quotes, "AAPL", 100.0, 102.0).await;
    mock_ntfy_failure(&app.ntfy).await;

    let first = app.runner.run_once().await.unwrap();
    assert_eq!(first.alerts_fired, 1);
    assert_eq!(first.sends_failed, 1);
    // Initial attempt plus two bounded retries.
    assert_eq!(ntfy_bodies(&app.ntfy).await.len(), 3);
    assert_eq!(app.persisted_corridor("AAPL").as_deref(), Some("up"));

    // The breach is remembered, so the failed delivery is not re-sent.
    let second = app.runner.run_once().await.unwrap();
    assert_eq!(second.alerts_fired, 0);
    assert_eq!(ntfy_bodies(&app.ntfy).await.len(), 3);
}
