//! One full watch pass over the configured tickers
//!
//! Control flow: market-hours gate, then per ticker quote → corridor
//! transition → (on alert) news aggregation → compose → send. State is
//! mutated in memory per ticker and persisted once at run end, so a failed
//! ticker leaves its prior entry untouched while successful tickers still
//! advance.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::core::compose::compose;
use crate::core::gate::{self, MarketState};
use crate::error::WatchError;
use crate::models::{AlertState, Corridor, Direction, Quote};
use crate::services::market_data::{QuoteProvider, YahooQuoteProvider};
use crate::services::news::{GoogleNewsProvider, NewsAggregator, NewsProvider};
use crate::services::ntfy::{Notifier, NtfyNotifier};
use crate::state::{JsonStateStore, StateMap, StateStore};

/// Counters for one run, for worker logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub market_open: bool,
    pub tickers_evaluated: usize,
    pub tickers_skipped: usize,
    pub alerts_fired: usize,
    pub sends_failed: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct TickerOutcome {
    fired: bool,
    send_failed: bool,
}

pub struct Runner {
    config: Config,
    quotes: Arc<dyn QuoteProvider>,
    news: NewsAggregator,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn StateStore>,
}

impl Runner {
    pub fn new(
        config: Config,
        quotes: Arc<dyn QuoteProvider>,
        news: NewsAggregator,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            config,
            quotes,
            news,
            notifier,
            store,
        }
    }

    /// Wire the default collaborators (Yahoo quotes, Google News RSS, ntfy,
    /// JSON state file) from the configuration.
    pub fn from_config(config: Config) -> Result<Self, WatchError> {
        let quotes: Arc<dyn QuoteProvider> = Arc::new(YahooQuoteProvider::new()?);
        let news_provider: Arc<dyn NewsProvider> = Arc::new(GoogleNewsProvider::new()?);
        let news = NewsAggregator::new(news_provider, config.news.clone());
        let notifier: Arc<dyn Notifier> =
            Arc::new(NtfyNotifier::new(&config.ntfy, config.test.dry_run)?);
        let store: Arc<dyn StateStore> = Arc::new(JsonStateStore::new(config.state_file.clone()));
        Ok(Self::new(config, quotes, news, notifier, store))
    }

    /// Execute one monitoring cycle. Per-ticker failures are logged and
    /// skipped; only a persistence failure aborts the run.
    pub async fn run_once(&self) -> Result<RunSummary, WatchError> {
        let now = Utc::now();
        let mut summary = RunSummary::default();

        let market = gate::effective_state(now, &self.config.market_hours, &self.config.test)?;
        summary.market_open = market == MarketState::Open;
        if market == MarketState::Closed {
            if self.config.market_hours.pause_on_closed {
                info!("outside market hours, nothing to do");
                return Ok(summary);
            }
            info!("outside market hours, pause_on_closed disabled, running anyway");
        }

        info!(
            tickers = %self.config.tickers.join(","),
            threshold = self.config.threshold_pct,
            "run start"
        );

        let mut state = self.store.load()?;

        for ticker in &self.config.tickers {
            match self.process_ticker(ticker, now, &mut state).await {
                Ok(outcome) => {
                    summary.tickers_evaluated += 1;
                    if outcome.fired {
                        summary.alerts_fired += 1;
                    }
                    if outcome.send_failed {
                        summary.sends_failed += 1;
                    }
                }
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "skipping ticker for this run");
                    summary.tickers_skipped += 1;
                }
            }
        }

        self.store.persist(&state)?;

        info!(
            evaluated = summary.tickers_evaluated,
            skipped = summary.tickers_skipped,
            alerts = summary.alerts_fired,
            "run complete"
        );
        Ok(summary)
    }

    async fn process_ticker(
        &self,
        ticker: &str,
        now: DateTime<Utc>,
        state: &mut StateMap,
    ) -> Result<TickerOutcome, WatchError> {
        let (open_price, last_price) = self.quotes.fetch_quote(ticker).await?;
        let mut quote = Quote::new(ticker, open_price, last_price)?;

        if let Some(forced) = self.config.test.forced_delta() {
            info!(
                ticker = %ticker,
                forced = forced,
                was = quote.delta_pct,
                "test override: forcing delta"
            );
            quote = quote.with_forced_delta(forced);
        }

        info!(
            ticker = %ticker,
            last = quote.last_price,
            open = quote.open_price,
            delta = quote.delta_pct,
            "quote"
        );

        let direction = quote.direction(self.config.threshold_pct);
        let previous = state.get(ticker).map(|s| s.corridor).unwrap_or_default();
        let transition = previous.transition(direction);

        let mut outcome = TickerOutcome::default();
        if transition.fire {
            let headlines = if self.config.news.enabled {
                self.news.headlines_for(ticker, now).await
            } else {
                Vec::new()
            };
            let message = compose(&quote, direction, &headlines, self.config.news.max_items);
            outcome.fired = true;
            match self.notifier.send(&message).await {
                Ok(()) => {
                    info!(ticker = %ticker, direction = ?direction, "alert sent");
                }
                Err(e) => {
                    // Breach memory still advances: a delivery failure must
                    // not produce a duplicate alert on the next run.
                    error!(ticker = %ticker, error = %e, "alert delivery failed");
                    outcome.send_failed = true;
                }
            }
        } else if previous != Corridor::None && transition.next == Corridor::None {
            info!(ticker = %ticker, previous = ?previous, "back in corridor, reset");
        } else if direction != Direction::Inside {
            info!(
                ticker = %ticker,
                corridor = ?previous,
                "already alerted, waiting for corridor re-entry"
            );
        } else {
            info!(
                ticker = %ticker,
                threshold = self.config.threshold_pct,
                "no alert"
            );
        }

        let entry = state
            .entry(ticker.to_string())
            .or_insert_with(|| AlertState::new(now, quote.last_price));
        entry.corridor = transition.next;
        entry.last_checked = now;
        entry.last_price = quote.last_price;

        Ok(outcome)
    }
}
