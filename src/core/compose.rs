//! Notification composer
//!
//! Renders the push title and body from a quote plus an optional headline
//! list. The title stays single-line; the body carries the price detail and
//! up to `max_items` bullet headlines.

use crate::models::{Direction, NewsItem, NotificationMessage, Quote};

pub fn compose(
    quote: &Quote,
    direction: Direction,
    news: &[NewsItem],
    max_items: usize,
) -> NotificationMessage {
    let (arrow, glyph) = match direction {
        Direction::Down => ("↓", "📉"),
        _ => ("↑", "📈"),
    };

    let title = format!(
        "{} {} {:+.2}% {}",
        quote.ticker, arrow, quote.delta_pct, glyph
    );

    let mut body = format!(
        "{} {}: {:+.2}% vs. open\nLast: {:.2} | Open: {:.2}",
        glyph, quote.ticker, quote.delta_pct, quote.last_price, quote.open_price
    );

    let shown: Vec<&NewsItem> = news.iter().take(max_items).collect();
    if !shown.is_empty() {
        body.push_str("\n\n📰 News:");
        for item in &shown {
            body.push_str("\n• ");
            body.push_str(&item.title);
        }
    }

    let click_url = shown.first().map(|item| item.link.clone());

    NotificationMessage {
        title,
        body,
        click_url,
    }
}
