//! Shared data models spanning the watch layers.

pub mod alert;
pub mod news;
pub mod quote;

pub use alert::{AlertState, Corridor, NotificationMessage};
pub use news::{Locale, NewsItem};
pub use quote::{Direction, Quote};
