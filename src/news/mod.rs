// =============================================================================
// News Module
// =============================================================================
//
// Headline list for the dashboard: an HTTP client for the configured RSS
// feed and a tolerant parser that fills in placeholders for missing fields.

pub mod client;
pub mod rss;

pub use client::{NewsClient, NewsSource};
pub use rss::NewsItem;
