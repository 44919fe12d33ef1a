use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument};

use super::rss::{parse_feed, NewsItem};
use crate::error::NewsError;

/// Source of recent headlines.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_headlines(&self, limit: usize) -> Result<Vec<NewsItem>, NewsError>;
}

/// Fetches and parses a syndication feed over HTTP.
#[derive(Clone)]
pub struct NewsClient {
    feed_url: String,
    client: reqwest::Client,
}

impl NewsClient {
    pub fn new(feed_url: impl Into<String>) -> anyhow::Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build news HTTP client")?;

        Ok(Self {
            feed_url: feed_url.into(),
            client,
        })
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }
}

#[async_trait]
impl NewsSource for NewsClient {
    #[instrument(skip(self), fields(url = %self.feed_url), name = "news::fetch_headlines")]
    async fn fetch_headlines(&self, limit: usize) -> Result<Vec<NewsItem>, NewsError> {
        let resp = self.client.get(&self.feed_url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NewsError::Status(status));
        }

        let body = resp.text().await?;
        let items = parse_feed(&body, limit)?;
        debug!(count = items.len(), "news feed parsed");
        Ok(items)
    }
}
