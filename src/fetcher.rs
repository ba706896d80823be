use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::parser;
use crate::types::{FeedPayload, FetchConfig, Result};

/// Resolves one source locator into parsed feed records.
///
/// Implementations must not block past `timeout`; the orchestrator
/// additionally cancels the whole task at the same boundary.
#[async_trait]
pub trait FetchFeed: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FeedPayload>;
}

/// Production source: HTTP fetch via reqwest, RSS/Atom parse via feed-rs.
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }
}

#[async_trait]
impl FetchFeed for HttpFeedSource {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FeedPayload> {
        debug!(url, "fetching feed document");
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        debug!(url, bytes = body.len(), "fetched feed document");
        parser::parse_feed(url, &body)
    }
}
