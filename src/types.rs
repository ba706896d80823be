use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One feed origin and the metadata parsed from its document.
///
/// The `key` is derived from feed content (feed id, else title, else origin
/// URL), so an origin that moves to a new fetch URL keeps its identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// The URL this channel was fetched from.
    pub url: String,
    pub key: String,
    pub title: String,
    /// Homepage link advertised by the feed, if any.
    pub link: Option<String>,
    pub description: Option<String>,
    /// Keys of the items discovered in the same document.
    pub item_keys: Vec<String>,
}

impl Channel {
    /// Scheme + host of the channel's homepage, falling back to the fetch URL.
    pub fn home_page(&self) -> String {
        let raw = self.link.as_deref().unwrap_or(&self.url);
        match url::Url::parse(raw) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => format!("{}://{}", parsed.scheme(), host),
                None => raw.to_string(),
            },
            Err(_) => raw.to_string(),
        }
    }
}

/// One discrete unit of content belonging to a [`Channel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Content-derived key: entry id, else first link, else title.
    pub key: String,
    /// Key of the owning channel. Resolution can fail at prune time; items
    /// whose channel is missing from the aggregation are dropped.
    pub channel_key: String,
    pub title: String,
    /// Publication (or update) timestamp. Undated entries carry the Unix
    /// epoch so they are delivered once and deduplicated afterwards.
    pub published_at: DateTime<Utc>,
    pub content: String,
    pub links: Vec<String>,
}

impl Item {
    pub fn first_link(&self) -> &str {
        self.links.first().map(String::as_str).unwrap_or("")
    }
}

/// A failed source fetch, recorded for the digest. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchError {
    pub url: String,
    pub message: String,
}

/// Everything one fetch task contributes to the aggregation: zero or more
/// channels and zero or more items.
#[derive(Debug, Clone, Default)]
pub struct FeedPayload {
    pub channels: Vec<Channel>,
    pub items: Vec<Item>,
}

/// Tunables for the HTTP feed source.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "rss-digest/0.1".to_string(),
            timeout_secs: 300,
        }
    }
}

impl FetchConfig {
    /// Per-source time budget. A zero from a bad config is clamped to one
    /// second rather than disabling the fetch entirely.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed parse error: {0}")]
    Parse(String),

    #[error("failed to load watermarks from {path}: {reason}")]
    WatermarkLoad { path: PathBuf, reason: String },

    #[error("failed to save watermarks to {path}: {reason}")]
    WatermarkSave { path: PathBuf, reason: String },

    #[error("digest delivery failed: {0}")]
    Delivery(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DigestError>;
