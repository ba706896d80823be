use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::types::{DigestError, FetchConfig, Result};

/// Runtime configuration, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Ordered list of feed origin URLs to poll.
    pub feeds: Vec<String>,

    #[serde(default = "default_subject")]
    pub subject: String,

    /// Directory holding persisted state (the watermark file).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub send_from: String,
    pub send_to: String,
}

fn default_subject() -> String {
    "Feed digest".to_string()
}

fn default_fetch_timeout() -> u64 {
    300
}

fn default_smtp_port() -> u16 {
    587
}

fn default_data_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".rss-digest"),
        None => PathBuf::from(".rss-digest"),
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| DigestError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: AppConfig = toml::from_str(&raw)
            .map_err(|e| DigestError::Config(format!("failed to parse {}: {e}", path.display())))?;

        if config.feeds.is_empty() {
            return Err(DigestError::Config("no feeds configured".to_string()));
        }

        info!(
            feeds = config.feeds.len(),
            data_dir = %config.data_dir.display(),
            "loaded configuration"
        );
        Ok(config)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout_secs: self.fetch_timeout_secs,
            ..FetchConfig::default()
        }
    }
}
