pub mod aggregator;
pub mod config;
pub mod delivery;
pub mod digest;
pub mod fetcher;
pub mod parser;
pub mod pipeline;
pub mod prune;
pub mod types;
pub mod watermarks;

pub use aggregator::{Aggregator, DigestModel};
pub use config::{AppConfig, SmtpConfig};
pub use delivery::{DigestSink, SmtpSink};
pub use digest::RenderedDigest;
pub use fetcher::{FetchFeed, HttpFeedSource};
pub use pipeline::{DigestPipeline, RunReport};
pub use types::*;
pub use watermarks::WatermarkStore;
