use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::aggregator::{Aggregator, DigestModel};
use crate::config::AppConfig;
use crate::delivery::DigestSink;
use crate::digest;
use crate::fetcher::FetchFeed;
use crate::prune;
use crate::types::{FetchError, Result};
use crate::watermarks::WatermarkStore;

/// Outcome of one completed pass, for logging and exit status.
#[derive(Debug)]
pub struct RunReport {
    pub channels: usize,
    pub items: usize,
    pub fetch_errors: usize,
}

/// One discrete fetch-and-digest pass over the configured sources.
///
/// Load watermarks, fan out one fetch task per source, join them all, prune
/// already-delivered items and emptied channels, deliver the rendered digest,
/// then advance and persist the watermarks. Watermarks are only written after
/// a successful delivery, so a failed send retries the same items next run.
pub struct DigestPipeline<F, S> {
    config: AppConfig,
    source: Arc<F>,
    sink: S,
}

impl<F, S> DigestPipeline<F, S>
where
    F: FetchFeed + 'static,
    S: DigestSink,
{
    pub fn new(config: AppConfig, source: F, sink: S) -> Self {
        Self {
            config,
            source: Arc::new(source),
            sink,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let mut watermarks = WatermarkStore::load(&self.config.data_dir)?;

        let mut model = self.fetch_all().await;

        prune::prune_seen(&mut model, &watermarks);
        prune::prune_empty(&mut model);

        let rendered = digest::render(&model, &self.config.subject);
        self.sink.deliver(&rendered).await?;

        prune::advance_watermarks(&model, &mut watermarks);
        watermarks.save()?;

        Ok(RunReport {
            channels: model.channels.len(),
            items: model.items.len(),
            fetch_errors: model.fetch_errors.len(),
        })
    }

    /// Fans out one task per configured source and waits for every one of
    /// them. The digest must reflect the outcome of all sources, so this is
    /// a barrier, not a race.
    async fn fetch_all(&self) -> DigestModel {
        let aggregator = Arc::new(Aggregator::new());
        let timeout = self.config.fetch_config().timeout();

        let mut tasks = Vec::with_capacity(self.config.feeds.len());
        for url in &self.config.feeds {
            let url = url.clone();
            let source = Arc::clone(&self.source);
            let aggregator = Arc::clone(&aggregator);
            tasks.push(tokio::spawn(async move {
                poll_source(source.as_ref(), &aggregator, &url, timeout).await;
            }));
        }

        for task in tasks {
            if let Err(e) = task.await {
                // A panicked task is a bug in the source impl, not a fetch error.
                error!(error = %e, "fetch task failed to join");
            }
        }
        info!("done fetching feeds");

        Arc::try_unwrap(aggregator)
            .expect("fetch tasks still hold the aggregator after join")
            .into_model()
    }
}

/// One fetch task: resolve the locator within the time budget, insert what it
/// yields, record exactly one FetchError on any failure. Never retries within
/// a run; a failure here never aborts sibling tasks.
async fn poll_source<F: FetchFeed>(
    source: &F,
    aggregator: &Aggregator,
    url: &str,
    timeout: Duration,
) {
    match tokio::time::timeout(timeout, source.fetch(url, timeout)).await {
        Ok(Ok(payload)) => {
            info!(
                url,
                channels = payload.channels.len(),
                items = payload.items.len(),
                "fetched source"
            );
            for channel in payload.channels {
                aggregator.insert_channel(channel);
            }
            for item in payload.items {
                aggregator.insert_item(item);
            }
        }
        Ok(Err(e)) => {
            warn!(url, error = %e, "source fetch failed");
            aggregator.insert_fetch_error(FetchError {
                url: url.to_string(),
                message: e.to_string(),
            });
        }
        Err(_) => {
            warn!(url, seconds = timeout.as_secs(), "source fetch timed out");
            aggregator.insert_fetch_error(FetchError {
                url: url.to_string(),
                message: format!("timed out after {}s", timeout.as_secs()),
            });
        }
    }
}
