use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::aggregator::DigestModel;
use crate::watermarks::WatermarkStore;

/// Removes every item already covered by its source's watermark.
///
/// The comparison is inclusive: a prior run's watermark is the maximum
/// timestamp it delivered, so an item with an equal timestamp has been shown
/// already. Sources with no watermark yet keep all their items. Items whose
/// owning channel is missing from the aggregation are dropped as malformed
/// input rather than compared.
pub fn prune_seen(model: &mut DigestModel, watermarks: &WatermarkStore) {
    let before = model.items.len();
    let origins: HashMap<&str, &str> = model
        .channels
        .iter()
        .map(|c| (c.key.as_str(), c.url.as_str()))
        .collect();

    model.items.retain(|item| {
        let Some(origin) = origins.get(item.channel_key.as_str()) else {
            warn!(
                item = %item.key,
                channel = %item.channel_key,
                "dropping item with unresolved channel"
            );
            return false;
        };
        match watermarks.get(origin) {
            Some(mark) => item.published_at > mark,
            None => true,
        }
    });

    info!(before, after = model.items.len(), "pruned already-delivered items");
}

/// Removes channels left with no items after [`prune_seen`]. A channel that
/// never had items, or whose items were all already delivered, must not
/// appear in the digest.
pub fn prune_empty(model: &mut DigestModel) {
    let before = model.channels.len();
    let items = &model.items;
    model
        .channels
        .retain(|channel| items.iter().any(|i| i.channel_key == channel.key));
    debug!(before, after = model.channels.len(), "pruned empty channels");
}

/// Recomputes each remaining channel's watermark as the maximum timestamp
/// among its current items, replacing any prior value. A channel with no
/// items keeps its prior watermark; there is no information to advance it
/// with. Call only after the digest has been delivered.
pub fn advance_watermarks(model: &DigestModel, watermarks: &mut WatermarkStore) {
    for channel in &model.channels {
        let newest: Option<DateTime<Utc>> = model
            .items
            .iter()
            .filter(|i| i.channel_key == channel.key)
            .map(|i| i.published_at)
            .max();
        if let Some(newest) = newest {
            debug!(origin = %channel.url, watermark = %newest, "advancing watermark");
            watermarks.set(&channel.url, newest);
        }
    }
}
