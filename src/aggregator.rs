use std::sync::Mutex;

use crate::types::{Channel, FetchError, Item};

/// Run-scoped collections shared by the fetch tasks.
///
/// Every insert is an atomic append behind one lock; nothing reads the
/// collections while tasks are running. [`Aggregator::into_model`] consumes
/// the aggregator, so a read pass can only start once every task has joined
/// and dropped its handle.
#[derive(Debug, Default)]
pub struct Aggregator {
    inner: Mutex<Collections>,
}

#[derive(Debug, Default)]
struct Collections {
    channels: Vec<Channel>,
    items: Vec<Item>,
    fetch_errors: Vec<FetchError>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_channel(&self, channel: Channel) {
        self.inner
            .lock()
            .expect("aggregator lock poisoned")
            .channels
            .push(channel);
    }

    pub fn insert_item(&self, item: Item) {
        self.inner
            .lock()
            .expect("aggregator lock poisoned")
            .items
            .push(item);
    }

    pub fn insert_fetch_error(&self, error: FetchError) {
        self.inner
            .lock()
            .expect("aggregator lock poisoned")
            .fetch_errors
            .push(error);
    }

    /// Consumes the aggregator after the join barrier, yielding the immutable
    /// model the prune and render passes operate on.
    pub fn into_model(self) -> DigestModel {
        let collections = self.inner.into_inner().expect("aggregator lock poisoned");
        DigestModel {
            channels: collections.channels,
            items: collections.items,
            fetch_errors: collections.fetch_errors,
        }
    }
}

/// Snapshot of one run's aggregation, produced after all fetch tasks joined.
#[derive(Debug, Default)]
pub struct DigestModel {
    pub channels: Vec<Channel>,
    pub items: Vec<Item>,
    pub fetch_errors: Vec<FetchError>,
}

impl DigestModel {
    pub fn channel_by_key(&self, key: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.key == key)
    }

    pub fn items_for(&self, channel: &Channel) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|i| i.channel_key == channel.key)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.fetch_errors.is_empty()
    }
}
