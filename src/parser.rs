use chrono::{DateTime, Utc};
use feed_rs::parser;
use tracing::debug;

use crate::types::{Channel, DigestError, FeedPayload, Item, Result};

/// Maps one fetched feed document into the record model.
///
/// Keys are derived from feed content rather than the fetch URL: the feed id,
/// else the title, else the origin URL for channels; the entry id, else the
/// first link, else the title for items.
pub fn parse_feed(origin_url: &str, body: &str) -> Result<FeedPayload> {
    let mut feed = parser::parse(body.as_bytes())
        .map_err(|e| DigestError::Parse(format!("{origin_url}: {e}")))?;

    let title = feed
        .title
        .take()
        .map(|t| t.content)
        .unwrap_or_else(|| origin_url.to_string());
    let key = if feed.id.is_empty() {
        title.clone()
    } else {
        feed.id.clone()
    };
    let link = feed.links.first().map(|l| l.href.clone());
    let description = feed.description.take().map(|d| d.content);

    let mut items = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        if let Some(item) = parse_entry(&key, entry) {
            items.push(item);
        }
    }
    let item_keys = items.iter().map(|i| i.key.clone()).collect();

    debug!(url = origin_url, items = items.len(), "parsed feed document");

    let channel = Channel {
        url: origin_url.to_string(),
        key,
        title,
        link,
        description,
        item_keys,
    };
    Ok(FeedPayload {
        channels: vec![channel],
        items,
    })
}

fn parse_entry(channel_key: &str, entry: feed_rs::model::Entry) -> Option<Item> {
    let title = entry.title.map(|t| t.content).unwrap_or_default();
    let links: Vec<String> = entry.links.iter().map(|l| l.href.clone()).collect();

    let key = if !entry.id.is_empty() {
        entry.id.clone()
    } else if let Some(link) = links.first() {
        link.clone()
    } else if !title.is_empty() {
        title.clone()
    } else {
        debug!(channel = channel_key, "skipping entry with no usable identity");
        return None;
    };

    // Undated entries sort to the epoch: delivered once, deduplicated after.
    let published_at = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    let content = entry
        .content
        .and_then(|c| c.body)
        .or_else(|| entry.summary.map(|s| s.content))
        .unwrap_or_default();

    Some(Item {
        key,
        channel_key: channel_key.to_string(),
        title,
        published_at,
        content: normalize_content(&content),
        links,
    })
}

/// Trims the body and unescapes the entity-encoded HTML some feeds ship.
fn normalize_content(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("&lt;") {
        html_escape::decode_html_entities(trimmed).into_owned()
    } else {
        trimmed.to_string()
    }
}
