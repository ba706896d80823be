use chrono::{DateTime, TimeZone, Utc};
use rss_digest::prune::{advance_watermarks, prune_empty, prune_seen};
use rss_digest::{Channel, DigestModel, Item, WatermarkStore};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, d, 12, 0, 0).unwrap()
}

fn channel(key: &str, url: &str) -> Channel {
    Channel {
        url: url.to_string(),
        key: key.to_string(),
        title: format!("Channel {key}"),
        link: None,
        description: None,
        item_keys: Vec::new(),
    }
}

fn item(key: &str, channel_key: &str, published_at: DateTime<Utc>) -> Item {
    Item {
        key: key.to_string(),
        channel_key: channel_key.to_string(),
        title: format!("Item {key}"),
        published_at,
        content: String::new(),
        links: vec![format!("https://example.com/{key}")],
    }
}

fn empty_store() -> WatermarkStore {
    let dir = tempfile::tempdir().unwrap();
    WatermarkStore::load(dir.path()).unwrap()
}

#[test]
fn watermark_comparison_is_inclusive() {
    let url = "https://a.example/feed.xml";
    let mut model = DigestModel {
        channels: vec![channel("a", url)],
        items: vec![
            item("a-1", "a", day(1)),
            item("a-2", "a", day(2)),
            item("a-3", "a", day(3)),
        ],
        fetch_errors: Vec::new(),
    };
    let mut marks = empty_store();
    marks.set(url, day(2));

    prune_seen(&mut model, &marks);

    // Day 2 equals the watermark and was therefore already delivered.
    let keys: Vec<&str> = model.items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["a-3"]);
}

#[test]
fn sources_without_a_watermark_keep_everything() {
    let mut model = DigestModel {
        channels: vec![channel("a", "https://a.example/feed.xml")],
        items: vec![item("a-1", "a", day(1)), item("a-2", "a", day(2))],
        fetch_errors: Vec::new(),
    };

    prune_seen(&mut model, &empty_store());

    assert_eq!(model.items.len(), 2);
}

#[test]
fn orphan_items_are_dropped() {
    let mut model = DigestModel {
        channels: vec![channel("a", "https://a.example/feed.xml")],
        items: vec![
            item("a-1", "a", day(1)),
            item("ghost-1", "ghost", day(5)),
        ],
        fetch_errors: Vec::new(),
    };

    prune_seen(&mut model, &empty_store());

    let keys: Vec<&str> = model.items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["a-1"]);
}

#[test]
fn channels_emptied_by_pruning_are_removed() {
    let stale_url = "https://stale.example/feed.xml";
    let mut model = DigestModel {
        channels: vec![
            channel("stale", stale_url),
            channel("fresh", "https://fresh.example/feed.xml"),
            channel("barren", "https://barren.example/feed.xml"),
        ],
        items: vec![
            item("stale-1", "stale", day(1)),
            item("fresh-1", "fresh", day(3)),
        ],
        fetch_errors: Vec::new(),
    };
    let mut marks = empty_store();
    marks.set(stale_url, day(2));

    prune_seen(&mut model, &marks);
    prune_empty(&mut model);

    let keys: Vec<&str> = model.channels.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["fresh"]);
}

#[test]
fn advance_takes_the_maximum_remaining_timestamp() {
    let url = "https://a.example/feed.xml";
    let model = DigestModel {
        channels: vec![channel("a", url)],
        items: vec![
            item("a-1", "a", day(2)),
            item("a-2", "a", day(4)),
            item("a-3", "a", day(3)),
        ],
        fetch_errors: Vec::new(),
    };
    let mut marks = empty_store();
    marks.set(url, day(1));

    advance_watermarks(&model, &mut marks);

    assert_eq!(marks.get(url), Some(day(4)));
}

#[test]
fn absent_sources_keep_their_prior_watermark() {
    let gone_url = "https://gone.example/feed.xml";
    let model = DigestModel::default();
    let mut marks = empty_store();
    marks.set(gone_url, day(2));

    advance_watermarks(&model, &mut marks);

    assert_eq!(marks.get(gone_url), Some(day(2)));
}

#[test]
fn advancement_is_monotonic_after_pruning() {
    let url = "https://a.example/feed.xml";
    let mut model = DigestModel {
        channels: vec![channel("a", url)],
        items: vec![item("a-1", "a", day(1)), item("a-2", "a", day(5))],
        fetch_errors: Vec::new(),
    };
    let mut marks = empty_store();
    marks.set(url, day(3));

    prune_seen(&mut model, &marks);
    prune_empty(&mut model);
    advance_watermarks(&model, &mut marks);

    assert_eq!(marks.get(url), Some(day(5)));
}

#[test]
fn two_sources_one_with_a_prior_watermark() {
    // Source A: watermark at day 1, new items at day 1 and day 2.
    // Source B: no watermark, new item at day 3.
    let a_url = "https://a.example/feed.xml";
    let b_url = "https://b.example/feed.xml";
    let mut model = DigestModel {
        channels: vec![channel("a", a_url), channel("b", b_url)],
        items: vec![
            item("a-1", "a", day(1)),
            item("a-2", "a", day(2)),
            item("b-3", "b", day(3)),
        ],
        fetch_errors: Vec::new(),
    };
    let mut marks = empty_store();
    marks.set(a_url, day(1));

    prune_seen(&mut model, &marks);
    prune_empty(&mut model);

    let keys: Vec<&str> = model.items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["a-2", "b-3"]);
    assert_eq!(model.channels.len(), 2);

    advance_watermarks(&model, &mut marks);
    assert_eq!(marks.get(a_url), Some(day(2)));
    assert_eq!(marks.get(b_url), Some(day(3)));
}
