//! Common test utilities

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use rerelease::models::{FeedSummary, Item};

/// Saturday 2023-07-01 01:30 at -04:00
pub const ANCHOR: &str = "2023-07-01T01:30:00-04:00";

/// Parse an RFC 3339 instant
#[allow(dead_code)]
pub fn dt(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

#[allow(dead_code)]
pub fn anchor() -> DateTime<FixedOffset> {
    dt(ANCHOR)
}

/// Midnight UTC on the given day
#[allow(dead_code)]
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// `count` items published weekly from 2020-01-01
#[allow(dead_code)]
pub fn episodes(source_id: &str, count: usize) -> Vec<Item> {
    (0..count)
        .map(|i| {
            Item::new(
                format!("{source_id}#{i}"),
                format!("Episode {}", i + 1),
                utc(2020, 1, 1) + Duration::weeks(i as i64),
            )
        })
        .collect()
}

/// A summary with `count` weekly episodes
#[allow(dead_code)]
pub fn feed(source_id: &str, title: &str, count: usize) -> FeedSummary {
    FeedSummary::new(title, source_id, episodes(source_id, count))
}

/// Summary endpoint response body
#[allow(dead_code)]
pub fn summary_json(source_id: &str, title: &str, count: usize) -> String {
    serde_json::to_string(&feed(source_id, title, count)).unwrap()
}
