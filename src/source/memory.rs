//! In-memory item source
//!
//! Serves summaries from a map, optionally loaded from a JSON file holding
//! either a single [`FeedSummary`] or an array of them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use super::error::FetchError;
use super::ItemSource;
use crate::models::FeedSummary;

/// Item source over summaries held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticItemSource {
    summaries: HashMap<String, FeedSummary>,

    /// Artificial latency per fetch
    delay: Option<Duration>,
}

impl StaticItemSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a summary, keyed by its source id
    #[must_use]
    pub fn with_summary(mut self, summary: FeedSummary) -> Self {
        self.insert(summary);
        self
    }

    /// Delay every fetch by `delay`
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn insert(&mut self, summary: FeedSummary) {
        self.summaries
            .insert(summary.source_id.clone(), summary.sorted());
    }

    /// Load summaries from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` if the file cannot be read or parsed
    pub fn from_file(path: &Path) -> Result<Self, FetchError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FetchError::Decode(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    /// Parse summaries from JSON text
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` if the text is neither a summary nor a
    /// list of summaries
    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        let summaries: Vec<FeedSummary> = match serde_json::from_str::<Vec<FeedSummary>>(json) {
            Ok(list) => list,
            Err(_) => vec![serde_json::from_str::<FeedSummary>(json)
                .map_err(|e| FetchError::Decode(e.to_string()))?],
        };

        let mut source = Self::new();
        for summary in summaries {
            source.insert(summary);
        }
        Ok(source)
    }

    /// Source ids this source can serve
    pub fn source_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.summaries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl ItemSource for StaticItemSource {
    async fn fetch(&self, source_id: &str) -> Result<FeedSummary, FetchError> {
        let source_id = source_id.trim();
        if source_id.is_empty() {
            return Err(FetchError::MissingSource);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.summaries
            .get(source_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(source_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARIES: &str = r#"[
        {
            "title": "B",
            "sourceId": "b",
            "items": [
                { "id": "2", "originalInstant": "2020-01-08T00:00:00Z" },
                { "id": "1", "originalInstant": "2020-01-01T00:00:00Z" }
            ]
        },
        { "title": "A", "sourceId": "a", "items": [] }
    ]"#;

    #[tokio::test]
    async fn test_from_json_list() {
        let source = StaticItemSource::from_json(SUMMARIES).unwrap();
        assert_eq!(source.source_ids(), vec!["a", "b"]);

        let b = source.fetch("b").await.unwrap();
        assert_eq!(b.items[0].id, "1");
    }

    #[tokio::test]
    async fn test_from_json_single() {
        let source =
            StaticItemSource::from_json(r#"{ "title": "Solo", "sourceId": "solo" }"#).unwrap();
        assert_eq!(source.fetch("solo").await.unwrap().title, "Solo");
    }

    #[tokio::test]
    async fn test_unknown_and_missing() {
        let source = StaticItemSource::new();
        assert!(matches!(source.fetch("nope").await, Err(FetchError::NotFound(_))));
        assert!(matches!(source.fetch("").await, Err(FetchError::MissingSource)));
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            StaticItemSource::from_json("not json"),
            Err(FetchError::Decode(_))
        ));
    }
}
