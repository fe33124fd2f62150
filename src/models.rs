// Core data structures for rerelease

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published item from the original series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub original_instant: DateTime<Utc>, // When the source first published it
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>, original_instant: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            original_instant,
        }
    }
}

/// Summary of an item source as returned by the summary endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FeedSummary {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source_id: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl FeedSummary {
    pub fn new(title: impl Into<String>, source_id: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            title: title.into(),
            source_id: source_id.into(),
            items,
        }
    }

    /// Order items by original instant, oldest first
    ///
    /// The sort is stable, so items sharing an instant keep their relative order.
    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.items.sort_by_key(|item| item.original_instant);
        self
    }

    /// Whether items are in ascending original order
    pub fn is_sorted(&self) -> bool {
        self.items
            .windows(2)
            .all(|pair| pair[0].original_instant <= pair[1].original_instant)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
