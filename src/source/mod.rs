//! Item sources
//!
//! An item source turns a source identifier (typically a feed URL) into a
//! [`FeedSummary`] whose items are in ascending original order. Parsing the
//! underlying feed format is the source's business; the rescheduler only
//! sees the summary.
//!
//! - [`HttpItemSource`] - asks a remote summary endpoint
//! - [`StaticItemSource`] - serves summaries from memory or a JSON file

pub mod error;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::FeedSummary;

pub use error::FetchError;
pub use http::HttpItemSource;
pub use memory::StaticItemSource;

/// Fetch capability keyed by source identifier
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Fetch the summary for `source_id`
    ///
    /// A blank identifier fails with [`FetchError::MissingSource`].
    async fn fetch(&self, source_id: &str) -> Result<FeedSummary, FetchError>;
}

#[async_trait]
impl<T: ItemSource + ?Sized> ItemSource for Arc<T> {
    async fn fetch(&self, source_id: &str) -> Result<FeedSummary, FetchError> {
        (**self).fetch(source_id).await
    }
}

#[async_trait]
impl<T: ItemSource + ?Sized> ItemSource for Box<T> {
    async fn fetch(&self, source_id: &str) -> Result<FeedSummary, FetchError> {
        (**self).fetch(source_id).await
    }
}
