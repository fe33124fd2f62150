//! rerelease - Replay an archive of items on a new recurring schedule
//!
//! Takes an ordered list of previously published items (typically the
//! episodes of a feed) and assigns each one a new release instant generated
//! from a compact recurrence rule such as `2wTuTh` ("every two weeks on
//! Tuesday and Thursday"), starting from a user-chosen anchor.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`rule`] - Recurrence rule text codec
//! - [`schedule`] - Occurrence generation, slot assignment and release progress
//! - [`models`] - Items and feed summaries
//! - [`source`] - Item sources (HTTP summary endpoint, static JSON)
//! - [`address`] - Shareable address (query string) codec and sinks
//! - [`pipeline`] - Reactive recompute pipeline
//! - [`config`] - Configuration management
//! - [`error`] - Unified error handling
//!
//! # Example
//!
//! ```
//! use chrono::DateTime;
//! use rerelease::rule::Rule;
//! use rerelease::schedule::generate;
//!
//! let rule = Rule::parse("2wTuTh");
//! let anchor = DateTime::parse_from_rfc3339("2023-07-01T00:00:00Z").unwrap();
//! let days: Vec<String> = generate(rule, anchor)
//!     .take(3)
//!     .map(|at| at.format("%m-%d").to_string())
//!     .collect();
//! assert_eq!(days, ["07-04", "07-06", "07-18"]);
//! ```

pub mod address;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod rule;
pub mod schedule;
pub mod source;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::address::{AddressSink, MemorySink, Snapshot};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, RereleaseErrorTrait, Result};
    pub use crate::models::{FeedSummary, Item};
    pub use crate::pipeline::{Pipeline, PipelineState};
    pub use crate::rule::{Frequency, Rule, Weekday, WeekdaySet};
    pub use crate::schedule::{assign, generate, Bounds, ScheduledResult, Slot};
    pub use crate::source::{HttpItemSource, ItemSource, StaticItemSource};
}

// Direct re-exports for convenience
pub use models::{FeedSummary, Item};
pub use rule::Rule;
