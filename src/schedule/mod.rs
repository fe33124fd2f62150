//! Rescheduling engine
//!
//! Turns a [`Rule`](crate::rule::Rule) and an anchor into occurrences, and
//! hands those occurrences out to the original items.
//!
//! # Flow
//!
//! ```text
//! Rule + anchor ──► Occurrences (lazy, by index)
//!                        │
//! Items + Bounds ──► assign ──► ScheduledResult ──► progress(now)
//! ```
//!
//! # Modules
//!
//! - [`occurrence`] - Expansion of a rule into release instants
//! - [`assign`] - Item-to-occurrence assignment with inclusive bounds
//! - [`replay`] - Which items are out at a given instant
//!
//! # Example
//!
//! ```
//! use chrono::DateTime;
//! use rerelease::rule::Rule;
//! use rerelease::schedule::{assign, generate, Bounds};
//!
//! let anchor = DateTime::parse_from_rfc3339("2023-07-01T01:30:00-04:00").unwrap();
//! let occurrences = generate(Rule::parse("2wTuTh"), anchor);
//! let result = assign(&[], &Bounds::unbounded(), occurrences);
//! assert!(result.is_empty());
//! ```

pub mod assign;
pub mod occurrence;
pub mod replay;

pub use assign::{assign, Bounds, ScheduledResult, Slot};
pub use occurrence::{generate, Occurrence, Occurrences};
pub use replay::Progress;
