//! Published pipeline state

use chrono::{DateTime, FixedOffset};
use std::fmt;
use std::sync::Arc;

use crate::models::{FeedSummary, Item};
use crate::rule::Rule;
use crate::schedule::{ScheduledResult, Slot};

/// What the pipeline currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PipelineState {
    /// No snapshot processed yet
    #[default]
    Idle,

    /// Waiting for the items of `source_id`
    Loading { source_id: String },

    /// A schedule computed from the latest snapshot
    Ready(Replay),

    /// The latest snapshot could not be scheduled
    Failed { message: String },
}

impl PipelineState {
    pub fn replay(&self) -> Option<&Replay> {
        match self {
            Self::Ready(replay) => Some(replay),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading { source_id } => write!(f, "loading {source_id}"),
            Self::Ready(replay) => write!(
                f,
                "ready: {} ({} of {} items scheduled, rule {})",
                replay.summary.title,
                replay.schedule.assigned_count(),
                replay.schedule.len(),
                replay.rule
            ),
            Self::Failed { message } => write!(f, "failed: {message}"),
        }
    }
}

/// A computed schedule together with what it was computed from
#[derive(Debug, Clone, PartialEq)]
pub struct Replay {
    pub summary: Arc<FeedSummary>,
    pub rule: Rule,
    pub anchor: DateTime<FixedOffset>,
    pub schedule: ScheduledResult,
}

impl Replay {
    /// Items paired with their slots, in item order
    pub fn entries(&self) -> impl Iterator<Item = (&Item, Slot)> {
        self.summary
            .items
            .iter()
            .zip(self.schedule.iter().copied())
    }
}

/// Counters for the work the pipeline has done
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub snapshots: u64,
    pub fetches_started: u64,
    pub fetches_discarded: u64,
    pub schedules_computed: u64,
    pub address_writes: u64,
}
