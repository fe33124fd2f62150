//! Release progress of a computed schedule
//!
//! A feed that replays on the new calendar only exposes items whose
//! assigned instant has passed, and can be cached until the next one.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use super::assign::ScheduledResult;
use super::occurrence::Occurrence;

/// Snapshot of which items are out as of some instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Indices of released items, in item order
    pub released: Vec<usize>,
    /// Earliest assigned instant still in the future
    pub next_release: Option<Occurrence>,
}

impl ScheduledResult {
    /// Indices of items whose assigned instant is at or before `now`
    pub fn released_by<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<usize> {
        self.assigned()
            .filter(|(_, at)| at <= now)
            .map(|(index, _)| index)
            .collect()
    }

    /// The first assigned instant strictly after `now`
    pub fn next_release_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<Occurrence> {
        self.assigned().map(|(_, at)| at).filter(|at| at > now).min()
    }

    pub fn progress<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Progress {
        Progress {
            released: self.released_by(now),
            next_release: self.next_release_after(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::assign::Slot;
    use chrono::Utc;

    fn dt(s: &str) -> Occurrence {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn schedule() -> ScheduledResult {
        ScheduledResult::from(vec![
            Slot::Skipped,
            Slot::Assigned(dt("2014-11-28T21:00:00Z")),
            Slot::Assigned(dt("2014-12-05T21:00:00Z")),
            Slot::Assigned(dt("2014-12-12T21:00:00Z")),
        ])
    }

    #[test]
    fn test_released_by_is_inclusive() {
        let now = dt("2014-12-05T21:00:00Z");
        assert_eq!(schedule().released_by(&now), vec![1, 2]);
    }

    #[test]
    fn test_next_release_after() {
        let now = Utc.with_ymd_and_hms(2014, 11, 28, 22, 0, 0).unwrap();
        assert_eq!(
            schedule().next_release_after(&now),
            Some(dt("2014-12-05T21:00:00Z"))
        );

        let later = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(schedule().next_release_after(&later), None);
    }

    #[test]
    fn test_progress_before_start() {
        let now = dt("2014-11-01T00:00:00-05:00");
        let progress = schedule().progress(&now);
        assert!(progress.released.is_empty());
        assert_eq!(progress.next_release, Some(dt("2014-11-28T21:00:00Z")));
    }
}
