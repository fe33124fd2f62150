//! Occurrence generation
//!
//! Expands a [`Rule`] from an anchor instant into an unbounded, strictly
//! increasing sequence of release instants. Every occurrence is computed
//! directly from its index, so a sequence can be restarted or entered at any
//! position without replaying the ones before it.
//!
//! # Semantics
//!
//! | Rule | Occurrence `k` |
//! |------|----------------|
//! | `Nd` | anchor + `k * N` days |
//! | `Nw` | anchor + `k * N` weeks |
//! | `NwTuTh` | the `k`-th selected weekday, walking windows of `N` weeks |
//! | `Nm` | anchor + `k * N` calendar months, day clamped to month end |
//!
//! For a weekday filter, each window is seven days long and starts on the
//! anchor's calendar day, the first window at the anchor itself and each
//! following one `N` weeks after the previous. Within a window the selected
//! weekdays are emitted in chronological order at the anchor's time of day.
//! A `d` rule ignores its weekday filter.
//!
//! Monthly occurrences are all measured from the anchor, so an anchor on the
//! 31st lands on the 28th/29th in February and back on the 31st in March.

use chrono::{DateTime, Days, FixedOffset, Months};

use crate::rule::{Frequency, Rule, Weekday};

/// Release instant, carrying the anchor's UTC offset
pub type Occurrence = DateTime<FixedOffset>;

/// Expand `rule` from `anchor`
pub fn generate(rule: Rule, anchor: Occurrence) -> Occurrences {
    Occurrences::new(rule, anchor)
}

/// Lazy, restartable sequence of occurrences
///
/// Iterating advances an internal cursor; [`Occurrences::get`] is a pure
/// lookup by index and never moves it.
#[derive(Debug, Clone)]
pub struct Occurrences {
    rule: Rule,
    anchor: Occurrence,
    /// Day offsets from the anchor date of the selected weekdays, ascending
    offsets: Vec<u64>,
    cursor: u64,
}

impl Occurrences {
    /// Create a sequence positioned at the first occurrence
    pub fn new(rule: Rule, anchor: Occurrence) -> Self {
        let offsets = match rule.frequency() {
            Frequency::Week if !rule.weekdays().is_empty() => {
                let start = Weekday::of(&anchor);
                let mut offsets: Vec<u64> = rule
                    .weekdays()
                    .iter()
                    .map(|day| u64::from(start.days_until(day)))
                    .collect();
                offsets.sort_unstable();
                offsets
            }
            _ => Vec::new(),
        };

        Self {
            rule,
            anchor,
            offsets,
            cursor: 0,
        }
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn anchor(&self) -> Occurrence {
        self.anchor
    }

    /// Index of the occurrence the next call to `next` returns
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// A copy of this sequence positioned at index `k`
    #[must_use]
    pub fn starting_at(&self, k: u64) -> Self {
        Self {
            cursor: k,
            ..self.clone()
        }
    }

    /// Occurrence at index `k`
    ///
    /// Returns `None` only when the instant falls outside the representable
    /// calendar range.
    pub fn get(&self, k: u64) -> Option<Occurrence> {
        let interval = u64::from(self.rule.interval().max(1));

        match self.rule.frequency() {
            Frequency::Day => self.after_days(k.checked_mul(interval)?),
            Frequency::Week if self.offsets.is_empty() => {
                self.after_days(k.checked_mul(interval)?.checked_mul(7)?)
            }
            Frequency::Week => {
                let per_window = self.offsets.len() as u64;
                let window = k / per_window;
                let offset = self.offsets[(k % per_window) as usize];
                let window_days = window.checked_mul(interval)?.checked_mul(7)?;
                self.after_days(window_days.checked_add(offset)?)
            }
            Frequency::Month => {
                let months = u32::try_from(k.checked_mul(interval)?).ok()?;
                self.anchor.checked_add_months(Months::new(months))
            }
        }
    }

    fn after_days(&self, days: u64) -> Option<Occurrence> {
        self.anchor.checked_add_days(Days::new(days))
    }
}

impl Iterator for Occurrences {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Self::Item> {
        let occurrence = self.get(self.cursor)?;
        self.cursor += 1;
        Some(occurrence)
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.cursor = self.cursor.saturating_add(n as u64);
        self.next()
    }
}

// ============================================================================
// Tests
// ============================================================================
