//! Assignment of original items onto occurrences
//!
//! Items are walked in their given order. An item whose original instant lies
//! outside the [`Bounds`] keeps its position as [`Slot::Skipped`] without
//! using up an occurrence; every other item takes the next unused one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::occurrence::Occurrence;
use crate::models::Item;

/// Inclusive filter on an item's original instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<DateTime<Utc>>,
}

impl Bounds {
    /// Bounds that include every item
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(first: Option<DateTime<Utc>>, last: Option<DateTime<Utc>>) -> Self {
        Self { first, last }
    }

    /// Whether `instant` falls inside both ends (inclusive)
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.first.map_or(true, |first| instant >= first)
            && self.last.map_or(true, |last| instant <= last)
    }
}

/// Outcome for a single item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "at", rename_all = "lowercase")]
pub enum Slot {
    /// Re-released at this instant
    Assigned(Occurrence),
    /// Excluded by the bounds
    Skipped,
}

impl Slot {
    pub fn instant(&self) -> Option<Occurrence> {
        match self {
            Self::Assigned(at) => Some(*at),
            Self::Skipped => None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }
}

/// One slot per input item, in input order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduledResult {
    slots: Vec<Slot>,
}

impl ScheduledResult {
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<Slot> {
        self.slots.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// Assigned slots as `(item index, instant)`, in item order
    pub fn assigned(&self) -> impl Iterator<Item = (usize, Occurrence)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.instant().map(|at| (index, at)))
    }

    pub fn assigned_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_assigned()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.len() - self.assigned_count()
    }
}

impl From<Vec<Slot>> for ScheduledResult {
    fn from(slots: Vec<Slot>) -> Self {
        Self { slots }
    }
}

impl IntoIterator for ScheduledResult {
    type Item = Slot;
    type IntoIter = std::vec::IntoIter<Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}

/// Map `items` onto successive `occurrences`
///
/// `items` must already be in ascending original order; they are not
/// re-sorted. Occurrences are pulled one at a time, only for included items.
/// If the occurrence sequence runs out (the calendar range was exceeded) the
/// remaining included items are reported as skipped.
pub fn assign<I>(items: &[Item], bounds: &Bounds, occurrences: I) -> ScheduledResult
where
    I: IntoIterator<Item = Occurrence>,
{
    let mut occurrences = occurrences.into_iter();
    let mut exhausted = false;

    let slots = items
        .iter()
        .map(|item| {
            if !bounds.contains(item.original_instant) || exhausted {
                return Slot::Skipped;
            }
            match occurrences.next() {
                Some(at) => Slot::Assigned(at),
                None => {
                    tracing::warn!(item = %item.id, "Ran out of occurrences");
                    exhausted = true;
                    Slot::Skipped
                }
            }
        })
        .collect();

    ScheduledResult { slots }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use crate::schedule::occurrence::generate;
    use std::cell::Cell;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn items(instants: &[&str]) -> Vec<Item> {
        instants
            .iter()
            .enumerate()
            .map(|(i, s)| Item::new(i.to_string(), format!("Episode {i}"), utc(s)))
            .collect()
    }

    fn anchor() -> Occurrence {
        DateTime::parse_from_rfc3339("2014-11-28T21:00:00Z").unwrap()
    }

    #[test]
    fn test_empty_items() {
        let result = assign(&[], &Bounds::unbounded(), generate(Rule::daily(1), anchor()));
        assert!(result.is_empty());
    }

    #[test]
    fn test_assigns_in_order() {
        let items = items(&["2013-10-10T21:00:00Z", "2013-11-10T21:00:00Z"]);
        let result = assign(&items, &Bounds::unbounded(), generate(Rule::daily(1), anchor()));

        assert_eq!(
            result.slots(),
            &[
                Slot::Assigned(DateTime::parse_from_rfc3339("2014-11-28T21:00:00Z").unwrap()),
                Slot::Assigned(DateTime::parse_from_rfc3339("2014-11-29T21:00:00Z").unwrap()),
            ]
        );
    }

    #[test]
    fn test_bounds_skip_without_consuming() {
        let items = items(&[
            "2014-01-01T00:00:00Z",
            "2014-01-08T00:00:00Z",
            "2014-01-15T00:00:00Z",
            "2014-01-22T00:00:00Z",
            "2014-01-29T00:00:00Z",
        ]);
        let bounds = Bounds::new(
            Some(utc("2014-01-15T00:00:00Z")),
            Some(utc("2014-01-22T00:00:00Z")),
        );
        let occurrences = generate(Rule::weekly(1), anchor());
        let occ0 = occurrences.get(0).unwrap();
        let occ1 = occurrences.get(1).unwrap();

        let result = assign(&items, &bounds, occurrences);
        assert_eq!(
            result.slots(),
            &[
                Slot::Skipped,
                Slot::Skipped,
                Slot::Assigned(occ0),
                Slot::Assigned(occ1),
                Slot::Skipped,
            ]
        );
        assert_eq!(result.assigned_count(), 2);
        assert_eq!(result.skipped_count(), 3);
    }

    #[test]
    fn test_only_first_bound() {
        let items = items(&["2014-01-01T00:00:00Z", "2014-01-08T00:00:00Z"]);
        let bounds = Bounds::new(Some(utc("2014-01-08T00:00:00Z")), None);
        let result = assign(&items, &bounds, generate(Rule::weekly(1), anchor()));
        assert_eq!(result.get(0), Some(Slot::Skipped));
        assert_eq!(result.get(1).and_then(|s| s.instant()), Some(anchor()));
    }

    #[test]
    fn test_consumes_lazily() {
        let pulled = Cell::new(0);
        let source = generate(Rule::daily(1), anchor()).inspect(|_| pulled.set(pulled.get() + 1));

        let items = items(&[
            "2014-01-01T00:00:00Z",
            "2014-01-02T00:00:00Z",
            "2014-01-03T00:00:00Z",
        ]);
        let bounds = Bounds::new(None, Some(utc("2014-01-02T00:00:00Z")));
        let result = assign(&items, &bounds, source);

        assert_eq!(result.assigned_count(), 2);
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn test_exhausted_occurrences_skip() {
        let items = items(&["2014-01-01T00:00:00Z", "2014-01-02T00:00:00Z"]);
        let result = assign(&items, &Bounds::unbounded(), vec![anchor()]);
        assert_eq!(result.slots(), &[Slot::Assigned(anchor()), Slot::Skipped]);
    }

    #[test]
    fn test_slot_json() {
        let result = ScheduledResult::from(vec![Slot::Assigned(anchor()), Slot::Skipped]);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.starts_with(r#"[{"status":"assigned","at":"2014-11-28T21:00:00"#));
        assert!(json.ends_with(r#"{"status":"skipped"}]"#));

        let back: ScheduledResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
