//! Occurrence generation and slot assignment

mod common;

use chrono::{Duration, Timelike};
use common::{anchor, dt, episodes, utc};
use proptest::prelude::*;
use rerelease::rule::{Frequency, Rule, Weekday, WeekdaySet};
use rerelease::schedule::{assign, generate, Bounds, Slot};

fn days(rule: &str, count: usize) -> Vec<String> {
    generate(Rule::parse(rule), anchor())
        .take(count)
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .collect()
}

#[test]
fn test_weekly_is_exact_weeks() {
    let occurrences: Vec<_> = generate(Rule::parse("1w"), anchor()).take(60).collect();
    for (k, at) in occurrences.iter().enumerate() {
        assert_eq!(*at, anchor() + Duration::weeks(k as i64));
    }
}

#[test]
fn test_every_other_week() {
    assert_eq!(
        days("2w", 3),
        ["2023-07-01 01:30", "2023-07-15 01:30", "2023-07-29 01:30"]
    );
}

#[test]
fn test_every_other_tuesday_and_thursday() {
    assert_eq!(
        days("2wTuTh", 3),
        ["2023-07-04 01:30", "2023-07-06 01:30", "2023-07-18 01:30"]
    );
}

#[test]
fn test_every_other_day() {
    assert_eq!(
        days("2d", 3),
        ["2023-07-01 01:30", "2023-07-03 01:30", "2023-07-05 01:30"]
    );
}

#[test]
fn test_daily_ignores_weekday_filter() {
    assert_eq!(days("2dMF", 5), days("2d", 5));
}

#[test]
fn test_monthly_clamps_from_anchor() {
    let occurrences: Vec<_> = generate(Rule::monthly(1), dt("2024-01-31T09:00:00+00:00"))
        .take(4)
        .map(|at| at.format("%m-%d").to_string())
        .collect();
    assert_eq!(occurrences, ["01-31", "02-29", "03-31", "04-30"]);
}

#[test]
fn test_restart_at_any_index() {
    let all: Vec<_> = generate(Rule::parse("1wMWF"), anchor()).take(20).collect();
    let occurrences = generate(Rule::parse("1wMWF"), anchor());
    for k in 0..20 {
        assert_eq!(occurrences.get(k as u64), Some(all[k]));
        assert_eq!(occurrences.starting_at(k as u64).next(), Some(all[k]));
    }
}

#[test]
fn test_assign_with_bounds() {
    let items = episodes("feed", 5);
    let bounds = Bounds::new(
        Some(items[2].original_instant),
        Some(items[3].original_instant),
    );

    let result = assign(&items, &bounds, generate(Rule::parse("1w"), anchor()));

    assert_eq!(
        result.slots(),
        [
            Slot::Skipped,
            Slot::Skipped,
            Slot::Assigned(anchor()),
            Slot::Assigned(anchor() + Duration::weeks(1)),
            Slot::Skipped,
        ]
    );
}

#[test]
fn test_assign_unbounded_uses_every_item() {
    let items = episodes("feed", 4);
    let result = assign(&items, &Bounds::unbounded(), generate(Rule::parse("2wTuTh"), anchor()));

    let assigned: Vec<_> = result
        .assigned()
        .map(|(i, at)| (i, at.format("%m-%d").to_string()))
        .collect();
    assert_eq!(
        assigned,
        [
            (0, String::from("07-04")),
            (1, String::from("07-06")),
            (2, String::from("07-18")),
            (3, String::from("07-20")),
        ]
    );
}

#[test]
fn test_release_progress() {
    let items = episodes("feed", 3);
    let result = assign(&items, &Bounds::unbounded(), generate(Rule::parse("1w"), anchor()));

    let now = anchor() + Duration::days(8);
    let progress = result.progress(&now);
    assert_eq!(progress.released, vec![0, 1]);
    assert_eq!(progress.next_release, Some(anchor() + Duration::weeks(2)));

    assert!(result.released_by(&utc(2023, 1, 1)).is_empty());
}

fn any_rule() -> impl Strategy<Value = Rule> {
    let frequency = prop_oneof![
        Just(Frequency::Day),
        Just(Frequency::Week),
        Just(Frequency::Month),
    ];
    (1u32..52, frequency, 0u8..128).prop_map(|(interval, frequency, bits)| {
        Rule::new(interval, frequency, WeekdaySet::from_bits(bits))
    })
}

proptest! {
    #[test]
    fn prop_strictly_increasing_at_anchor_time(
        rule in any_rule(),
        day in 0i64..3_650,
        minute in 0i64..1_440,
    ) {
        let start = anchor() + Duration::days(day) + Duration::minutes(minute);
        let occurrences: Vec<_> = generate(rule, start).take(40).collect();

        prop_assert_eq!(occurrences.len(), 40);
        for pair in occurrences.windows(2) {
            prop_assert!(pair[0] < pair[1], "{} then {}", pair[0], pair[1]);
        }
        for at in &occurrences {
            prop_assert!(*at >= start);
            prop_assert_eq!(at.time(), start.time());
        }
    }

    #[test]
    fn prop_filtered_weeks_land_on_selected_days(
        interval in 1u32..52,
        bits in 1u8..128,
    ) {
        let weekdays = WeekdaySet::from_bits(bits);
        let rule = Rule::weekly(interval).on(weekdays);
        for at in generate(rule, anchor()).take(30) {
            prop_assert!(weekdays.contains(Weekday::of(&at)));
            prop_assert_eq!(at.minute(), 30);
        }
    }
}
