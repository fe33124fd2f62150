//! Property and example tests for rule notation

use proptest::prelude::*;
use rerelease::rule::{Frequency, Rule, Weekday, WeekdaySet};

fn frequency() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Day),
        Just(Frequency::Week),
        Just(Frequency::Month),
    ]
}

fn rule() -> impl Strategy<Value = Rule> {
    (1u32..10_000, frequency(), 0u8..128)
        .prop_map(|(interval, frequency, bits)| Rule::new(interval, frequency, WeekdaySet::from_bits(bits)))
}

proptest! {
    #[test]
    fn prop_parse_inverts_display(rule in rule()) {
        prop_assert_eq!(Rule::parse(&rule.to_string()), rule);
    }

    #[test]
    fn prop_parse_never_fails(text in ".{0,24}") {
        let rule = Rule::parse(&text);
        prop_assert!(rule.interval() >= 1);
        // Normalized text is a fixed point
        prop_assert_eq!(Rule::parse(&rule.to_string()), rule);
    }

    #[test]
    fn prop_serde_uses_notation(rule in rule()) {
        let json = serde_json::to_string(&rule).unwrap();
        prop_assert_eq!(&json, &format!("\"{rule}\""));
        let back: Rule = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, rule);
    }
}

#[test]
fn test_canonical_weekday_order() {
    let rule = Rule::weekly(2).on([Weekday::Thu, Weekday::Tue].into_iter().collect());
    assert_eq!(rule.to_string(), "2wTuTh");
}

#[test]
fn test_malformed_text_normalizes() {
    assert_eq!(Rule::parse("every tuesday").to_string(), "1w");
    assert_eq!(Rule::parse("").to_string(), "1w");
    assert_eq!(Rule::parse("3mFoo").to_string(), "3mF");
    assert_eq!(Rule::parse("0d").to_string(), "1d");
    assert_eq!(Rule::parse("wSuSa").to_string(), "1wSuSa");
}

#[test]
fn test_out_of_order_codes_are_dropped() {
    // Codes are matched greedily in canonical order only
    assert_eq!(Rule::parse("1wThTu").to_string(), "1wTh");
}
