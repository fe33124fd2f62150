//! Recurrence rule notation
//!
//! A rule is written as `<interval><frequency><weekdays>`, for example `1w`,
//! `2wTuTh` or `3d`. The frequency is one of `d`, `w` or `m`, and the weekday
//! filter is any combination of `Su`, `M`, `Tu`, `W`, `Th`, `F`, `Sa` in that
//! order.
//!
//! Parsing never fails. Text that does not match the notation yields
//! [`Rule::default`] (every week, no weekday filter), and anything after the
//! recognised prefix is ignored. Serializing always writes the interval and
//! the weekday codes in canonical order, so `Rule::parse(&rule.to_string())`
//! returns the same rule.

use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

// ============================================================================
// Frequency
// ============================================================================

/// Unit that the rule interval counts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Day,
    #[default]
    Week,
    Month,
}

impl Frequency {
    /// Single-character code used in the notation
    pub fn code(&self) -> char {
        match self {
            Self::Day => 'd',
            Self::Week => 'w',
            Self::Month => 'm',
        }
    }

    /// Parse a frequency code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "d" => Some(Self::Day),
            "w" => Some(Self::Week),
            "m" => Some(Self::Month),
            _ => None,
        }
    }
}

// ============================================================================
// Weekdays
// ============================================================================

/// Day of the week, ordered Sunday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    /// All weekdays in canonical order
    pub const ALL: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    /// Notation code for this weekday
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sun => "Su",
            Self::Mon => "M",
            Self::Tue => "Tu",
            Self::Wed => "W",
            Self::Thu => "Th",
            Self::Fri => "F",
            Self::Sat => "Sa",
        }
    }

    /// Days since Sunday (0-6)
    pub fn index(&self) -> u32 {
        *self as u32
    }

    /// Weekday of a calendar date
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self::from(date.weekday())
    }

    /// Number of days from `self` forward to `target` (0-6)
    pub fn days_until(&self, target: Weekday) -> u32 {
        (7 + target.index() - self.index()) % 7
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Self::ALL[day.num_days_from_sunday() as usize]
    }
}

/// Set of weekdays, iterated in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// The empty set (no weekday filter)
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.index()) != 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.index();
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0 &= !(1 << day.index());
    }

    /// Returns a copy with `day` added
    #[must_use]
    pub fn with(mut self, day: Weekday) -> Self {
        self.insert(day);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> {
        let set = *self;
        Weekday::ALL.into_iter().filter(move |day| set.contains(*day))
    }

    /// Raw bitmask, bit `n` set for the weekday `n` days after Sunday
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Build from a bitmask; bits above Saturday are dropped
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b0111_1111)
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

// ============================================================================
// Rule
// ============================================================================

/// Parsed recurrence rule
///
/// The interval is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Rule {
    interval: u32,
    frequency: Frequency,
    weekdays: WeekdaySet,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            interval: 1,
            frequency: Frequency::Week,
            weekdays: WeekdaySet::EMPTY,
        }
    }
}

impl Rule {
    /// Create a rule, coercing an interval of 0 to 1
    pub fn new(interval: u32, frequency: Frequency, weekdays: WeekdaySet) -> Self {
        Self {
            interval: interval.max(1),
            frequency,
            weekdays,
        }
    }

    /// Every `interval` days
    pub fn daily(interval: u32) -> Self {
        Self::new(interval, Frequency::Day, WeekdaySet::EMPTY)
    }

    /// Every `interval` weeks on the anchor's weekday
    pub fn weekly(interval: u32) -> Self {
        Self::new(interval, Frequency::Week, WeekdaySet::EMPTY)
    }

    /// Every `interval` months on the anchor's day of month
    pub fn monthly(interval: u32) -> Self {
        Self::new(interval, Frequency::Month, WeekdaySet::EMPTY)
    }

    /// Replace the weekday filter
    #[must_use]
    pub fn on(mut self, weekdays: WeekdaySet) -> Self {
        self.weekdays = weekdays;
        self
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn weekdays(&self) -> WeekdaySet {
        self.weekdays
    }

    /// Parse rule notation, falling back to the default rule
    pub fn parse(text: &str) -> Self {
        static RULE_RE: OnceLock<Regex> = OnceLock::new();

        let re = RULE_RE.get_or_init(|| {
            Regex::new(r"^(\d*)(d|w|m)(Su)?(M)?(Tu)?(W)?(Th)?(F)?(Sa)?")
                .expect("Invalid regex pattern")
        });

        let Some(captures) = re.captures(text) else {
            tracing::trace!(rule = %text, "Unrecognised rule, using default");
            return Self::default();
        };

        let interval = captures
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(1);

        let frequency = captures
            .get(2)
            .and_then(|m| Frequency::from_code(m.as_str()))
            .unwrap_or_default();

        let weekdays = Weekday::ALL
            .iter()
            .enumerate()
            .filter(|(i, _)| captures.get(i + 3).is_some())
            .map(|(_, day)| *day)
            .collect();

        Self::new(interval, frequency, weekdays)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.interval, self.frequency.code())?;
        for day in self.weekdays.iter() {
            f.write_str(day.code())?;
        }
        Ok(())
    }
}

impl FromStr for Rule {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for Rule {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<Rule> for String {
    fn from(rule: Rule) -> Self {
        rule.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
