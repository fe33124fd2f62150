//! Shareable address
//!
//! The whole user-facing state of a replay fits in a query string:
//!
//! | Key     | Meaning                          |
//! |---------|----------------------------------|
//! | `start` | anchor instant                   |
//! | `rule`  | recurrence rule notation         |
//! | `first` | first included original instant  |
//! | `last`  | last included original instant   |
//! | `title` | display title                    |
//! | `uri`   | item source identifier           |
//!
//! [`Snapshot::to_query`] always writes the keys in the order above, skips
//! unset ones, and normalizes the rule, so two equal snapshots produce the
//! same address regardless of how the input was written.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;

use crate::rule::Rule;
use crate::schedule::Bounds;

/// Format of the `start` parameter
pub const START_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Errors reading a shareable address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A date parameter could not be parsed
    #[error("Invalid instant for '{field}': {value}")]
    InvalidInstant { field: &'static str, value: String },
}

// ============================================================================
// Snapshot
// ============================================================================

/// One observation of the user's replay parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Item source identifier (`uri`)
    pub source_id: String,

    /// Rule notation as entered
    pub rule_text: String,

    /// Anchor instant (`start`)
    pub anchor: DateTime<FixedOffset>,

    #[serde(default)]
    pub first: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last: Option<DateTime<Utc>>,

    #[serde(default)]
    pub title: Option<String>,
}

impl Snapshot {
    pub fn new(
        source_id: impl Into<String>,
        rule_text: impl Into<String>,
        anchor: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            rule_text: rule_text.into(),
            anchor,
            first: None,
            last: None,
            title: None,
        }
    }

    /// Set inclusive bounds on original instants
    #[must_use]
    pub fn with_bounds(mut self, first: Option<DateTime<Utc>>, last: Option<DateTime<Utc>>) -> Self {
        self.first = first;
        self.last = last;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Parsed rule (never fails)
    pub fn rule(&self) -> Rule {
        Rule::parse(&self.rule_text)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.first, self.last)
    }

    /// Trimmed source identifier, `None` when blank
    pub fn source(&self) -> Option<&str> {
        Some(self.source_id.trim()).filter(|id| !id.is_empty())
    }

    /// Read a snapshot from a query string, dropping unparseable bounds
    ///
    /// A missing or unparseable `start` falls back to `fallback_anchor`.
    pub fn from_query(query: &str, fallback_anchor: DateTime<FixedOffset>) -> Self {
        let params = QueryParams::parse(query);
        let first = params.first.as_deref().and_then(|value| {
            parse_instant(value)
                .map(|dt| dt.with_timezone(&Utc))
                .or_else(|| {
                    tracing::warn!(value, "Ignoring invalid 'first' parameter");
                    None
                })
        });
        let last = params.last.as_deref().and_then(|value| {
            parse_instant(value)
                .map(|dt| dt.with_timezone(&Utc))
                .or_else(|| {
                    tracing::warn!(value, "Ignoring invalid 'last' parameter");
                    None
                })
        });
        params.into_snapshot(fallback_anchor, first, last)
    }

    /// Read a snapshot from a query string, rejecting unparseable bounds
    ///
    /// # Errors
    ///
    /// Returns `AddressError::InvalidInstant` if `first` or `last` is set but
    /// does not parse
    pub fn try_from_query(
        query: &str,
        fallback_anchor: DateTime<FixedOffset>,
    ) -> Result<Self, AddressError> {
        let params = QueryParams::parse(query);
        let first = parse_bound("first", params.first.as_deref())?;
        let last = parse_bound("last", params.last.as_deref())?;
        Ok(params.into_snapshot(fallback_anchor, first, last))
    }

    /// Canonical query string for this snapshot
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());

        query.append_pair("start", &self.anchor.format(START_FORMAT).to_string());
        query.append_pair("rule", &self.rule().to_string());
        if let Some(first) = self.first {
            query.append_pair("first", &first.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        if let Some(last) = self.last {
            query.append_pair("last", &last.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            query.append_pair("title", title);
        }
        if let Some(source) = self.source() {
            query.append_pair("uri", source);
        }

        query.finish()
    }
}

/// Raw query values before interpretation
#[derive(Debug, Default)]
struct QueryParams {
    uri: Option<String>,
    rule: Option<String>,
    start: Option<String>,
    first: Option<String>,
    last: Option<String>,
    title: Option<String>,
}

impl QueryParams {
    fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut params = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = Some(value.into_owned()).filter(|v| !v.is_empty());
            match key.as_ref() {
                "uri" => params.uri = value,
                "rule" => params.rule = value,
                "start" => params.start = value,
                "first" => params.first = value,
                "last" => params.last = value,
                "title" => params.title = value,
                other => tracing::trace!(key = other, "Ignoring unknown query parameter"),
            }
        }

        params
    }

    fn into_snapshot(
        self,
        fallback_anchor: DateTime<FixedOffset>,
        first: Option<DateTime<Utc>>,
        last: Option<DateTime<Utc>>,
    ) -> Snapshot {
        let anchor = self
            .start
            .as_deref()
            .and_then(parse_instant)
            .unwrap_or(fallback_anchor);

        Snapshot {
            source_id: self.uri.unwrap_or_default(),
            rule_text: self.rule.unwrap_or_else(|| Rule::default().to_string()),
            anchor,
            first,
            last,
            title: self.title,
        }
    }
}

fn parse_bound(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, AddressError> {
    value
        .map(|value| {
            parse_instant(value)
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| AddressError::InvalidInstant {
                    field,
                    value: value.to_string(),
                })
        })
        .transpose()
}

/// Parse an instant in any of the accepted address formats
///
/// Accepts RFC 3339, `START_FORMAT` (offset without colon) and a bare
/// `YYYY-MM-DDTHH:MM[:SS]`, which is read as UTC. A space where the offset
/// sign should be is treated as `+`, since an unescaped `+` in a query string
/// decodes to a space.
pub fn parse_instant(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    let repaired;
    let value = match value.rfind(' ') {
        Some(pos) if pos > 10 => {
            repaired = format!("{}+{}", &value[..pos], &value[pos + 1..]);
            repaired.as_str()
        }
        _ => value,
    };

    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, START_FORMAT))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
                .ok()
                .map(|naive| naive.and_utc().fixed_offset())
        })
}

// ============================================================================
// Address sink
// ============================================================================

/// Where the shareable address lives
pub trait AddressSink: Send {
    /// Current query string
    fn read(&self) -> String;

    /// Replace the query string
    fn write(&mut self, query: &str);
}

/// Sink that keeps every write in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    current: String,
    writes: Vec<String>,
}

impl MemorySink {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: initial.into(),
            writes: Vec::new(),
        }
    }

    /// All writes, oldest first
    pub fn writes(&self) -> &[String] {
        &self.writes
    }
}

impl AddressSink for MemorySink {
    fn read(&self) -> String {
        self.current.clone()
    }

    fn write(&mut self, query: &str) {
        self.current = query.to_string();
        self.writes.push(query.to_string());
    }
}

/// Sink that prints each address on stdout
#[derive(Debug, Clone, Default)]
pub struct StdoutSink {
    /// Prepended to the query, e.g. `https://example.com/preview?`
    prefix: String,
    current: String,
}

impl StdoutSink {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            current: String::new(),
        }
    }
}

impl AddressSink for StdoutSink {
    fn read(&self) -> String {
        self.current.clone()
    }

    fn write(&mut self, query: &str) {
        self.current = query.to_string();
        println!("{}{}", self.prefix, query);
    }
}

// ============================================================================
// Tests
// ============================================================================
