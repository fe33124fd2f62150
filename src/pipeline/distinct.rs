//! Distinct-until-changed combinator
//!
//! Each pipeline stage looks at its own projection of a snapshot and only
//! acts when that projection differs, by value, from the last one it saw.

/// Remembers the last value and reports whether a new one differs
#[derive(Debug, Clone)]
pub struct Distinct<T> {
    last: Option<T>,
}

impl<T> Default for Distinct<T> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<T: PartialEq> Distinct<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` and return `true` if it differs from the previous one
    ///
    /// The first value after construction or [`reset`](Self::reset) always
    /// counts as a change.
    pub fn update(&mut self, value: T) -> bool {
        if self.last.as_ref() == Some(&value) {
            return false;
        }
        self.last = Some(value);
        true
    }

    pub fn get(&self) -> Option<&T> {
        self.last.as_ref()
    }

    /// Forget the last value so the next update counts as a change
    pub fn reset(&mut self) {
        self.last = None;
    }
}
