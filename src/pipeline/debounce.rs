//! Single-timer debouncer
//!
//! Holds at most one pending value. Every new value replaces the pending one
//! and pushes the deadline out by the quiet window; the value is released
//! only once the deadline passes without another update. The owner drives
//! it by sleeping until [`Debouncer::deadline`] and calling
//! [`Debouncer::take_due`], so there is never more than one timer to cancel.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace the pending value and restart the window from `now`
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    /// When the pending value becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its deadline has passed
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if deadline <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_due_before_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.schedule("a", start);

        assert_eq!(debouncer.take_due(start + Duration::from_millis(99)), None);
        assert_eq!(debouncer.take_due(start + Duration::from_millis(100)), Some("a"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_reschedule_resets_window_and_keeps_last() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.schedule("a", start);
        debouncer.schedule("b", start + Duration::from_millis(60));

        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(160))
        );
        assert_eq!(debouncer.take_due(start + Duration::from_millis(120)), None);
        assert_eq!(debouncer.take_due(start + Duration::from_millis(160)), Some("b"));
        assert_eq!(debouncer.take_due(start + Duration::from_millis(500)), None);
    }
}
