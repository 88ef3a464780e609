//! Trailing-edge debouncing of raw input.
//!
//! Each new value replaces the pending one and pushes the deadline out by the
//! quiet period. The value is released once the deadline passes with no newer
//! input. The driver owns the timer; this type only tracks value + deadline.

use std::time::Duration;

use tokio::time::Instant;

/// Collapses bursts of values into the last value of each burst.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Record `value` received at `now`, replacing any pending value.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            deadline: now + self.quiet,
        });
    }

    /// When the pending value settles, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    /// Take the pending value if its quiet period has elapsed by `now`.
    pub fn take_settled(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if p.deadline <= now => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Take the pending value regardless of its deadline (input closed).
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }
}
