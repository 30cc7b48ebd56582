//! Trailing-edge debouncing of a frequently changing value.
//!
//! [`Debouncer`] holds at most one pending value and the instant at which it
//! settles. Every [`push`](Debouncer::push) replaces the pending value and
//! restarts the window, so a value is only released after a full window of
//! silence. The caller supplies the clock, which keeps the type free of
//! runtime dependencies and lets tests replay exact schedules.
//!
//! Each owner creates its own instance; there is no shared timer.

use std::time::Duration;

use tokio::time::Instant;

/// Trailing-edge debouncer owned by a single input.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use pinpoint_core::Debouncer;
/// use tokio::time::Instant;
///
/// let start = Instant::now();
/// let mut debouncer = Debouncer::new(Duration::from_millis(500));
/// debouncer.push("b", start);
/// debouncer.push("be", start + Duration::from_millis(100));
///
/// assert_eq!(debouncer.poll(start + Duration::from_millis(550)), None);
/// assert_eq!(debouncer.poll(start + Duration::from_millis(600)), Some("be"));
/// assert!(!debouncer.is_pending());
/// ```
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

impl<T> Debouncer<T> {
    /// Create a debouncer releasing values after `window` of quiescence.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Quiescence window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Record a new value observed at `now`, restarting the window.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            deadline: now + self.window,
        });
    }

    /// Instant at which the pending value settles, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Whether a value is waiting for its window to elapse.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its window has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| deadline <= now) {
            self.pending.take().map(|pending| pending.value)
        } else {
            None
        }
    }

    /// Discard the pending value without releasing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.value)
    }
}
