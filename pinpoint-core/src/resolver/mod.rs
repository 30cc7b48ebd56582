//! Debounced, stale-safe address lookup.
//!
//! The module has two layers:
//!
//! - [`ResolverState`] maps settled queries to lookups and applies lookup
//!   outcomes, ignoring any that a newer lookup has superseded.
//! - [`Resolver`] runs that state machine on a Tokio task together with a
//!   per-instance [`Debouncer`](crate::Debouncer) and the
//!   [`Geocoder`](crate::Geocoder) it queries, publishing each change as a
//!   [`Snapshot`].

mod driver;
mod state;

use std::time::Duration;

pub use driver::Resolver;
pub use state::{Completion, LookupTicket, Phase, RequestId, ResolverState, Settle, Snapshot};

use crate::ResolverError;

/// Default quiescence window before a query is looked up.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default minimum trimmed query length, in characters, that triggers a lookup.
pub const DEFAULT_MIN_QUERY_CHARS: usize = 3;

/// Configuration for [`Resolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Quiescence window applied to raw input.
    pub debounce: Duration,
    /// Minimum trimmed query length, in characters, that triggers a lookup.
    pub min_query_chars: usize,
    /// Abort superseded lookups instead of letting them run to completion.
    ///
    /// Superseded outcomes are discarded either way.
    pub abort_superseded: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            abort_superseded: true,
        }
    }
}

impl ResolverConfig {
    /// Set the debounce window.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the minimum query length.
    #[must_use]
    pub const fn with_min_query_chars(mut self, min_query_chars: usize) -> Self {
        self.min_query_chars = min_query_chars;
        self
    }

    /// Choose whether superseded lookups are aborted.
    #[must_use]
    pub const fn with_abort_superseded(mut self, abort_superseded: bool) -> Self {
        self.abort_superseded = abort_superseded;
        self
    }

    /// Check the configuration for values the resolver cannot honour.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::ZeroDebounceWindow`] for an empty window and
    /// [`ResolverError::ZeroMinQueryChars`] for a zero-length threshold.
    pub fn validate(&self) -> Result<(), ResolverError> {
        if self.debounce.is_zero() {
            return Err(ResolverError::ZeroDebounceWindow {
                window: self.debounce,
            });
        }
        if self.min_query_chars == 0 {
            return Err(ResolverError::ZeroMinQueryChars);
        }
        Ok(())
    }
}
