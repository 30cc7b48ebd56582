//! Clock-free lookup state machine.
//!
//! [`ResolverState`] decides what a settled query means (clear, skip or
//! fetch) and which lookup completions may change the visible state. Every
//! lookup it issues carries a [`RequestId`]; only the most recently issued
//! id is authoritative, so completions are applied by issue order rather
//! than arrival order.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::{AddressResult, GeocodeError};

use super::DEFAULT_MIN_QUERY_CHARS;

/// Sequence number of an issued lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Raw sequence number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Request lifecycle as seen by observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No lookup has been made for the current input.
    #[default]
    Idle,
    /// A lookup is outstanding.
    Loading,
    /// The last authoritative lookup succeeded.
    Success,
    /// The last authoritative lookup failed.
    Error,
}

/// Observable resolver state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Latest raw input.
    pub query: String,
    /// Latest debounced input.
    pub settled: String,
    /// Whether raw input is waiting for its debounce window.
    pub settling: bool,
    /// Matches from the last successful lookup.
    pub results: Vec<AddressResult>,
    /// Whether a lookup is outstanding.
    pub loading: bool,
    /// Failure of the last authoritative lookup, if it failed.
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<GeocodeError>,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Identifier of the outstanding authoritative lookup.
    pub request: Option<RequestId>,
}

fn serialize_error<S>(error: &Option<GeocodeError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(err) => serializer.collect_str(err),
        None => serializer.serialize_none(),
    }
}

/// A lookup the caller must perform and report back via
/// [`ResolverState::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    /// Identifier to report the outcome under.
    pub id: RequestId,
    /// Trimmed query to look up.
    pub query: String,
    /// Previously authoritative lookup that this one replaces.
    pub superseded: Option<RequestId>,
}

/// Outcome of [`ResolverState::settle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settle {
    /// The query is too short; results were cleared.
    Cleared {
        /// Outstanding lookup that no longer matters.
        superseded: Option<RequestId>,
    },
    /// The query matches the last looked-up key; nothing to do.
    Unchanged,
    /// A new lookup must be performed.
    Fetch(LookupTicket),
}

/// Outcome of [`ResolverState::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome belonged to the authoritative lookup and was applied.
    Applied,
    /// The lookup had been superseded; the outcome was discarded.
    Stale,
}

/// Lookup state of one resolver instance.
///
/// # Examples
///
/// ```
/// use pinpoint_core::{AddressResult, Completion, ResolverState, Settle};
///
/// let mut state = ResolverState::new(3);
/// let Settle::Fetch(first) = state.settle("berl") else { panic!("expected fetch") };
/// let Settle::Fetch(second) = state.settle("berlin") else { panic!("expected fetch") };
///
/// let berlin = vec![AddressResult::new("Berlin, Germany", 52.5, 13.4)];
/// assert_eq!(state.complete(second.id, Ok(berlin.clone())), Completion::Applied);
/// assert_eq!(state.complete(first.id, Ok(Vec::new())), Completion::Stale);
/// assert_eq!(state.snapshot().results, berlin);
/// ```
#[derive(Debug, Clone)]
pub struct ResolverState {
    min_query_chars: usize,
    last_key: Option<String>,
    issued: u64,
    snapshot: Snapshot,
}

impl Default for ResolverState {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_QUERY_CHARS)
    }
}

impl ResolverState {
    /// Create a state machine that looks up queries of at least
    /// `min_query_chars` characters after trimming.
    #[must_use]
    pub fn new(min_query_chars: usize) -> Self {
        Self {
            min_query_chars,
            last_key: None,
            issued: 0,
            snapshot: Snapshot::default(),
        }
    }

    /// Current observable state.
    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Record a raw input change that has not settled yet.
    pub fn record_input(&mut self, query: impl Into<String>) {
        self.snapshot.query = query.into();
        self.snapshot.settling = true;
    }

    /// React to a debounced value.
    pub fn settle(&mut self, debounced: &str) -> Settle {
        debounced.clone_into(&mut self.snapshot.settled);
        self.snapshot.settling = false;

        let key = debounced.trim();
        if key.chars().count() < self.min_query_chars {
            self.last_key = None;
            let superseded = self.snapshot.request.take();
            self.snapshot.results.clear();
            self.snapshot.error = None;
            self.snapshot.loading = false;
            self.snapshot.phase = Phase::Idle;
            return Settle::Cleared { superseded };
        }

        if self.last_key.as_deref() == Some(key) {
            return Settle::Unchanged;
        }

        let query = key.to_owned();
        self.last_key = Some(query.clone());
        Settle::Fetch(self.issue(query))
    }

    /// Re-issue the last looked-up key under a fresh identifier.
    ///
    /// Returns `None` when no qualifying query has settled yet.
    pub fn refresh(&mut self) -> Option<LookupTicket> {
        let query = self.last_key.clone()?;
        Some(self.issue(query))
    }

    /// Apply the outcome of lookup `id` if it is still authoritative.
    pub fn complete(
        &mut self,
        id: RequestId,
        outcome: Result<Vec<AddressResult>, GeocodeError>,
    ) -> Completion {
        if self.snapshot.request != Some(id) {
            return Completion::Stale;
        }

        self.snapshot.request = None;
        self.snapshot.loading = false;
        match outcome {
            Ok(results) => {
                self.snapshot.results = results;
                self.snapshot.error = None;
                self.snapshot.phase = Phase::Success;
            }
            Err(err) => {
                self.snapshot.error = Some(err);
                self.snapshot.phase = Phase::Error;
            }
        }
        Completion::Applied
    }

    /// Abandon the outstanding lookup; its outcome will be reported stale.
    ///
    /// Any input still settling is dropped as well.
    pub fn cancel(&mut self) -> Option<RequestId> {
        self.snapshot.settling = false;
        let cancelled = self.snapshot.request.take();
        if cancelled.is_some() {
            self.last_key = None;
            self.snapshot.loading = false;
            self.snapshot.phase = Phase::Idle;
        }
        cancelled
    }

    fn issue(&mut self, query: String) -> LookupTicket {
        self.issued += 1;
        let id = RequestId(self.issued);
        let superseded = self.snapshot.request.replace(id);
        self.snapshot.loading = true;
        self.snapshot.phase = Phase::Loading;
        LookupTicket {
            id,
            query,
            superseded,
        }
    }
}
