//! Core domain types for debounced address lookup.
//!
//! The crate models what a search field needs from a geocoding service:
//! a typed [`AddressResult`], the [`Geocoder`] seam that fetches them, a
//! per-instance [`Debouncer`] and the [`Resolver`] that ties both together
//! while guaranteeing that only the most recently issued lookup can change
//! the observable [`Snapshot`].
//!
//! The state machine behind the resolver, [`ResolverState`], is free of
//! clocks and I/O so it can be driven directly from tests.

#![forbid(unsafe_code)]

mod address;
pub mod debounce;
mod error;
mod geocoder;
pub mod resolver;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use address::AddressResult;
pub use debounce::Debouncer;
pub use error::{GeocodeError, ResolverError};
pub use geocoder::Geocoder;
pub use resolver::{
    Completion, DEFAULT_DEBOUNCE, DEFAULT_MIN_QUERY_CHARS, LookupTicket, Phase, RequestId,
    Resolver, ResolverConfig, ResolverState, Settle, Snapshot,
};
