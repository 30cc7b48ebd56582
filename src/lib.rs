//! Facade crate for Pinpoint debounced address lookup.
//!
//! This crate re-exports the core domain types and exposes the HTTP geocoder
//! behind the `http` feature flag.

#![forbid(unsafe_code)]

pub use pinpoint_core::{
    AddressResult, Completion, Debouncer, GeocodeError, Geocoder, LookupTicket, Phase, RequestId,
    Resolver, ResolverConfig, ResolverError, ResolverState, Settle, Snapshot,
};

#[cfg(feature = "test-support")]
pub use pinpoint_core::test_support;

#[cfg(feature = "http")]
pub use pinpoint_data::{GeocoderBuildError, HttpGeocoder, HttpGeocoderConfig};
