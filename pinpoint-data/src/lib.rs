//! Data access for Pinpoint.
//!
//! Responsibilities:
//! - Provide HTTP adapters implementing [`pinpoint_core::Geocoder`].
//! - Encapsulate provider URL and response formats.
//!
//! Boundaries:
//! - Do not encode lookup policy (debouncing, thresholds and stale-response
//!   handling live in `pinpoint-core`).
//! - Keep I/O async; never block an executor thread.
//!
//! Invariants:
//! - One HTTP request per `search` call; no retries.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod geocoding;

pub use geocoding::{
    DEFAULT_ENDPOINT, DEFAULT_USER_AGENT, GeocoderBuildError, HttpGeocoder, HttpGeocoderConfig,
};
