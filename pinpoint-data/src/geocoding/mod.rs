//! HTTP-based geocoders for address search services.
//!
//! This module provides [`HttpGeocoder`], an implementation of
//! [`pinpoint_core::Geocoder`] that queries a Nominatim-compatible search
//! endpoint.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use pinpoint_core::Geocoder;
//! use pinpoint_data::geocoding::{HttpGeocoder, HttpGeocoderConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpGeocoderConfig::new("https://nominatim.openstreetmap.org/search")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("jobs-board/1.0 (ops@example.com)");
//! let geocoder = HttpGeocoder::with_config(config)?;
//!
//! for result in geocoder.search("Berlin").await? {
//!     println!("{} ({}, {})", result.display_name, result.lat, result.lon);
//! }
//! # Ok(())
//! # }
//! ```

mod nominatim;
mod provider;

pub use provider::{
    DEFAULT_ENDPOINT, DEFAULT_USER_AGENT, GeocoderBuildError, HttpGeocoder, HttpGeocoderConfig,
};
