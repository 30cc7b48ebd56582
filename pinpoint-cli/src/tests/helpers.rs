//! Test doubles for building geocoders and reading command output.

use super::*;
use pinpoint_core::AddressResult;
use pinpoint_core::test_support::StubGeocoder;
use serde_json::Value;
use std::sync::{Mutex, PoisonError};

/// Hands out clones of one scripted geocoder and records the configs asked for.
#[derive(Debug, Default)]
pub(super) struct StubGeocoderBuilder {
    pub(super) stub: StubGeocoder,
    built: Mutex<Vec<HttpGeocoderConfig>>,
}

impl StubGeocoderBuilder {
    pub(super) fn new(stub: StubGeocoder) -> Self {
        Self {
            stub,
            built: Mutex::default(),
        }
    }

    pub(super) fn built(&self) -> Vec<HttpGeocoderConfig> {
        self.built
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl GeocoderBuilder for StubGeocoderBuilder {
    fn build(&self, config: &HttpGeocoderConfig) -> Result<Arc<dyn Geocoder>, CliError> {
        self.built
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(config.clone());
        Ok(Arc::new(self.stub.clone()))
    }
}

pub(super) fn berlin() -> AddressResult {
    AddressResult::new("Berlin, Germany", 52.52, 13.405).with_extra("osm_type", "relation")
}

/// Parse newline-delimited JSON written by the watch command.
pub(super) fn json_lines(output: &[u8]) -> Vec<Value> {
    let text = std::str::from_utf8(output).expect("output should be UTF-8");
    text.lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect()
}
