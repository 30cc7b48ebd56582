//! Nominatim search API request and response formats.
//!
//! The search endpoint answers with a JSON array of places. Each place must
//! carry `display_name`, `lat` and `lon`; remaining fields are kept on the
//! decoded [`AddressResult`]. Some deployments answer failures with a JSON
//! object holding an `error` member instead of an array.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>

use pinpoint_core::{AddressResult, GeocodeError};
use serde_json::Value;
use url::Url;

/// Build the search URL for `query`.
///
/// Parameters are appended to any already present on `endpoint`.
pub(crate) fn search_url(endpoint: &Url, query: &str, limit: u8) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("format", "json")
        .append_pair("limit", &limit.to_string());
    url
}

/// Decode a search response body.
pub(crate) fn decode_search_response(body: &[u8]) -> Result<Vec<AddressResult>, GeocodeError> {
    let value: Value = serde_json::from_slice(body).map_err(|err| GeocodeError::Parse {
        message: err.to_string(),
    })?;
    match value {
        Value::Array(_) => serde_json::from_value(value).map_err(|err| GeocodeError::Parse {
            message: err.to_string(),
        }),
        Value::Object(ref object) => match object.get("error") {
            Some(error) => Err(GeocodeError::Parse {
                message: format!("service reported an error: {}", describe(error)),
            }),
            None => Err(unexpected_shape(&value)),
        },
        other => Err(unexpected_shape(&other)),
    }
}

fn unexpected_shape(value: &Value) -> GeocodeError {
    GeocodeError::Parse {
        message: format!("expected an array of places, found {}", kind(value)),
    }
}

fn describe(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(details) => details
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_owned),
        other => other.to_string(),
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
