//! Address matches returned by a geocoding lookup.

use geo::Coord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One candidate match for an address query.
///
/// The provider's core fields are typed; every other field it returns is
/// kept verbatim in [`AddressResult::extra`] so callers can read
/// provider-specific data without this crate knowing about it.
///
/// Coordinates arrive as string-encoded decimals (`"52.5"`) and are
/// serialised back in the same form. Plain JSON numbers are accepted too.
///
/// # Examples
///
/// ```
/// use pinpoint_core::AddressResult;
///
/// let json = r#"{"display_name": "Berlin, Germany", "lat": "52.5", "lon": "13.4", "osm_id": 62422}"#;
/// let result: AddressResult = serde_json::from_str(json)?;
/// assert_eq!(result.display_name, "Berlin, Germany");
/// assert_eq!(result.location().y, 52.5);
/// assert_eq!(result.extra["osm_id"], 62422);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressResult {
    /// Human-readable name of the match.
    pub display_name: String,
    /// Latitude in decimal degrees.
    #[serde(with = "decimal")]
    pub lat: f64,
    /// Longitude in decimal degrees.
    #[serde(with = "decimal")]
    pub lon: f64,
    /// Provider-specific fields, preserved as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AddressResult {
    /// Construct a result without provider extras.
    #[must_use]
    pub fn new(display_name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            display_name: display_name.into(),
            lat,
            lon,
            extra: Map::new(),
        }
    }

    /// Attach a provider-specific field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Position of the match, with `x` as longitude and `y` as latitude.
    #[must_use]
    pub const fn location(&self) -> Coord {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

/// Serde adapter for coordinates encoded as decimal strings.
mod decimal {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DecimalVisitor)
    }

    struct DecimalVisitor;

    impl DecimalVisitor {
        fn finite<E: de::Error>(value: f64) -> Result<f64, E> {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(E::custom("coordinate must be a finite decimal"))
            }
        }
    }

    impl Visitor<'_> for DecimalVisitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a decimal coordinate as a string or number")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
            let parsed = value
                .trim()
                .parse::<f64>()
                .map_err(|err| E::custom(format!("invalid coordinate {value:?}: {err}")))?;
            Self::finite(parsed)
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
            Self::finite(value)
        }

        #[expect(
            clippy::cast_precision_loss,
            reason = "integral coordinates are far below the f64 mantissa limit"
        )]
        fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
            Ok(value as f64)
        }

        #[expect(
            clippy::cast_precision_loss,
            reason = "integral coordinates are far below the f64 mantissa limit"
        )]
        fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
            Ok(value as f64)
        }
    }
}
