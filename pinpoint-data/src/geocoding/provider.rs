//! HTTP-based [`Geocoder`] using a Nominatim-compatible search endpoint.
//!
//! [`HttpGeocoder`] issues one `GET` per [`Geocoder::search`] call and maps
//! transport failures onto [`GeocodeError`] variants. It never retries; the
//! resolver decides when to look a query up again.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use pinpoint_core::{AddressResult, GeocodeError, Geocoder};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, InvalidHeaderValue};
use thiserror::Error;
use url::Url;

use super::nominatim::{decode_search_response, search_url};

/// Default search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// Default user agent for search requests.
///
/// The public Nominatim usage policy asks clients to identify themselves;
/// deployments should set a user agent naming their application.
pub const DEFAULT_USER_AGENT: &str = "pinpoint/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

const DEFAULT_ACCEPT_LANGUAGE: &str = "en";

const DEFAULT_LIMIT: u8 = 5;

/// Error type for [`HttpGeocoder`] construction failures.
#[derive(Debug, Error)]
pub enum GeocoderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The configured endpoint is not an absolute URL.
    #[error("invalid endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The endpoint uses a scheme other than `http` or `https`.
    #[error("unsupported endpoint scheme {scheme:?}; expected http or https")]
    UnsupportedScheme {
        /// Scheme found on the endpoint.
        scheme: String,
    },
    /// The accept-language value cannot be sent as a header.
    #[error("invalid accept-language {value:?}: {source}")]
    InvalidLanguage {
        /// Value as configured.
        value: String,
        /// Header validation failure.
        #[source]
        source: InvalidHeaderValue,
    },
    /// A result limit of zero would make every lookup empty.
    #[error("result limit must be at least 1")]
    ZeroLimit,
}

/// Configuration for [`HttpGeocoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGeocoderConfig {
    /// Search endpoint (e.g., `"https://nominatim.openstreetmap.org/search"`).
    pub endpoint: String,
    /// Request timeout duration, also applied to connection setup.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Value of the `Accept-Language` header.
    pub accept_language: String,
    /// Maximum number of results requested per lookup.
    pub limit: u8,
}

impl Default for HttpGeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_owned(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl HttpGeocoderConfig {
    /// Create a new configuration with the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the preferred response language.
    #[must_use]
    pub fn with_accept_language(mut self, language: impl Into<String>) -> Self {
        self.accept_language = language.into();
        self
    }

    /// Set the maximum number of results per lookup.
    #[must_use]
    pub fn with_limit(mut self, limit: u8) -> Self {
        self.limit = limit;
        self
    }
}

/// Geocoder backed by a Nominatim-compatible HTTP search endpoint.
///
/// The underlying [`Client`] is built once and reused, so connections are
/// pooled across lookups. Requests run on the caller's Tokio runtime.
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    client: Client,
    config: HttpGeocoderConfig,
    endpoint: Url,
}

impl HttpGeocoder {
    /// Create a new geocoder with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not a valid URL or the HTTP client
    /// fails to build.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, GeocoderBuildError> {
        Self::with_config(HttpGeocoderConfig::new(endpoint))
    }

    /// Create a new geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// fails to build.
    pub fn with_config(config: HttpGeocoderConfig) -> Result<Self, GeocoderBuildError> {
        if config.limit == 0 {
            return Err(GeocoderBuildError::ZeroLimit);
        }
        let endpoint = Url::parse(&config.endpoint).map_err(|source| {
            GeocoderBuildError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                source,
            }
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(GeocoderBuildError::UnsupportedScheme {
                scheme: endpoint.scheme().to_owned(),
            });
        }
        let language = HeaderValue::from_str(&config.accept_language).map_err(|source| {
            GeocoderBuildError::InvalidLanguage {
                value: config.accept_language.clone(),
                source,
            }
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_LANGUAGE, language);
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(GeocoderBuildError::HttpClient)?;
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// Configuration this geocoder was built with.
    #[must_use]
    pub const fn config(&self) -> &HttpGeocoderConfig {
        &self.config
    }

    /// Build the search URL for `query`.
    fn build_search_url(&self, query: &str) -> Url {
        search_url(&self.endpoint, query, self.config.limit)
    }

    async fn fetch(&self, query: &str) -> Result<Vec<AddressResult>, GeocodeError> {
        let url = self.build_search_url(query);
        debug!("requesting {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;

        let results = decode_search_response(&body)?;
        debug!("{url} returned {} result(s)", results.len());
        Ok(results)
    }

    /// Convert a reqwest error to a [`GeocodeError`].
    ///
    /// Errors name the endpoint rather than the full request URL, so the
    /// query text stays out of error messages.
    fn convert_reqwest_error(&self, error: &reqwest::Error) -> GeocodeError {
        let url = self.endpoint.as_str().to_owned();
        if error.is_timeout() {
            return GeocodeError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return GeocodeError::Http {
                url,
                status: status.as_u16(),
            };
        }

        GeocodeError::Network {
            url,
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<AddressResult>, GeocodeError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch(trimmed).await
    }
}
