use std::time::Duration;

use thiserror::Error;

/// Errors from [`crate::Geocoder::search`].
///
/// Every variant renders as `lookup failed: …` so a UI can show the message
/// as-is without distinguishing causes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The endpoint could not be reached.
    #[error("lookup failed: could not reach {url}: {message}")]
    Network {
        /// Endpoint the request was sent to.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The endpoint answered with a non-success status.
    #[error("lookup failed: {url} returned status {status}")]
    Http {
        /// Endpoint the request was sent to.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The request did not complete within the configured timeout.
    #[error("lookup failed: {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint the request was sent to.
        url: String,
        /// Timeout that elapsed, in seconds.
        timeout_secs: u64,
    },
    /// The response body did not have the expected shape.
    #[error("lookup failed: malformed response: {message}")]
    Parse {
        /// Decoder error description.
        message: String,
    },
    /// The lookup task ended without producing an outcome.
    #[error("lookup failed: {message}")]
    Interrupted {
        /// Description of how the task ended.
        message: String,
    },
}

/// Errors from [`crate::Resolver`] construction and control.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    /// The debounce window must be longer than zero.
    #[error("debounce window must be positive, got {window:?}")]
    ZeroDebounceWindow {
        /// Rejected window.
        window: Duration,
    },
    /// The lookup threshold must require at least one character.
    #[error("minimum query length must be at least one character")]
    ZeroMinQueryChars,
    /// The resolver task is no longer running.
    #[error("resolver has shut down")]
    Closed,
}
