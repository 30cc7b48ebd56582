//! Error types emitted by the Pinpoint CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use pinpoint_core::{GeocodeError, ResolverError};
use pinpoint_data::GeocoderBuildError;
use thiserror::Error;

/// Errors emitted by the Pinpoint CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Name of the missing option.
        field: &'static str,
        /// Environment variable that can supply the option.
        env: &'static str,
    },
    /// An option holds a value the command cannot use.
    #[error("invalid --{field}: {reason}")]
    InvalidArgument {
        /// Name of the invalid option.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// The resolver settings failed validation.
    #[error("invalid resolver settings: {0}")]
    InvalidResolverConfig(#[source] ResolverError),
    /// Constructing the HTTP geocoder failed.
    #[error("failed to build geocoder for {endpoint:?}: {source}")]
    BuildGeocoder {
        /// Endpoint the geocoder was configured for.
        endpoint: String,
        /// Underlying construction error.
        #[source]
        source: GeocoderBuildError,
    },
    /// Building the async runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The one-shot lookup failed.
    #[error(transparent)]
    Lookup(#[from] GeocodeError),
    /// The resolver stopped while the watch session was running.
    #[error("watch session ended early: {0}")]
    Resolver(#[from] ResolverError),
    /// A watch script line could not be understood.
    #[error("line {line}: {reason}")]
    InvalidScript {
        /// One-based line number of the offending line.
        line: usize,
        /// Why the line was rejected.
        reason: String,
    },
    /// Reading the watch script failed.
    #[error("failed to read input: {0}")]
    ReadInput(#[source] std::io::Error),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
