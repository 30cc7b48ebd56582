//! Command-line interface for Pinpoint address lookups.
#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use pinpoint_core::Geocoder;
use pinpoint_data::{HttpGeocoder, HttpGeocoderConfig};
use tracing_subscriber::EnvFilter;

mod error;
mod script;
mod search;
mod watch;

pub use error::CliError;

use search::{SearchArgs, run_search};
use watch::{WatchArgs, run_watch};

const ARG_QUERY: &str = "query";
const ARG_ENDPOINT: &str = "endpoint";
const ARG_LIMIT: &str = "limit";
const ARG_LANGUAGE: &str = "language";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_USER_AGENT: &str = "user-agent";
const ARG_DEBOUNCE_MS: &str = "debounce-ms";
const ARG_MIN_QUERY_CHARS: &str = "min-query-chars";
const ENV_SEARCH_QUERY: &str = "PINPOINT_CMDS_SEARCH_QUERY";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Run the Pinpoint CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns an error when arguments or configuration are invalid, when the
/// geocoder cannot be built, or when the command itself fails.
pub fn run() -> Result<(), CliError> {
    init_logging();
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Search(args) => run_search(args),
        Command::Watch(args) => run_watch(args),
    }
}

/// Install a stderr subscriber filtered by `RUST_LOG`.
///
/// `log` records from the library crates are bridged into it.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A subscriber installed by an embedding process takes precedence.
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        log::debug!("global subscriber already installed");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "pinpoint",
    about = "Look up addresses through a Nominatim-compatible geocoder",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Look a single query up and print the results.
    Search(SearchArgs),
    /// Resolve queries typed on stdin through the debounced resolver.
    Watch(WatchArgs),
}

/// Geocoder options shared by every subcommand, as merged from all layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct GeocoderOptions {
    endpoint: Option<String>,
    limit: Option<u8>,
    language: Option<String>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

impl GeocoderOptions {
    /// Apply the options over [`HttpGeocoderConfig::default`].
    fn into_config(self) -> Result<HttpGeocoderConfig, CliError> {
        let mut config = HttpGeocoderConfig::default();
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(limit) = self.limit {
            if limit == 0 {
                return Err(CliError::InvalidArgument {
                    field: ARG_LIMIT,
                    reason: "must be at least 1",
                });
            }
            config = config.with_limit(limit);
        }
        if let Some(language) = self.language {
            config = config.with_accept_language(language);
        }
        if let Some(secs) = self.timeout_secs {
            if secs == 0 {
                return Err(CliError::InvalidArgument {
                    field: ARG_TIMEOUT_SECS,
                    reason: "must be at least 1",
                });
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        Ok(config)
    }
}

/// Builds the geocoder a command looks addresses up with.
trait GeocoderBuilder {
    fn build(&self, config: &HttpGeocoderConfig) -> Result<Arc<dyn Geocoder>, CliError>;
}

struct DefaultGeocoderBuilder;

impl GeocoderBuilder for DefaultGeocoderBuilder {
    fn build(&self, config: &HttpGeocoderConfig) -> Result<Arc<dyn Geocoder>, CliError> {
        let geocoder =
            HttpGeocoder::with_config(config.clone()).map_err(|source| CliError::BuildGeocoder {
                endpoint: config.endpoint.clone(),
                source,
            })?;
        Ok(Arc::new(geocoder))
    }
}

fn build_runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)
}

#[cfg(test)]
mod tests;
