//! Search command implementation for the Pinpoint CLI.

use std::io::Write;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pinpoint_core::AddressResult;
use pinpoint_data::HttpGeocoderConfig;
use serde::{Deserialize, Serialize};

use crate::{
    ARG_ENDPOINT, ARG_LANGUAGE, ARG_LIMIT, ARG_QUERY, ARG_TIMEOUT_SECS, ARG_USER_AGENT, CliError,
    DefaultGeocoderBuilder, ENV_SEARCH_QUERY, GeocoderBuilder, GeocoderOptions, build_runtime,
};

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "search",
    long_about = "Send one query to the geocoder and print every candidate \
                 as a JSON array. No debouncing or length threshold applies.",
    about = "Look a single query up"
)]
#[ortho_config(prefix = "PINPOINT")]
pub(crate) struct SearchArgs {
    /// Address or place to look up.
    #[arg(value_name = "query")]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Search endpoint of a Nominatim-compatible service.
    #[arg(long = ARG_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) endpoint: Option<String>,
    /// Maximum number of results to request.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<u8>,
    /// Preferred language for result names (Accept-Language).
    #[arg(long = ARG_LANGUAGE, value_name = "tag")]
    #[serde(default)]
    pub(crate) language: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// User agent sent with each request.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchConfig {
    /// Trimmed query text.
    pub(crate) query: String,
    pub(crate) geocoder: HttpGeocoderConfig,
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let raw = args.query.ok_or(CliError::MissingArgument {
            field: ARG_QUERY,
            env: ENV_SEARCH_QUERY,
        })?;
        let query = raw.trim();
        if query.is_empty() {
            return Err(CliError::InvalidArgument {
                field: ARG_QUERY,
                reason: "must not be blank",
            });
        }

        let geocoder = GeocoderOptions {
            endpoint: args.endpoint,
            limit: args.limit,
            language: args.language,
            timeout_secs: args.timeout_secs,
            user_agent: args.user_agent,
        }
        .into_config()?;

        Ok(Self {
            query: query.to_owned(),
            geocoder,
        })
    }
}

pub(crate) fn run_search(args: SearchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_search_with(args, &DefaultGeocoderBuilder, &mut stdout)
}

pub(crate) fn run_search_with(
    args: SearchArgs,
    builder: &dyn GeocoderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let geocoder = builder.build(&config.geocoder)?;
    let runtime = build_runtime()?;
    let results = runtime.block_on(geocoder.search(&config.query))?;
    log::debug!("{} result(s) for {:?}", results.len(), config.query);
    write_results(writer, &results)
}

fn write_results(writer: &mut dyn Write, results: &[AddressResult]) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(results).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SearchConfig, CliError> {
    let merged = SearchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SearchConfig::try_from(merged)
}
