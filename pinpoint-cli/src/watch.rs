//! Watch command implementation for the Pinpoint CLI.
//!
//! Lines read from stdin drive a [`Resolver`] as if typed into a search
//! field. Every distinct state the resolver publishes is written as one JSON
//! line, so the output shows debouncing, loading and stale-result handling
//! as they happen.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pinpoint_core::{Geocoder, Resolver, ResolverConfig, ResolverError, Snapshot};
use pinpoint_data::HttpGeocoderConfig;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

use crate::script::{ScriptLine, parse_line};
use crate::{
    ARG_DEBOUNCE_MS, ARG_ENDPOINT, ARG_LANGUAGE, ARG_LIMIT, ARG_MIN_QUERY_CHARS, ARG_TIMEOUT_SECS,
    ARG_USER_AGENT, CliError, DefaultGeocoderBuilder, GeocoderBuilder, GeocoderOptions,
    build_runtime,
};

/// CLI arguments for the `watch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "watch",
    long_about = "Read raw queries from stdin, one per line, and print each \
                 resolver state change as a JSON line. `@wait <ms>` pauses \
                 input and `@refresh` repeats the settled lookup. At end of \
                 input the command waits for the last lookup and exits.",
    about = "Resolve typed queries through the debounced resolver"
)]
#[ortho_config(prefix = "PINPOINT")]
pub(crate) struct WatchArgs {
    /// Idle time in milliseconds before a query is looked up.
    #[arg(long = ARG_DEBOUNCE_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) debounce_ms: Option<u64>,
    /// Minimum trimmed query length that triggers a lookup.
    #[arg(long = ARG_MIN_QUERY_CHARS, value_name = "count")]
    #[serde(default)]
    pub(crate) min_query_chars: Option<usize>,
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

impl WatchArgs {
    pub(crate) fn into_config(self) -> Result<WatchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        WatchConfig::try_from(merged)
    }
}

/// Resolved `watch` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WatchConfig {
    pub(crate) resolver: ResolverConfig,
    pub(crate) geocoder: HttpGeocoderConfig,
}

impl TryFrom<WatchArgs> for WatchConfig {
    type Error = CliError;

    fn try_from(args: WatchArgs) -> Result<Self, Self::Error> {
        let mut resolver = ResolverConfig::default();
        if let Some(millis) = args.debounce_ms {
            resolver = resolver.with_debounce(Duration::from_millis(millis));
        }
        if let Some(chars) = args.min_query_chars {
            resolver = resolver.with_min_query_chars(chars);
        }
        resolver
            .validate()
            .map_err(CliError::InvalidResolverConfig)?;

        let geocoder = GeocoderOptions {
            endpoint: args.endpoint,
            limit: args.limit,
            language: args.language,
            timeout_secs: args.timeout_secs,
            user_agent: args.user_agent,
        }
        .into_config()?;

        Ok(Self { resolver, geocoder })
    }
}

pub(crate) fn run_watch(args: WatchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let stdin = BufReader::new(tokio::io::stdin());
    run_watch_with(args, &DefaultGeocoderBuilder, stdin, &mut stdout)
}

pub(crate) fn run_watch_with<R>(
    args: WatchArgs,
    builder: &dyn GeocoderBuilder,
    input: R,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
{
    let config = args.into_config()?;
    let geocoder = builder.build(&config.geocoder)?;
    let runtime = build_runtime()?;
    runtime.block_on(watch_session(geocoder, config.resolver, input, writer))
}

/// Feed `input` to a fresh resolver and print its states to `writer`.
///
/// Returns once the input is exhausted and the resolver is neither settling
/// nor loading.
pub(crate) async fn watch_session<R>(
    geocoder: Arc<dyn Geocoder>,
    config: ResolverConfig,
    input: R,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
{
    let resolver = Resolver::spawn(geocoder, config).map_err(CliError::InvalidResolverConfig)?;
    let mut updates = resolver.subscribe();
    let mut printer = SnapshotPrinter::new(writer, updates.borrow_and_update().clone());
    let mut lines = input.lines();
    let mut number = 0_usize;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(text) = line.map_err(CliError::ReadInput)? else {
                    break;
                };
                number += 1;
                match parse_line(&text, number)? {
                    ScriptLine::Query(query) => resolver.set_query(query)?,
                    ScriptLine::Refresh => resolver.refresh()?,
                    ScriptLine::Wait(pause) => {
                        printer.follow_for(&mut updates, pause).await?;
                    }
                }
            }
            changed = updates.changed() => {
                changed.map_err(|_| ResolverError::Closed)?;
                let current = updates.borrow_and_update().clone();
                printer.print(&current)?;
            }
        }
    }

    resolver.flush().await?;
    printer.follow_until_quiet(&mut updates).await
}

/// Writes snapshots as JSON lines, skipping repeats.
struct SnapshotPrinter<'w> {
    writer: &'w mut dyn Write,
    last: Snapshot,
}

impl<'w> SnapshotPrinter<'w> {
    fn new(writer: &'w mut dyn Write, initial: Snapshot) -> Self {
        Self {
            writer,
            last: initial,
        }
    }

    fn print(&mut self, snapshot: &Snapshot) -> Result<(), CliError> {
        if *snapshot == self.last {
            return Ok(());
        }
        serde_json::to_writer(&mut *self.writer, snapshot).map_err(CliError::SerialiseOutput)?;
        self.writer
            .write_all(b"\n")
            .map_err(CliError::WriteOutput)?;
        self.writer.flush().map_err(CliError::WriteOutput)?;
        self.last.clone_from(snapshot);
        Ok(())
    }

    async fn follow_for(
        &mut self,
        updates: &mut watch::Receiver<Snapshot>,
        pause: Duration,
    ) -> Result<(), CliError> {
        let deadline = Instant::now() + pause;
        loop {
            tokio::select! {
                () = sleep_until(deadline) => return Ok(()),
                changed = updates.changed() => {
                    changed.map_err(|_| ResolverError::Closed)?;
                    let current = updates.borrow_and_update().clone();
                    self.print(&current)?;
                }
            }
        }
    }

    async fn follow_until_quiet(
        &mut self,
        updates: &mut watch::Receiver<Snapshot>,
    ) -> Result<(), CliError> {
        loop {
            let current = updates.borrow_and_update().clone();
            self.print(&current)?;
            if !current.settling && !current.loading {
                return Ok(());
            }
            updates
                .changed()
                .await
                .map_err(|_| ResolverError::Closed)?;
        }
    }
}

#[cfg(test)]
pub(crate) fn watch_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<WatchConfig, CliError> {
    let merged = WatchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    WatchConfig::try_from(merged)
}
