//! Line format read by the `watch` command.
//!
//! Every line is a raw query exactly as typed, except lines starting with
//! `@`, which are directives:
//!
//! - `@wait <ms>` pauses input for the given number of milliseconds.
//! - `@refresh` looks the settled query up again.
//!
//! A literal query starting with `@` is written with a doubled prefix
//! (`@@home` types `@home`).

use std::time::Duration;

use crate::CliError;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScriptLine {
    /// Replace the raw query.
    Query(String),
    /// Pause before reading the next line.
    Wait(Duration),
    /// Re-run the lookup for the settled query.
    Refresh,
}

/// Parse `text`, reported as line `line` (1-based) on failure.
pub(crate) fn parse_line(text: &str, line: usize) -> Result<ScriptLine, CliError> {
    let raw = text.strip_suffix('\r').unwrap_or(text);
    if let Some(escaped) = raw.strip_prefix("@@") {
        return Ok(ScriptLine::Query(format!("@{escaped}")));
    }
    let Some(directive) = raw.strip_prefix('@') else {
        return Ok(ScriptLine::Query(raw.to_owned()));
    };

    let mut words = directive.split_whitespace();
    let invalid = |reason: String| CliError::InvalidScript { line, reason };
    match (words.next(), words.next(), words.next()) {
        (Some("refresh"), None, None) => Ok(ScriptLine::Refresh),
        (Some("wait"), Some(millis), None) => millis
            .parse::<u64>()
            .map(|value| ScriptLine::Wait(Duration::from_millis(value)))
            .map_err(|err| invalid(format!("invalid @wait duration {millis:?}: {err}"))),
        (Some("wait"), None, None) => Err(invalid("@wait needs a duration in milliseconds".to_owned())),
        (Some(name @ ("wait" | "refresh")), Some(_), _) => {
            Err(invalid(format!("too many arguments to @{name}")))
        }
        _ => Err(invalid(format!("unknown directive {raw:?}"))),
    }
}
