//! Diagnostics for the CLI.
//!
//! Reports go to stdout, so every log line goes to stderr. `RUST_LOG` picks
//! the level (default `warn`) and `GRAPH_VERIFIER_LOG_FORMAT` picks the line
//! format.

use std::env;
use std::sync::OnceLock;

use strum::{Display, EnumString};
use thiserror::Error;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

const FORMAT_VAR: &str = "GRAPH_VERIFIER_LOG_FORMAT";
const DEFAULT_DIRECTIVE: &str = "warn";

static INSTALLED: OnceLock<LogFormat> = OnceLock::new();

/// Line format for stderr diagnostics.
#[derive(Clone, Copy, Debug, Default, Display, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// Plain text with span timings.
    #[default]
    Human,
    /// One JSON object per event, with the enclosing spans.
    Json,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("GRAPH_VERIFIER_LOG_FORMAT is not valid UTF-8: {source}")]
    InvalidUnicode {
        #[source]
        source: env::VarError,
    },
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat { provided: String },
}

/// Blank means the default.
fn parse_format(raw: &str) -> Result<LogFormat, LoggingError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(LogFormat::default());
    }
    raw.parse().map_err(|_| LoggingError::UnsupportedFormat {
        provided: raw.to_owned(),
    })
}

fn format_from_env() -> Result<LogFormat, LoggingError> {
    match env::var(FORMAT_VAR) {
        Ok(raw) => parse_format(&raw),
        Err(env::VarError::NotPresent) => Ok(LogFormat::default()),
        Err(source) => Err(LoggingError::InvalidUnicode { source }),
    }
}

/// Install the stderr subscriber once per process and return its format.
///
/// If another subscriber is already global it is left in place and a note
/// is printed; that is not an error.
pub fn init_logging() -> Result<LogFormat, LoggingError> {
    if let Some(format) = INSTALLED.get() {
        return Ok(*format);
    }

    let format = format_from_env()?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let lines = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);

    let installed = match format {
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter)
            .with(lines)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(lines.json().with_current_span(true).with_span_list(true))
            .try_init(),
    };
    if let Err(err) = installed {
        eprintln!("keeping the existing tracing subscriber: {err}");
    }

    Ok(*INSTALLED.get_or_init(|| format))
}
