//! Structured logging using the tracing crate
//!
//! Three output formats are selected by `LOG_FORMAT`:
//!
//! - `json` - structured JSON for production and log aggregation
//! - `pretty` - multi-line, coloured output for development
//! - `compact` - single-line, coloured terminal output
//!
//! ## Environment Variables
//!
//! - `LOG_LEVEL`: ERROR, WARN, INFO, DEBUG or TRACE; defaults to INFO
//! - `LOG_FORMAT`: json, pretty or compact; defaults to json
//! - `LOG_SPANS`: emit span open/close events when `true`
//! - `RUST_LOG`: full filter override in env_logger syntax
//!
//! ```bash
//! LOG_FORMAT=pretty LOG_LEVEL=DEBUG ./migration-agent
//! ```

use std::env;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Dependencies that are chatty at info level
const QUIET_DIRECTIVES: &[&str] = &["hyper=warn", "reqwest=warn", "tokio=warn", "warp=warn"];

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    /// Parse a format name; anything unrecognised falls back to JSON
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Json,
        }
    }
}

/// Parse a `LOG_LEVEL` value; anything unrecognised means INFO
pub fn parse_level(s: &str) -> Level {
    match s.trim().to_uppercase().as_str() {
        "ERROR" => Level::ERROR,
        "WARN" => Level::WARN,
        "DEBUG" => Level::DEBUG,
        "TRACE" => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Only a case-insensitive `true` enables span events
pub fn parse_span_flag(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("true")
}

fn build_filter(level: Level, rust_log: Option<String>) -> EnvFilter {
    if let Some(rust_log) = rust_log.filter(|s| !s.trim().is_empty()) {
        return EnvFilter::new(rust_log);
    }

    QUIET_DIRECTIVES
        .iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(EnvFilter::new(level.to_string()), |filter, directive| {
            filter.add_directive(directive)
        })
}

/// Install the global subscriber
///
/// Later calls are no-ops once a subscriber is installed.
pub fn init_logging(level: Level, format: LogFormat, include_spans: bool) {
    let filter = build_filter(level, env::var("RUST_LOG").ok());
    let span_events = if include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let subscriber = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => subscriber
            .with(fmt::layer().json().with_span_events(span_events))
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(
                fmt::layer()
                    .pretty()
                    .with_ansi(true)
                    .with_span_events(span_events),
            )
            .try_init(),
        LogFormat::Compact => subscriber
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(true)
                    .with_target(false)
                    .with_span_events(span_events),
            )
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}

/// Initialize logging from `LOG_LEVEL`, `LOG_FORMAT` and `LOG_SPANS`
pub fn init_default_logging() {
    let level = parse_level(&env::var("LOG_LEVEL").unwrap_or_default());
    let format = LogFormat::parse(&env::var("LOG_FORMAT").unwrap_or_default());
    let include_spans = parse_span_flag(&env::var("LOG_SPANS").unwrap_or_default());

    init_logging(level, format, include_spans);
}

/// Span wrapping the processing of one task
#[macro_export]
macro_rules! task_span {
    ($($field:tt)*) => {
        tracing::info_span!("task_processing", $($field)*)
    };
}

/// Span wrapping the dispatch of one JSON-RPC request
#[macro_export]
macro_rules! rpc_span {
    ($($field:tt)*) => {
        tracing::info_span!("rpc_request", $($field)*)
    };
}

pub use {rpc_span, task_span};
