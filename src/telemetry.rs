//! Tracing infrastructure.
//!
//! Structured logging setup over `tracing` + `tracing-subscriber`: an
//! environment-filterable fmt layer, compact or pretty output. The library
//! itself only emits events; hosts call [`init`] (or install their own
//! subscriber) before building the runtime.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{HubError, HubResult};

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Multi-line, colored output for development.
    Pretty,
    /// Single-line output for production logs.
    Compact,
}

/// Install the global subscriber with the given filter directive
/// (`info`, `driver_hub=debug,warn`, …).
///
/// Fails if the directive does not parse or a subscriber is already
/// installed.
pub fn init(filter: &str, format: OutputFormat) -> HubResult<()> {
    let env_filter = EnvFilter::try_new(filter)
        .map_err(|_| HubError::InvalidLogLevel(filter.to_string()))?;

    match format {
        OutputFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .try_init(),
        OutputFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_ansi(false))
            .try_init(),
    }
    .map_err(|err| HubError::Telemetry(err.to_string()))?;
    Ok(())
}
