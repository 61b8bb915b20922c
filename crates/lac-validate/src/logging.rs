//! Log redaction and an optional subscriber for hosts that embed the validator.
//!
//! The library only emits `tracing` events. A host with its own subscriber
//! needs nothing from this module except the redaction switch; a host without
//! one can call [`install_subscriber`] with any writer.
//!
//! # Levels
//!
//! - `warn`: rules that could not be evaluated
//! - `info`: run summary
//! - `debug`: registry resolution, per-rule progress
//! - `trace`: child-level values, redacted unless [`LogConfig::log_data`] is set

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Stands in for child identifiers and cell values in log output.
pub const REDACTED_VALUE: &str = "[REDACTED]";

pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Acquire)
}

/// `value` if child-level logging was switched on, otherwise [`REDACTED_VALUE`].
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

/// Subscriber settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    /// Level for the `lac_*` crates. `RUST_LOG` overrides it when set.
    pub level: Level,
    pub format: LogFormat,
    /// Allow child identifiers and cell values into the log.
    pub log_data: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain single-line text without colour codes.
    #[default]
    Text,
    /// One JSON object per event, plus a close event per rule span with its timing.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::default(),
            log_data: false,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_log_data(mut self, enable: bool) -> Self {
        self.log_data = enable;
        self
    }
}

/// Install a global subscriber writing validator events to `writer`.
///
/// The redaction switch only changes once the subscriber is in place.
///
/// # Errors
///
/// Fails if a global subscriber is already set.
pub fn install_subscriber<W>(config: &LogConfig, writer: W) -> Result<(), TryInitError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(validator_filter(config.level));
    let installed = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().compact().with_writer(writer).with_ansi(false))
            .try_init(),
    };
    installed.inspect(|_| LOG_DATA_ENABLED.store(config.log_data, Ordering::Release))
}

fn validator_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,lac_common={level},lac_model={level},lac_validate={level}"
        ))
    })
}
