//! Tracing setup and command-outcome logging helpers.

use std::time::Duration;

use pinesync_domain::ConnectorError;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over the `info` default.
///
/// Logs go to stderr so command results on stdout stay machine-readable.
/// A second call is a no-op.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
    } else {
        registry.with(fmt::layer().with_target(false).with_writer(std::io::stderr)).try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing_already_initialized");
    }
}

/// Log the outcome of a CLI command with structured fields.
///
/// `command` must be a stable identifier without sensitive data.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, success: bool) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, "command_execution_failure");
    }
}

/// Stable label for an error, suitable for log fields.
#[inline]
pub const fn error_label(error: &ConnectorError) -> &'static str {
    match error {
        ConnectorError::Config(_) => "config",
        ConnectorError::Network(_) => "network",
        ConnectorError::Auth(_) => "auth",
        ConnectorError::Api { .. } => "api",
        ConnectorError::InvalidInput(_) => "invalid_input",
        ConnectorError::Identity(_) => "identity",
        ConnectorError::NotFound(_) => "not_found",
        ConnectorError::Conflict(_) => "conflict",
        ConnectorError::Cancelled => "cancelled",
        ConnectorError::Internal(_) => "internal",
    }
}
