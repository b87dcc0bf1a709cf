//! Tracing subscriber initialisation
//!
//! `RUST_LOG` takes precedence over the configured level so operators can
//! raise verbosity without editing configuration.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::errors::{InfraError, InfraResult};

/// Install the global tracing subscriber
///
/// # Errors
/// Returns `InfraError::Tracing` if the level directive is invalid or a
/// global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> InfraResult<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = match config.format {
        LogFormat::Plain => builder.try_init(),
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
    };
    result.map_err(|e| InfraError::Tracing(e.to_string()))?;

    tracing::debug!(level = %config.level, format = ?config.format, "Tracing initialised");
    Ok(())
}

/// Filter from `RUST_LOG`, else from the configured level
pub fn build_filter(config: &LoggingConfig) -> InfraResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| InfraError::Tracing(format!("invalid level '{}': {e}", config.level))),
    }
}
