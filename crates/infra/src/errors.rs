//! Infrastructure errors
//!
//! Wraps the common and cache errors so adapters can use `?` across layers.

use thiserror::Error;
use trustgate_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use trustgate_core::SecureCacheError;

/// Result alias for infrastructure operations
pub type InfraResult<T> = Result<T, InfraError>;

#[derive(Debug, Error)]
pub enum InfraError {
    /// Configuration could not be read, parsed or validated
    #[error("configuration error: {0}")]
    Config(String),

    /// Key material has the wrong encoding or length
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    /// A global tracing subscriber was already installed or the filter is bad
    #[error("failed to initialise tracing: {0}")]
    Tracing(String),

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error(transparent)]
    Cache(#[from] SecureCacheError),
}

impl InfraError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

trustgate_common::impl_error_conversion!(InfraError, Common);
trustgate_common::impl_error_classification!(InfraError, Common,
    Self::Config(_) | Self::Tracing(_) => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    },
    Self::InvalidKey(_) => {
        retryable: false,
        severity: ErrorSeverity::Critical,
        critical: true,
    },
    Self::Cache(err) => {
        retryable: err.is_retryable(),
        severity: err.severity(),
        critical: err.is_critical(),
        retry_after: err.retry_after(),
    },
);
