//! Common error types and utilities for the trust-boundary crates
//!
//! This module provides standardized error handling infrastructure shared by
//! the sanitization engine, the secure cache and the infrastructure adapters.
//!
//! # Error Handling Architecture
//!
//! 1. **`CommonError`**: the error patterns that appear across several crates
//!    (configuration, serialization, validation, cryptographic failures).
//!
//! 2. **`ErrorClassification` trait**: a standard interface for classifying
//!    errors by retryability, severity and criticality.
//!
//! 3. **`ErrorSeverity` enum**: a unified severity level used when deciding
//!    how loudly to log a failure.
//!
//! ## When to Use CommonError vs Module-Specific Errors
//!
//! Use `CommonError` directly when the failure is one of the standard patterns
//! and needs no module-specific context. Create a module-specific error (and
//! embed `CommonError` as a `#[from]` variant) when callers must match on
//! domain failures, e.g. the cache's `SecureCacheError`.
//!
//! ```rust,ignore
//! #[derive(Debug, Error)]
//! pub enum MyModuleError {
//!     #[error("Invalid widget configuration: {0}")]
//!     InvalidWidget(String),
//!
//!     #[error(transparent)]
//!     Common(#[from] CommonError),
//! }
//!
//! impl_error_conversion!(MyModuleError, Common);
//! impl_error_classification!(MyModuleError, Common,
//!     Self::InvalidWidget(_) => {
//!         retryable: false,
//!         severity: ErrorSeverity::Error,
//!         critical: false,
//!     },
//! );
//! ```
//!
//! ## Standard Error Patterns
//!
//! | Pattern | CommonError Variant | When to Use |
//! |---------|-------------------|-------------|
//! | **Configuration** | `Config` | Invalid settings, missing config, bad signature pattern |
//! | **Serialization** | `Serialization` | JSON/TOML parsing, encoding errors |
//! | **Persistence** | `Persistence` | File I/O while loading configuration |
//! | **Validation** | `Validation` | A rejected `ValidationResult` converted with `?` |
//! | **Crypto** | `Crypto` | Key material problems, AEAD failures |
//! | **Internal** | `Internal` | Bugs, invariant violations |

use std::fmt;
use std::time::Duration;

/// Standard result type using CommonError
pub type CommonResult<T> = Result<T, CommonError>;

/// Common error variants that appear across multiple modules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Configuration-related errors
    Config { message: String, field: Option<String> },

    /// Serialization or deserialization errors
    Serialization { message: String, format: Option<String> },

    /// Data persistence errors (file I/O)
    Persistence { message: String, operation: Option<String> },

    /// Validation errors
    Validation { field: String, message: String },

    /// Cryptographic failures (never carries key material or plaintext)
    Crypto { operation: String, message: String },

    /// Internal errors that shouldn't normally occur
    Internal { message: String, context: Option<String> },
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { message, field } => {
                if let Some(field) = field {
                    write!(f, "Configuration error in field '{}': {}", field, message)
                } else {
                    write!(f, "Configuration error: {}", message)
                }
            }
            Self::Serialization { message, format } => {
                if let Some(format) = format {
                    write!(f, "Serialization error ({}): {}", format, message)
                } else {
                    write!(f, "Serialization error: {}", message)
                }
            }
            Self::Persistence { message, operation } => {
                if let Some(op) = operation {
                    write!(f, "Persistence error during '{}': {}", op, message)
                } else {
                    write!(f, "Persistence error: {}", message)
                }
            }
            Self::Validation { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            Self::Crypto { operation, message } => {
                write!(f, "Cryptographic error during '{}': {}", operation, message)
            }
            Self::Internal { message, context } => {
                if let Some(ctx) = context {
                    write!(f, "Internal error in '{}': {}", ctx, message)
                } else {
                    write!(f, "Internal error: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for CommonError {}

impl ErrorClassification for CommonError {
    fn is_retryable(&self) -> bool {
        // File and key-store I/O can fail transiently; everything else is deterministic.
        matches!(self, Self::Persistence { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config { .. } => ErrorSeverity::Error,
            Self::Serialization { .. } => ErrorSeverity::Error,
            Self::Persistence { .. } => ErrorSeverity::Error,
            Self::Validation { .. } => ErrorSeverity::Warning,
            Self::Crypto { .. } => ErrorSeverity::Critical,
            Self::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Crypto { .. } | Self::Internal { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl CommonError {
    /// Create a simple configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), field: None }
    }

    /// Create a configuration error for a specific field
    pub fn config_field<S: Into<String>, F: Into<String>>(field: F, message: S) -> Self {
        Self::Config { message: message.into(), field: Some(field.into()) }
    }

    /// Create a simple serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization { message: message.into(), format: None }
    }

    /// Create a serialization error with format information
    pub fn serialization_format<S: Into<String>, F: Into<String>>(format: F, message: S) -> Self {
        Self::Serialization { message: message.into(), format: Some(format.into()) }
    }

    /// Create a simple persistence error
    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence { message: message.into(), operation: None }
    }

    /// Create a persistence error for a specific operation
    pub fn persistence_op<S: Into<String>, O: Into<String>>(operation: O, message: S) -> Self {
        Self::Persistence { message: message.into(), operation: Some(operation.into()) }
    }

    /// Create a validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create a cryptographic error
    pub fn crypto<O: Into<String>, M: Into<String>>(operation: O, message: M) -> Self {
        Self::Crypto { operation: operation.into(), message: message.into() }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), context: None }
    }

    /// Create an internal error with context
    pub fn internal_with_context<S: Into<String>, C: Into<String>>(message: S, context: C) -> Self {
        Self::Internal { message: message.into(), context: Some(context.into()) }
    }
}

/// Error classification trait for consistent error handling across modules
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as a key store that is briefly unavailable.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for logging and alerting decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    ///
    /// Critical errors indicate tampering, key problems or broken invariants.
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

// Standard conversions from common error types
impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_format("JSON", err.to_string())
    }
}

impl From<std::io::Error> for CommonError {
    fn from(err: std::io::Error) -> Self {
        Self::persistence(err.to_string())
    }
}

impl From<toml::de::Error> for CommonError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization_format("TOML", err.to_string())
    }
}

impl From<regex::Error> for CommonError {
    fn from(err: regex::Error) -> Self {
        Self::config_field("signature", err.to_string())
    }
}

/// Utility macro for creating error conversions from std types
///
/// ```rust,ignore
/// #[derive(Debug, thiserror::Error)]
/// pub enum MyError {
///     #[error(transparent)]
///     Common(#[from] CommonError),  // #[from] handles From<CommonError>
/// }
///
/// impl_error_conversion!(MyError, Common);
/// ```
///
/// This generates `From<serde_json::Error>` and `From<std::io::Error>` for
/// `MyError`, routed through `CommonError`. Use the `with_common` form when
/// the variant does not carry `#[from]`.
#[macro_export]
macro_rules! impl_error_conversion {
    // Standard variant - assumes #[from] is used for CommonError
    ($error_type:ty, $variant:ident) => {
        impl From<serde_json::Error> for $error_type {
            fn from(err: serde_json::Error) -> Self {
                Self::$variant($crate::error::CommonError::from(err))
            }
        }

        impl From<std::io::Error> for $error_type {
            fn from(err: std::io::Error) -> Self {
                Self::$variant($crate::error::CommonError::from(err))
            }
        }
    };

    // Variant that includes From<CommonError> (for cases without #[from])
    ($error_type:ty, $variant:ident, with_common) => {
        impl From<$crate::error::CommonError> for $error_type {
            fn from(err: $crate::error::CommonError) -> Self {
                Self::$variant(err)
            }
        }

        $crate::impl_error_conversion!($error_type, $variant);
    };
}

/// Macro to implement ErrorClassification by delegating to CommonError
///
/// ```rust,ignore
/// impl_error_classification!(MyError, Common,
///     Self::Specific(_) => {
///         retryable: false,
///         severity: ErrorSeverity::Error,
///         critical: false,
///     }
/// );
/// ```
#[macro_export]
macro_rules! impl_error_classification {
    (
        $error_type:ty,
        $common_variant:ident
        $(,
            $variant:pat => {
                retryable: $retryable:expr,
                severity: $severity:expr,
                critical: $critical:expr
                $(, retry_after: $retry_after:expr)?
                $(,)?
            }
        )*
        $(,)?
    ) => {
        impl $crate::error::ErrorClassification for $error_type {
            fn is_retryable(&self) -> bool {
                match self {
                    Self::$common_variant(e) => e.is_retryable(),
                    $(
                        $variant => $retryable,
                    )*
                }
            }

            fn severity(&self) -> $crate::error::ErrorSeverity {
                match self {
                    Self::$common_variant(e) => e.severity(),
                    $(
                        $variant => $severity,
                    )*
                }
            }

            fn is_critical(&self) -> bool {
                match self {
                    Self::$common_variant(e) => e.is_critical(),
                    $(
                        $variant => $critical,
                    )*
                }
            }

            fn retry_after(&self) -> Option<std::time::Duration> {
                match self {
                    Self::$common_variant(e) => e.retry_after(),
                    $(
                        $(
                            $variant => $retry_after,
                        )?
                    )*
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }
    };
}
