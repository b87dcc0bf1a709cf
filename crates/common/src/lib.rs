//! Modular common utilities shared across Trustgate crates.
//!
//! # Safety and Quality
//!
//! This crate enforces strict safety and quality standards: no unsafe code,
//! no panics on well-formed input, and sensitive buffers are zeroized.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: errors, validation (sanitization engine), time, utilities
//! - `runtime`: cryptographic primitives and zeroizing secret containers
//! - `test-utils`: log capture and deterministic clock helpers for tests
//! - `observability`: optional tracing (pulled in by `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod time;
#[cfg(feature = "foundation")]
pub mod validation;
#[cfg(feature = "foundation")]
pub mod utils;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod crypto;
#[cfg(feature = "runtime")]
pub mod security;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(feature = "test-utils")]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use crypto::{EncryptionService, SealedPayload};
#[cfg(feature = "foundation")]
pub use error::{CommonError, CommonResult, ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use security::SecureString;
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
#[cfg(feature = "foundation")]
pub use utils::serde::duration_millis;
#[cfg(feature = "foundation")]
pub use validation::{
    encode_html, FileUpload, HtmlSanitizeOptions, Sanitizer, SanitizerConfig, SignatureClass,
    SignatureSpec, ValidationResult,
};
