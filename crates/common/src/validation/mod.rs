//! Sanitization engine
//!
//! Classifies and neutralizes untrusted input before it reaches business
//! logic. Every operation returns a [`ValidationResult`]: blocking problems go
//! to `errors` (and clear `valid`), advisories go to `warnings`, and the
//! cleaned value, when one exists, goes to `sanitized`.
//!
//! All operations are pure and deterministic. Regex signatures are compiled
//! once: the built-in table per process, custom signatures when the
//! [`Sanitizer`] is constructed.
//!
//! ```rust
//! use trustgate_common::validation::{Sanitizer, SanitizerConfig};
//!
//! let sanitizer = Sanitizer::new(SanitizerConfig::default()).unwrap();
//! assert!(!sanitizer.sanitize_string("'; DROP TABLE users; --").valid);
//! assert_eq!(
//!     sanitizer.validate_email("  User@Example.COM ").sanitized.as_deref(),
//!     Some("user@example.com")
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

mod config;
mod html;
mod json;
mod signatures;
mod validators;

pub use config::{SanitizerConfig, DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_UPLOAD_BYTES};
pub use html::{encode_html, HtmlSanitizeOptions, DEFAULT_ALLOWED_TAGS, DEFAULT_HTML_MAX_LENGTH};
pub use json::DEFAULT_MAX_JSON_DEPTH;
pub use signatures::{SignatureClass, SignatureSpec};
pub use validators::{
    EmailValidator, PathSanitizer, PhoneValidator, UploadValidator, UrlSanitizer,
    EXECUTABLE_EXTENSIONS, ILLEGAL_FILENAME_CHARS, MAX_EMAIL_LENGTH,
};

use crate::error::{CommonError, CommonResult};
use signatures::SignatureSet;

/// Outcome of a sanitization or validation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult<T> {
    /// `false` exactly when `errors` is non-empty
    pub valid: bool,
    /// Cleaned or normalized output
    pub sanitized: Option<T>,
    /// Blocking problems
    pub errors: Vec<String>,
    /// Non-blocking advisories
    pub warnings: Vec<String>,
}

impl<T> ValidationResult<T> {
    /// Build a result; validity is derived from `errors`.
    pub fn from_parts(sanitized: Option<T>, errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self { valid: errors.is_empty(), sanitized, errors, warnings }
    }

    /// A rejection with a single error and no cleaned output
    pub fn rejected(error: impl Into<String>) -> Self {
        Self { valid: false, sanitized: None, errors: vec![error.into()], warnings: Vec::new() }
    }

    /// Check if any advisory was raised
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Map the sanitized value, keeping errors and warnings
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ValidationResult<U> {
        ValidationResult {
            valid: self.valid,
            sanitized: self.sanitized.map(f),
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    /// Convert to a `CommonResult` so callers can use `?`
    ///
    /// Rejections become `CommonError::Validation` for `field` with the errors
    /// joined by `"; "`. Warnings are dropped.
    pub fn into_result(self, field: &str) -> CommonResult<T> {
        if !self.valid {
            return Err(CommonError::validation(field, self.errors.join("; ")));
        }
        self.sanitized.ok_or_else(|| {
            CommonError::internal_with_context("accepted input produced no sanitized value", field)
        })
    }
}

impl<T> fmt::Display for ValidationResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            write!(f, "valid ({} warnings)", self.warnings.len())
        } else {
            write!(f, "invalid: {}", self.errors.join("; "))
        }
    }
}

/// File upload descriptor; only metadata is inspected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub mime_type: String,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self { name: name.into(), size, mime_type: mime_type.into() }
    }
}

/// Sanitization engine configured once and shared freely
#[derive(Debug)]
pub struct Sanitizer {
    config: SanitizerConfig,
    signatures: SignatureSet,
    url: UrlSanitizer,
    upload: UploadValidator,
}

impl Default for Sanitizer {
    fn default() -> Self {
        let config = SanitizerConfig::default();
        Self {
            url: url_sanitizer(&config),
            upload: UploadValidator::new(&config.allowed_mime_types, config.max_upload_bytes),
            signatures: SignatureSet::builtin_only(),
            config,
        }
    }
}

impl Sanitizer {
    /// Build a sanitizer, compiling any custom signatures
    ///
    /// # Errors
    ///
    /// Returns `CommonError::Config` when the configuration is invalid or a
    /// custom signature pattern does not compile.
    pub fn new(config: SanitizerConfig) -> CommonResult<Self> {
        config.validate()?;
        let signatures = SignatureSet::with_custom(&config.custom_signatures)?;
        Ok(Self {
            url: url_sanitizer(&config),
            upload: UploadValidator::new(&config.allowed_mime_types, config.max_upload_bytes),
            signatures,
            config,
        })
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Number of compiled signatures, built-in plus custom
    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    /// See [`encode_html`].
    pub fn encode_html(&self, text: &str) -> String {
        encode_html(text)
    }

    /// Encode or filter HTML. Never rejects.
    pub fn sanitize_html(&self, text: &str, options: &HtmlSanitizeOptions) -> ValidationResult<String> {
        html::sanitize_html(text, options)
    }

    /// [`Self::sanitize_html`] with the configured default options
    pub fn sanitize_html_default(&self, text: &str) -> ValidationResult<String> {
        html::sanitize_html(text, &self.config.html)
    }

    /// Scan for attack signatures; rejection only, no cleaning.
    ///
    /// One error per matched [`SignatureClass`], in detection order.
    pub fn sanitize_string(&self, text: &str) -> ValidationResult<String> {
        let errors: Vec<String> = self
            .signatures
            .matched_classes(text)
            .into_iter()
            .map(|class| class.message().to_string())
            .collect();
        let sanitized = errors.is_empty().then(|| text.to_string());
        ValidationResult::from_parts(sanitized, errors, Vec::new())
    }

    pub fn sanitize_url(&self, url: &str) -> ValidationResult<String> {
        self.url.sanitize(url)
    }

    pub fn sanitize_file_path(&self, path: &str) -> ValidationResult<String> {
        PathSanitizer::new().sanitize(path)
    }

    pub fn validate_email(&self, email: &str) -> ValidationResult<String> {
        EmailValidator::new().validate(email)
    }

    pub fn validate_phone_number(&self, phone: &str) -> ValidationResult<String> {
        PhoneValidator::new().validate(phone)
    }

    /// Parse, depth-check and HTML-encode every string value.
    pub fn sanitize_json(&self, text: &str) -> ValidationResult<serde_json::Value> {
        json::sanitize_json(text, self.config.max_json_depth)
    }

    pub fn validate_file_upload(&self, file: &FileUpload) -> ValidationResult<FileUpload> {
        self.upload.validate(file)
    }
}

fn url_sanitizer(config: &SanitizerConfig) -> UrlSanitizer {
    UrlSanitizer::new()
        .allowed_schemes(config.allowed_url_schemes.clone())
        .allow_data_urls(config.allow_data_urls)
}
