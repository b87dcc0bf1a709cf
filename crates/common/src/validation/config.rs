//! Sanitizer configuration
//!
//! Every field has a default, so a configuration file only needs to name the
//! settings it changes.

use serde::{Deserialize, Serialize};

use super::html::HtmlSanitizeOptions;
use super::json::DEFAULT_MAX_JSON_DEPTH;
use super::signatures::SignatureSpec;
use crate::error::{CommonError, CommonResult};

/// Default upload size limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Upload MIME types accepted by default: common images and documents
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
    "text/csv",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// Configuration for [`super::Sanitizer`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Maximum container nesting accepted by `sanitize_json`
    pub max_json_depth: usize,

    /// Maximum upload size in bytes (inclusive)
    pub max_upload_bytes: u64,

    /// Lowercase MIME types accepted by `validate_file_upload`
    pub allowed_mime_types: Vec<String>,

    /// URL schemes accepted by `sanitize_url`
    pub allowed_url_schemes: Vec<String>,

    /// Accept `data:` URLs with a warning instead of rejecting them
    pub allow_data_urls: bool,

    /// Default options for HTML sanitization
    pub html: HtmlSanitizeOptions,

    /// Extra attack signatures appended after the built-in table
    pub custom_signatures: Vec<SignatureSpec>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            max_json_depth: DEFAULT_MAX_JSON_DEPTH,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES.iter().map(|m| (*m).to_string()).collect(),
            allowed_url_schemes: vec!["http".to_string(), "https".to_string()],
            allow_data_urls: true,
            html: HtmlSanitizeOptions::default(),
            custom_signatures: Vec::new(),
        }
    }
}

impl SanitizerConfig {
    /// Check configuration invariants
    ///
    /// Signature patterns are compiled (and so checked) by `Sanitizer::new`.
    pub fn validate(&self) -> CommonResult<()> {
        if self.max_json_depth == 0 {
            return Err(CommonError::config_field("max_json_depth", "must be at least 1"));
        }
        if self.max_upload_bytes == 0 {
            return Err(CommonError::config_field("max_upload_bytes", "must be positive"));
        }
        if self.allowed_mime_types.is_empty() {
            return Err(CommonError::config_field(
                "allowed_mime_types",
                "at least one MIME type must be allowed",
            ));
        }
        if self.allowed_url_schemes.iter().any(|s| s.eq_ignore_ascii_case("javascript")) {
            return Err(CommonError::config_field(
                "allowed_url_schemes",
                "javascript cannot be allowed",
            ));
        }
        if self.html.max_length == 0 {
            return Err(CommonError::config_field("html.max_length", "must be positive"));
        }
        Ok(())
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn with_max_json_depth(mut self, max_json_depth: usize) -> Self {
        self.max_json_depth = max_json_depth;
        self
    }

    pub fn with_custom_signature(mut self, signature: SignatureSpec) -> Self {
        self.custom_signatures.push(signature);
        self
    }
}
