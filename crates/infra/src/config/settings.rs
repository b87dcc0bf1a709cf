//! Application configuration types

use std::fmt;

use serde::{Deserialize, Serialize};
use trustgate_common::validation::SanitizerConfig;
use trustgate_core::SecureCacheConfig;

use crate::errors::{InfraError, InfraResult};

/// Top-level configuration for a trustgate process
///
/// Only `cache.tenant_id` is required; every other setting has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sanitizer: SanitizerConfig,

    pub cache: SecureCacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub encryption: EncryptionConfig,
}

impl AppConfig {
    /// Configuration with defaults for everything but the tenant
    pub fn for_tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            sanitizer: SanitizerConfig::default(),
            cache: SecureCacheConfig::for_tenant(tenant_id),
            logging: LoggingConfig::default(),
            encryption: EncryptionConfig::default(),
        }
    }

    /// Validate every section
    ///
    /// # Errors
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> InfraResult<()> {
        self.sanitizer.validate()?;
        self.cache.validate()?;
        self.logging.validate()?;
        self.encryption.validate()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = InfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(InfraError::config(format!("Unsupported log format: {other}"))),
        }
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Plain }
    }
}

impl LoggingConfig {
    fn validate(&self) -> InfraResult<()> {
        if self.level.trim().is_empty() {
            return Err(InfraError::config("logging.level must not be empty"));
        }
        Ok(())
    }
}

/// Encoding of a configured encryption key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    #[default]
    Hex,
    Base64,
}

impl std::str::FromStr for KeyEncoding {
    type Err = InfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            other => Err(InfraError::config(format!("Unsupported key encoding: {other}"))),
        }
    }
}

/// Cache encryption key settings
///
/// Without a key an ephemeral one is generated at startup, so cached values
/// do not survive a restart (they never do; the cache is in memory).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    /// 32-byte AES key in `encoding`
    pub key: Option<String>,
    pub encoding: KeyEncoding,
}

impl EncryptionConfig {
    fn validate(&self) -> InfraResult<()> {
        match &self.key {
            Some(key) if key.trim().is_empty() => {
                Err(InfraError::config("encryption.key must not be empty when set"))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for EncryptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionConfig")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("encoding", &self.encoding)
            .finish()
    }
}
