//! Secure cache configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use trustgate_common::duration_millis;
use trustgate_common::error::{CommonError, CommonResult};

/// Default time-to-live for cached secrets (15 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Configuration for one tenant's cache instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureCacheConfig {
    /// Tenant that owns every entry in the cache
    pub tenant_id: String,

    /// Age after which an entry is treated as absent, in milliseconds on the
    /// wire
    #[serde(with = "duration_millis", default = "default_ttl")]
    pub default_ttl: Duration,
}

fn default_ttl() -> Duration {
    DEFAULT_TTL
}

impl SecureCacheConfig {
    pub fn new(tenant_id: impl Into<String>, default_ttl: Duration) -> Self {
        Self { tenant_id: tenant_id.into(), default_ttl }
    }

    /// Configuration with the default TTL
    pub fn for_tenant(tenant_id: impl Into<String>) -> Self {
        Self::new(tenant_id, DEFAULT_TTL)
    }

    /// Check configuration invariants
    pub fn validate(&self) -> CommonResult<()> {
        if self.tenant_id.trim().is_empty() {
            return Err(CommonError::config_field("tenant_id", "must not be empty"));
        }
        if self.default_ttl.is_zero() {
            return Err(CommonError::config_field("default_ttl", "must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for secure cache configuration
    use super::*;

    /// Validates TTL is read as milliseconds and defaults when omitted.
    #[test]
    fn test_deserialize_ttl_millis() {
        let config: SecureCacheConfig =
            serde_json::from_str(r#"{"tenant_id": "acme", "default_ttl": 1500}"#).expect("valid");
        assert_eq!(config.default_ttl, Duration::from_millis(1500));

        let defaulted: SecureCacheConfig = toml::from_str("tenant_id = \"acme\"").expect("valid");
        assert_eq!(defaulted.default_ttl, DEFAULT_TTL);
    }

    /// Validates empty tenant and zero TTL are rejected.
    #[test]
    fn test_validate() {
        assert!(SecureCacheConfig::for_tenant("acme").validate().is_ok());

        let err = SecureCacheConfig::for_tenant("  ").validate().unwrap_err();
        assert!(err.to_string().contains("tenant_id"));

        let err = SecureCacheConfig::new("acme", Duration::ZERO).validate().unwrap_err();
        assert!(err.to_string().contains("default_ttl"));
    }
}
