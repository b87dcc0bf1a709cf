//! Service wiring from configuration

use std::sync::Arc;

use trustgate_common::validation::Sanitizer;
use trustgate_core::SecureCache;

use crate::config::AppConfig;
use crate::crypto::AesGcmEncryptionProvider;
use crate::errors::InfraResult;

/// The sanitizer and cache a process needs, built once at startup
#[derive(Debug)]
pub struct Services {
    pub sanitizer: Arc<Sanitizer>,
    pub cache: Arc<SecureCache>,
}

impl Services {
    /// Build services from validated configuration
    ///
    /// # Errors
    /// Returns an error if any section is invalid or the key cannot be used.
    pub fn from_config(config: &AppConfig) -> InfraResult<Self> {
        config.validate()?;

        let sanitizer = Sanitizer::new(config.sanitizer.clone())?;
        let provider = AesGcmEncryptionProvider::from_config(&config.encryption)?;
        let cache = SecureCache::new(Arc::new(provider), config.cache.clone())?;

        tracing::info!(
            tenant_id = %cache.tenant_id(),
            ttl_ms = cache.ttl().as_millis() as u64,
            signatures = sanitizer.signature_count(),
            "Trustgate services ready"
        );

        Ok(Self { sanitizer: Arc::new(sanitizer), cache: Arc::new(cache) })
    }
}
