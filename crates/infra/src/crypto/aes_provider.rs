//! AES-256-GCM implementation of [`EncryptionProvider`]
//!
//! Each entry gets a fresh 96-bit nonce (stored as `iv`) and a detached
//! 128-bit tag (stored as `auth_tag`). The tenant id is bound as associated
//! data, so an entry sealed for one tenant fails verification for another.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use trustgate_common::crypto::{EncryptionService, KEY_LEN, NONCE_LEN, TAG_LEN};
use trustgate_common::SecureString;
use trustgate_core::{EncryptedCacheEntry, EncryptionProvider, ProviderError};
use zeroize::Zeroizing;

use crate::config::{EncryptionConfig, KeyEncoding};
use crate::errors::{InfraError, InfraResult};

/// Cache cipher backed by the common AES-GCM service
#[derive(Debug)]
pub struct AesGcmEncryptionProvider {
    service: EncryptionService,
}

impl AesGcmEncryptionProvider {
    /// Create a provider from a raw 32-byte key
    ///
    /// # Errors
    /// Returns `InfraError::InvalidKey` if the key is not 32 bytes.
    pub fn new(key: Zeroizing<Vec<u8>>) -> InfraResult<Self> {
        if key.len() != KEY_LEN {
            return Err(InfraError::InvalidKey(format!(
                "expected {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        let service = EncryptionService::new(key.to_vec())?;
        Ok(Self { service })
    }

    /// Create a provider with a freshly generated key
    pub fn generate() -> InfraResult<Self> {
        Self::new(EncryptionService::generate_key())
    }

    /// Create a provider from configuration
    ///
    /// Falls back to a generated key when none is configured.
    pub fn from_config(config: &EncryptionConfig) -> InfraResult<Self> {
        let provider = match &config.key {
            Some(encoded) => Self::new(decode_key(encoded, config.encoding)?)?,
            None => {
                tracing::warn!("No encryption key configured, using an ephemeral key");
                Self::generate()?
            }
        };
        tracing::info!(
            fingerprint = %provider.key_fingerprint(),
            "Cache encryption provider initialised"
        );
        Ok(provider)
    }

    /// Short non-reversible identifier of the active key
    pub fn key_fingerprint(&self) -> String {
        self.service.key_fingerprint()
    }
}

/// Decode configured key material
///
/// # Errors
/// Returns `InfraError::InvalidKey` on malformed input. The message never
/// contains the input.
pub fn decode_key(encoded: &str, encoding: KeyEncoding) -> InfraResult<Zeroizing<Vec<u8>>> {
    let decoded = match encoding {
        KeyEncoding::Hex => hex::decode(encoded.trim())
            .map_err(|e| InfraError::InvalidKey(format!("malformed hex: {e}")))?,
        KeyEncoding::Base64 => BASE64
            .decode(encoded.trim())
            .map_err(|e| InfraError::InvalidKey(format!("malformed base64: {e}")))?,
    };
    Ok(Zeroizing::new(decoded))
}

#[async_trait]
impl EncryptionProvider for AesGcmEncryptionProvider {
    async fn encrypt(
        &self,
        plaintext: &SecureString,
        tenant_id: &str,
    ) -> Result<EncryptedCacheEntry, ProviderError> {
        let sealed = self
            .service
            .seal(plaintext.expose_bytes(), tenant_id.as_bytes())
            .map_err(|e| ProviderError::EncryptionFailed(e.to_string()))?;
        Ok(EncryptedCacheEntry::new(sealed.ciphertext, sealed.nonce, sealed.tag))
    }

    async fn decrypt(
        &self,
        entry: &EncryptedCacheEntry,
        tenant_id: &str,
    ) -> Result<SecureString, ProviderError> {
        if entry.iv.len() != NONCE_LEN || entry.auth_tag.len() != TAG_LEN {
            return Err(ProviderError::InvalidEntry(format!(
                "expected {NONCE_LEN}-byte iv and {TAG_LEN}-byte tag, got {} and {}",
                entry.iv.len(),
                entry.auth_tag.len()
            )));
        }

        let mut opened = self
            .service
            .open(&entry.encrypted, &entry.iv, &entry.auth_tag, tenant_id.as_bytes())
            .map_err(|e| ProviderError::DecryptionFailed(e.to_string()))?;

        SecureString::from_utf8(std::mem::take(&mut *opened))
            .map_err(|e| ProviderError::InvalidEntry(e.to_string()))
    }
}
