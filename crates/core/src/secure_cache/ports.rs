//! Port interfaces for the secure cache
//!
//! The cache never interprets ciphertext; everything cryptographic happens
//! behind [`EncryptionProvider`].

use async_trait::async_trait;
use thiserror::Error;
use trustgate_common::error::{ErrorClassification, ErrorSeverity};
use trustgate_common::SecureString;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Ciphertext, IV and authentication tag for one cached value
///
/// Produced only by an [`EncryptionProvider`]. Not `Clone`, so a wiped entry
/// cannot leave an unwiped copy behind. Dropping an entry zeroizes and
/// releases its buffers.
#[derive(Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct EncryptedCacheEntry {
    pub encrypted: Vec<u8>,
    pub iv: Vec<u8>,
    pub auth_tag: Vec<u8>,
}

impl EncryptedCacheEntry {
    pub fn new(encrypted: Vec<u8>, iv: Vec<u8>, auth_tag: Vec<u8>) -> Self {
        Self { encrypted, iv, auth_tag }
    }

    /// Overwrite every byte with zero, keeping buffer lengths
    pub fn wipe(&mut self) {
        self.encrypted.as_mut_slice().zeroize();
        self.iv.as_mut_slice().zeroize();
        self.auth_tag.as_mut_slice().zeroize();
    }

    /// True when every byte of every buffer is zero
    pub fn is_wiped(&self) -> bool {
        [&self.encrypted, &self.iv, &self.auth_tag].iter().all(|buf| buf.iter().all(|b| *b == 0))
    }

    /// Total bytes held across the three buffers
    pub fn len(&self) -> usize {
        self.encrypted.len() + self.iv.len() + self.auth_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for EncryptedCacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedCacheEntry")
            .field("encrypted_len", &self.encrypted.len())
            .field("iv_len", &self.iv.len())
            .field("auth_tag_len", &self.auth_tag.len())
            .finish()
    }
}

/// Failures reported by an [`EncryptionProvider`]
///
/// Messages must never contain plaintext or key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("encryption key unavailable: {0}")]
    KeyUnavailable(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("invalid encrypted entry: {0}")]
    InvalidEntry(String),
}

impl ErrorClassification for ProviderError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::KeyUnavailable(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::KeyUnavailable(_) => ErrorSeverity::Warning,
            Self::EncryptionFailed(_) => ErrorSeverity::Error,
            Self::DecryptionFailed(_) | Self::InvalidEntry(_) => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::DecryptionFailed(_) | Self::InvalidEntry(_))
    }

    fn retry_after(&self) -> Option<std::time::Duration> {
        None
    }
}

/// Authenticated cipher used by the cache
///
/// Implementations must bind `tenant_id` into the ciphertext so that an entry
/// sealed for one tenant fails to decrypt for another.
#[async_trait]
pub trait EncryptionProvider: Send + Sync {
    /// Encrypt a plaintext for a tenant
    async fn encrypt(
        &self,
        plaintext: &SecureString,
        tenant_id: &str,
    ) -> Result<EncryptedCacheEntry, ProviderError>;

    /// Verify and decrypt an entry for a tenant
    ///
    /// Fails on tag mismatch, tenant mismatch or malformed buffers.
    async fn decrypt(
        &self,
        entry: &EncryptedCacheEntry,
        tenant_id: &str,
    ) -> Result<SecureString, ProviderError>;
}
