//! Shared test helpers for `trustgate-core` integration tests.
//!
//! Provides an AES-GCM backed provider plus a switchable wrapper that can be
//! told to fail, so cache tests can focus on behaviour instead of setup.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use trustgate_common::crypto::EncryptionService;
use trustgate_common::SecureString;
use trustgate_core::{EncryptedCacheEntry, EncryptionProvider, ProviderError};

/// Provider backed by a real AES-256-GCM service keyed per test.
///
/// The tenant id is bound as associated data, so an entry sealed for one
/// tenant fails to open for another.
#[derive(Debug)]
pub struct AesTestProvider {
    service: EncryptionService,
}

impl AesTestProvider {
    pub fn new() -> Self {
        let key = EncryptionService::generate_key();
        Self { service: EncryptionService::new(key.to_vec()).expect("32-byte key") }
    }
}

#[async_trait]
impl EncryptionProvider for AesTestProvider {
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
        let opened = self
            .service
            .open(&entry.encrypted, &entry.iv, &entry.auth_tag, tenant_id.as_bytes())
            .map_err(|e| ProviderError::DecryptionFailed(e.to_string()))?;
        SecureString::from_utf8(opened.to_vec())
            .map_err(|e| ProviderError::InvalidEntry(e.to_string()))
    }
}

/// Wraps [`AesTestProvider`] with failure switches and call counters.
#[derive(Debug)]
pub struct SwitchableProvider {
    inner: AesTestProvider,
    fail_encrypt: AtomicBool,
    fail_decrypt: AtomicBool,
    encrypt_calls: AtomicUsize,
    decrypt_calls: AtomicUsize,
}

impl SwitchableProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: AesTestProvider::new(),
            fail_encrypt: AtomicBool::new(false),
            fail_decrypt: AtomicBool::new(false),
            encrypt_calls: AtomicUsize::new(0),
            decrypt_calls: AtomicUsize::new(0),
        })
    }

    pub fn fail_encrypt(&self, fail: bool) {
        self.fail_encrypt.store(fail, Ordering::SeqCst);
    }

    pub fn fail_decrypt(&self, fail: bool) {
        self.fail_decrypt.store(fail, Ordering::SeqCst);
    }

    pub fn encrypt_calls(&self) -> usize {
        self.encrypt_calls.load(Ordering::SeqCst)
    }

    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EncryptionProvider for SwitchableProvider {
    async fn encrypt(
        &self,
        plaintext: &SecureString,
        tenant_id: &str,
    ) -> Result<EncryptedCacheEntry, ProviderError> {
        self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_encrypt.load(Ordering::SeqCst) {
            return Err(ProviderError::KeyUnavailable("test key withdrawn".into()));
        }
        self.inner.encrypt(plaintext, tenant_id).await
    }

    async fn decrypt(
        &self,
        entry: &EncryptedCacheEntry,
        tenant_id: &str,
    ) -> Result<SecureString, ProviderError> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_decrypt.load(Ordering::SeqCst) {
            return Err(ProviderError::DecryptionFailed("authentication tag mismatch".into()));
        }
        self.inner.decrypt(entry, tenant_id).await
    }
}

/// Shorthand for building a secret from a literal
pub fn secret(value: &str) -> SecureString {
    SecureString::new(value.to_string())
}
