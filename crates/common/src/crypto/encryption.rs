//! AES-256-GCM authenticated encryption with detached tags.
//!
//! [`EncryptionService`] seals a plaintext under a fresh random 96-bit nonce
//! and returns the ciphertext, nonce and 128-bit tag as separate buffers, so
//! callers can store them in whatever layout they need. Associated data
//! (typically a tenant id) is authenticated but not encrypted: opening with
//! different associated data fails.
//!
//! ## Usage
//!
//! ```rust
//! use trustgate_common::crypto::EncryptionService;
//!
//! let key = EncryptionService::generate_key();
//! let service = EncryptionService::new(key.to_vec())?;
//!
//! let sealed = service.seal(b"sensitive data", b"tenant-a")?;
//! let opened = service.open(&sealed.ciphertext, &sealed.nonce, &sealed.tag, b"tenant-a")?;
//! assert_eq!(opened.as_slice(), b"sensitive data");
//! assert!(service.open(&sealed.ciphertext, &sealed.nonce, &sealed.tag, b"tenant-b").is_err());
//! # Ok::<(), trustgate_common::error::CommonError>(())
//! ```

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{CommonError, CommonResult};

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;
/// GCM nonce length in bytes
pub const NONCE_LEN: usize = 12;
/// GCM authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// Output of [`EncryptionService::seal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub tag: Vec<u8>,
}

/// AES-256-GCM encryption service.
pub struct EncryptionService {
    key: Zeroizing<Vec<u8>>,
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for EncryptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionService")
            .field("key", &"[REDACTED]")
            .field("fingerprint", &self.key_fingerprint())
            .finish()
    }
}

impl EncryptionService {
    /// Create a new encryption service from a raw 32-byte key.
    ///
    /// The key buffer is wiped when the service is dropped.
    pub fn new(key: Vec<u8>) -> CommonResult<Self> {
        let key = Zeroizing::new(key);
        if key.len() != KEY_LEN {
            return Err(CommonError::crypto(
                "init",
                format!("encryption key must be exactly {KEY_LEN} bytes, got {}", key.len()),
            ));
        }

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CommonError::crypto("init", format!("failed to create cipher: {e}")))?;

        Ok(Self { key, cipher })
    }

    /// Generate a random 32-byte symmetric key.
    pub fn generate_key() -> Zeroizing<Vec<u8>> {
        let mut key = Zeroizing::new(vec![0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Encrypt `plaintext`, binding `aad` as associated data.
    pub fn seal(&self, plaintext: &[u8], aad: &[u8]) -> CommonResult<SealedPayload> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        // Holds plaintext until encryption succeeds; wiped on the error path.
        let mut buffer = Zeroizing::new(plaintext.to_vec());
        let tag = self
            .cipher
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), aad, buffer.as_mut_slice())
            .map_err(|_| CommonError::crypto("encrypt", "AES-GCM encryption failed"))?;

        let ciphertext = std::mem::take(&mut *buffer);
        Ok(SealedPayload { ciphertext, nonce: nonce.to_vec(), tag: tag.to_vec() })
    }

    /// Verify and decrypt a payload produced by [`Self::seal`].
    ///
    /// Fails when the tag does not verify, which covers tampering, a different
    /// key and different associated data alike.
    pub fn open(
        &self,
        ciphertext: &[u8],
        nonce: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> CommonResult<Zeroizing<Vec<u8>>> {
        if nonce.len() != NONCE_LEN {
            return Err(CommonError::crypto(
                "decrypt",
                format!("nonce must be {NONCE_LEN} bytes, got {}", nonce.len()),
            ));
        }
        if tag.len() != TAG_LEN {
            return Err(CommonError::crypto(
                "decrypt",
                format!("tag must be {TAG_LEN} bytes, got {}", tag.len()),
            ));
        }

        let mut buffer = Zeroizing::new(ciphertext.to_vec());
        self.cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(nonce),
                aad,
                buffer.as_mut_slice(),
                Tag::from_slice(tag),
            )
            .map_err(|_| CommonError::crypto("decrypt", "authentication tag mismatch"))?;

        Ok(buffer)
    }

    /// Short, non-reversible fingerprint of the key, safe to log.
    pub fn key_fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.key.as_slice());
        let result = hasher.finalize();
        BASE64.encode(&result[..8])
    }
}
