//! # Trustgate Core
//!
//! Business logic for holding sensitive values behind the trust boundary.
//!
//! This crate contains:
//! - The tenant-scoped [`SecureCache`] service
//! - Port interfaces (traits) for the cipher it depends on
//!
//! ## Architecture Principles
//! - Only depends on `trustgate-common`
//! - No key storage, configuration files or platform code
//! - The cipher is injected through [`EncryptionProvider`]

pub mod secure_cache;

pub use secure_cache::{
    EncryptedCacheEntry, EncryptionProvider, ProviderError, SecureCache, SecureCacheConfig,
    SecureCacheError, SecureCacheStats,
};
