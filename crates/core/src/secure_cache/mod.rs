//! Tenant-scoped encrypted in-memory cache
//!
//! Values are encrypted by an injected [`EncryptionProvider`] before they are
//! stored and decrypted on every read. Each cache instance belongs to exactly
//! one tenant; the tenant id is handed to the provider on every call so it can
//! be bound into the ciphertext.
//!
//! Every removal path (overwrite, delete, clear, TTL expiry, failed
//! decryption) wipes the ciphertext, IV and tag in place before the record is
//! dropped, inside the same lock scope that removes it from the index.
//!
//! ```rust,ignore
//! let cache = SecureCache::new(provider, SecureCacheConfig::new("acme", Duration::from_secs(300)))?;
//! cache.set("oauth:refresh", SecureString::new(token)).await?;
//! if let Some(secret) = cache.get("oauth:refresh").await {
//!     client.authenticate(secret.expose()).await?;
//! } // secret zeroized here
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod service;
pub mod stats;

pub use config::SecureCacheConfig;
pub use error::SecureCacheError;
pub use ports::{EncryptedCacheEntry, EncryptionProvider, ProviderError};
pub use service::SecureCache;
pub use stats::SecureCacheStats;
