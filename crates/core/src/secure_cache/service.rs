//! Secure cache service - tenant-scoped encrypted storage with TTL

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, error};
use trustgate_common::time::{Clock, SystemClock};
use trustgate_common::SecureString;

use super::config::SecureCacheConfig;
use super::error::SecureCacheError;
use super::ports::{EncryptedCacheEntry, EncryptionProvider};
use super::stats::{MetricsCollector, SecureCacheStats};

/// A stored entry and the instant it was written
#[derive(Debug)]
pub(crate) struct SecureCacheRecord {
    pub(crate) entry: EncryptedCacheEntry,
    pub(crate) created_at: Instant,
}

type RecordMap = HashMap<String, SecureCacheRecord>;

/// Encrypted in-memory cache for one tenant
///
/// All state lives behind one async mutex. Each operation, including its
/// awaited provider call, runs inside a single lock scope, so a reader can
/// never observe a record between "found expired" and "wiped".
pub struct SecureCache<C: Clock = SystemClock> {
    provider: Arc<dyn EncryptionProvider>,
    tenant_id: String,
    ttl: Duration,
    clock: C,
    records: Mutex<RecordMap>,
    metrics: MetricsCollector,
}

impl SecureCache<SystemClock> {
    /// Create a cache measuring age with the system clock
    ///
    /// # Errors
    ///
    /// Returns `SecureCacheError::Common` when the configuration is invalid.
    pub fn new(
        provider: Arc<dyn EncryptionProvider>,
        config: SecureCacheConfig,
    ) -> Result<Self, SecureCacheError> {
        Self::with_clock(provider, config, SystemClock)
    }
}

impl<C: Clock> SecureCache<C> {
    /// Create a cache with a custom clock (for testing)
    pub fn with_clock(
        provider: Arc<dyn EncryptionProvider>,
        config: SecureCacheConfig,
        clock: C,
    ) -> Result<Self, SecureCacheError> {
        config.validate()?;
        Ok(Self {
            provider,
            tenant_id: config.tenant_id,
            ttl: config.default_ttl,
            clock,
            records: Mutex::new(HashMap::new()),
            metrics: MetricsCollector::default(),
        })
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Encrypt and store `value` under `key`
    ///
    /// Any existing record for `key` is wiped first. On provider failure
    /// nothing is stored and the previous value is gone.
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: SecureString,
    ) -> Result<(), SecureCacheError> {
        let key = key.into();
        let mut records = self.records.lock().await;

        if remove_wiped(&mut records, &key).is_some() {
            self.metrics.record_evictions(1);
        }

        let entry = match self.provider.encrypt(&value, &self.tenant_id).await {
            Ok(entry) => entry,
            Err(source) => {
                error!(
                    key = %key,
                    tenant_id = %self.tenant_id,
                    error = %source,
                    "Failed to encrypt secure cache entry"
                );
                return Err(SecureCacheError::Encryption {
                    key,
                    tenant_id: self.tenant_id.clone(),
                    source,
                });
            }
        };
        drop(value);

        records.insert(key, SecureCacheRecord { entry, created_at: self.clock.now() });
        self.metrics.record_insert();
        Ok(())
    }

    /// Decrypt and return the value under `key`
    ///
    /// Returns `None` when the key is absent, when the record has outlived the
    /// TTL (it is wiped without being decrypted), or when decryption fails (the
    /// record is wiped and the failure logged).
    pub async fn get(&self, key: &str) -> Option<SecureString> {
        let mut records = self.records.lock().await;
        let now = self.clock.now();

        let expired = match records.get(key) {
            Some(record) => self.is_expired(record, now),
            None => {
                self.metrics.record_miss();
                return None;
            }
        };

        if expired {
            remove_wiped(&mut records, key);
            self.metrics.record_expirations(1);
            self.metrics.record_miss();
            debug!(key = %key, tenant_id = %self.tenant_id, "Secure cache entry expired");
            return None;
        }

        let record = records.get(key)?;
        match self.provider.decrypt(&record.entry, &self.tenant_id).await {
            Ok(value) => {
                self.metrics.record_hit();
                Some(value)
            }
            Err(err) => {
                error!(
                    key = %key,
                    tenant_id = %self.tenant_id,
                    error = %err,
                    "Failed to decrypt secure cache entry, evicting"
                );
                remove_wiped(&mut records, key);
                self.metrics.record_decrypt_failure();
                self.metrics.record_evictions(1);
                self.metrics.record_miss();
                None
            }
        }
    }

    /// Wipe and remove the record under `key`, reporting whether one existed
    pub async fn delete(&self, key: &str) -> bool {
        let mut records = self.records.lock().await;
        let removed = remove_wiped(&mut records, key).is_some();
        if removed {
            self.metrics.record_evictions(1);
        }
        removed
    }

    /// Wipe and remove every record
    pub async fn clear(&self) {
        let mut records = self.records.lock().await;
        let count = records.len();
        for (_, mut record) in records.drain() {
            record.entry.wipe();
        }
        self.metrics.record_evictions(count as u64);
        if count > 0 {
            debug!(tenant_id = %self.tenant_id, count, "Cleared secure cache");
        }
    }

    /// Wipe and remove every expired record, returning how many were removed
    pub async fn prune_expired(&self) -> usize {
        let mut records = self.records.lock().await;
        let now = self.clock.now();

        let expired: Vec<String> = records
            .iter()
            .filter(|(_, record)| self.is_expired(record, now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            remove_wiped(&mut records, key);
        }

        let count = expired.len();
        if count > 0 {
            self.metrics.record_expirations(count as u64);
            debug!(tenant_id = %self.tenant_id, count, "Pruned expired secure cache entries");
        }
        count
    }

    /// Number of records held, including expired ones not yet pruned
    pub async fn size(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether a record exists for `key`, without decrypting or expiring it
    pub async fn contains_key(&self, key: &str) -> bool {
        self.records.lock().await.contains_key(key)
    }

    /// Snapshot of cache counters
    pub async fn stats(&self) -> SecureCacheStats {
        let size = self.size().await;
        self.metrics.snapshot(size)
    }

    fn is_expired(&self, record: &SecureCacheRecord, now: Instant) -> bool {
        now.saturating_duration_since(record.created_at) > self.ttl
    }
}

impl<C: Clock> std::fmt::Debug for SecureCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureCache")
            .field("tenant_id", &self.tenant_id)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Remove `key` and wipe its buffers before handing the record back
pub(crate) fn remove_wiped(records: &mut RecordMap, key: &str) -> Option<SecureCacheRecord> {
    records.remove(key).map(|mut record| {
        record.entry.wipe();
        record
    })
}

#[cfg(test)]
mod tests {
    //! Unit tests for the secure cache service
    //!
    //! Uses a reversible XOR provider that binds the tenant id into the tag,
    //! so tenant mismatches and tampering are detectable without real crypto.

    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use trustgate_common::testing::LogCapture;
    use trustgate_common::time::MockClock;

    use super::*;
    use crate::secure_cache::ports::ProviderError;

    #[derive(Default)]
    struct XorProvider {
        fail_decrypt: AtomicBool,
        fail_encrypt: AtomicBool,
    }

    fn tag_for(data: &[u8], tenant_id: &str) -> Vec<u8> {
        let sum = data.iter().chain(tenant_id.as_bytes()).fold(0u8, |acc, b| acc.wrapping_add(*b));
        vec![sum, 0xA5]
    }

    #[async_trait]
    impl EncryptionProvider for XorProvider {
        async fn encrypt(
            &self,
            plaintext: &SecureString,
            tenant_id: &str,
        ) -> Result<EncryptedCacheEntry, ProviderError> {
            if self.fail_encrypt.load(Ordering::SeqCst) {
                return Err(ProviderError::KeyUnavailable("key store offline".into()));
            }
            let encrypted: Vec<u8> = plaintext.expose_bytes().iter().map(|b| b ^ 0x5A).collect();
            let tag = tag_for(&encrypted, tenant_id);
            Ok(EncryptedCacheEntry::new(encrypted, vec![1, 2, 3], tag))
        }

        async fn decrypt(
            &self,
            entry: &EncryptedCacheEntry,
            tenant_id: &str,
        ) -> Result<SecureString, ProviderError> {
            if self.fail_decrypt.load(Ordering::SeqCst) || entry.auth_tag != tag_for(&entry.encrypted, tenant_id) {
                return Err(ProviderError::DecryptionFailed("tag mismatch".into()));
            }
            let plain: Vec<u8> = entry.encrypted.iter().map(|b| b ^ 0x5A).collect();
            SecureString::from_utf8(plain).map_err(|e| ProviderError::InvalidEntry(e.to_string()))
        }
    }

    fn cache_with_clock(ttl: Duration) -> (Arc<XorProvider>, MockClock, SecureCache<MockClock>) {
        let provider = Arc::new(XorProvider::default());
        let clock = MockClock::new();
        let cache = SecureCache::with_clock(
            provider.clone(),
            SecureCacheConfig::new("tenant-a", ttl),
            clock.clone(),
        )
        .expect("valid config");
        (provider, clock, cache)
    }

    fn secret(value: &str) -> SecureString {
        SecureString::new(value.to_string())
    }

    /// Validates `remove_wiped` zeroes the removed entry before returning it.
    #[test]
    fn test_remove_wiped_zeroes_entry() {
        let mut records = RecordMap::new();
        records.insert(
            "k".into(),
            SecureCacheRecord {
                entry: EncryptedCacheEntry::new(vec![9; 8], vec![8; 12], vec![7; 16]),
                created_at: Instant::now(),
            },
        );

        let removed = remove_wiped(&mut records, "k").expect("record present");
        assert!(removed.entry.is_wiped());
        assert_eq!(removed.entry.encrypted.len(), 8);
        assert!(records.is_empty());
        assert!(remove_wiped(&mut records, "k").is_none());
    }

    /// Validates a value round-trips through encryption.
    #[tokio::test]
    async fn test_set_then_get() {
        let (_, _, cache) = cache_with_clock(Duration::from_secs(60));
        cache.set("token", secret("abc123")).await.expect("set succeeds");

        let value = cache.get("token").await.expect("hit");
        assert_eq!(value.expose(), "abc123");
        assert_eq!(cache.size().await, 1);

        let records = cache.records.lock().await;
        assert_ne!(records["token"].entry.encrypted, b"abc123".to_vec());
    }

    /// Validates absent keys miss.
    #[tokio::test]
    async fn test_get_absent() {
        let (_, _, cache) = cache_with_clock(Duration::from_secs(60));
        assert!(cache.get("missing").await.is_none());
        assert_eq!(cache.stats().await.misses, 1);
    }

    /// Validates expiry is strictly after the TTL and removes the record.
    #[tokio::test]
    async fn test_ttl_boundary() {
        let (_, clock, cache) = cache_with_clock(Duration::from_millis(1000));
        cache.set("token", secret("v")).await.expect("set succeeds");

        clock.advance_millis(1000);
        assert!(cache.get("token").await.is_some(), "age == ttl is still fresh");

        clock.advance_millis(1);
        assert!(cache.get("token").await.is_none());
        assert_eq!(cache.size().await, 0);
        assert_eq!(cache.stats().await.expirations, 1);
    }

    /// Validates expired records are never handed to the provider.
    #[tokio::test]
    async fn test_expired_entry_not_decrypted() {
        let (provider, clock, cache) = cache_with_clock(Duration::from_millis(10));
        cache.set("token", secret("v")).await.expect("set succeeds");
        provider.fail_decrypt.store(true, Ordering::SeqCst);
        clock.advance_millis(11);

        assert!(cache.get("token").await.is_none());
        let stats = cache.stats().await;
        assert_eq!(stats.decrypt_failures, 0);
        assert_eq!(stats.expirations, 1);
    }

    /// Validates decrypt failure evicts the record and logs without the
    /// plaintext.
    #[tokio::test(flavor = "current_thread")]
    async fn test_decrypt_failure_evicts_and_logs() {
        let capture = LogCapture::new();
        let _guard = capture.set_default();

        let (provider, _, cache) = cache_with_clock(Duration::from_secs(60));
        cache.set("session", secret("do-not-log-me")).await.expect("set succeeds");
        provider.fail_decrypt.store(true, Ordering::SeqCst);

        assert!(cache.get("session").await.is_none());
        assert_eq!(cache.size().await, 0);

        let lines = capture.lines_containing("Failed to decrypt secure cache entry");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("key=session"));
        assert!(lines[0].contains("tenant_id=tenant-a"));
        assert!(lines[0].contains("tag mismatch"));
        assert!(!capture.contains("do-not-log-me"));

        let stats = cache.stats().await;
        assert_eq!(stats.decrypt_failures, 1);
        assert_eq!(stats.evictions, 1);
    }

    /// Validates encryption failure stores nothing and drops the old value.
    #[tokio::test]
    async fn test_encrypt_failure_stores_nothing() {
        let (provider, _, cache) = cache_with_clock(Duration::from_secs(60));
        cache.set("token", secret("old")).await.expect("set succeeds");
        provider.fail_encrypt.store(true, Ordering::SeqCst);

        let err = cache.set("token", secret("new")).await.unwrap_err();
        assert!(matches!(err, SecureCacheError::Encryption { .. }));
        assert!(!cache.contains_key("token").await);
    }

    /// Validates overwrite replaces the value and resets its age.
    #[tokio::test]
    async fn test_overwrite_resets_age() {
        let (_, clock, cache) = cache_with_clock(Duration::from_millis(100));
        cache.set("token", secret("one")).await.expect("set succeeds");
        clock.advance_millis(80);
        cache.set("token", secret("two")).await.expect("set succeeds");
        clock.advance_millis(80);

        assert_eq!(cache.get("token").await.map(|s| s.expose().to_string()), Some("two".into()));
        assert_eq!(cache.size().await, 1);
        assert_eq!(cache.stats().await.evictions, 1);
    }

    /// Validates delete reports whether a record existed.
    #[tokio::test]
    async fn test_delete() {
        let (_, _, cache) = cache_with_clock(Duration::from_secs(60));
        cache.set("token", secret("v")).await.expect("set succeeds");
        assert!(cache.delete("token").await);
        assert!(!cache.delete("token").await);
        assert!(cache.get("token").await.is_none());
    }

    /// Validates clear removes everything.
    #[tokio::test]
    async fn test_clear() {
        let (_, _, cache) = cache_with_clock(Duration::from_secs(60));
        for key in ["a", "b", "c"] {
            cache.set(key, secret(key)).await.expect("set succeeds");
        }
        cache.clear().await;
        assert_eq!(cache.size().await, 0);
        assert_eq!(cache.stats().await.evictions, 3);
    }

    /// Validates prune removes only expired records.
    #[tokio::test]
    async fn test_prune_expired() {
        let (_, clock, cache) = cache_with_clock(Duration::from_millis(100));
        cache.set("old-1", secret("x")).await.expect("set succeeds");
        cache.set("old-2", secret("y")).await.expect("set succeeds");
        clock.advance_millis(60);
        cache.set("fresh", secret("z")).await.expect("set succeeds");
        clock.advance_millis(60);

        assert_eq!(cache.size().await, 3, "size counts unpruned expired records");
        assert_eq!(cache.prune_expired().await, 2);
        assert_eq!(cache.size().await, 1);
        assert!(cache.contains_key("fresh").await);
        assert_eq!(cache.prune_expired().await, 0);
    }

    /// Validates an invalid configuration is rejected at construction.
    #[test]
    fn test_new_rejects_invalid_config() {
        let result = SecureCache::new(
            Arc::new(XorProvider::default()),
            SecureCacheConfig::new("", Duration::from_secs(1)),
        );
        assert!(matches!(result, Err(SecureCacheError::Common(_))));
    }
}
