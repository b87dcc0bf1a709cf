//! Integration tests for the secure cache
//!
//! Exercises `SecureCache` end to end against a real AES-GCM provider, with
//! a mock clock driving expiry.

mod support;

use std::sync::Arc;
use std::time::Duration;

use support::{secret, AesTestProvider, SwitchableProvider};
use trustgate_common::testing::LogCapture;
use trustgate_common::time::MockClock;
use trustgate_core::{EncryptionProvider, SecureCache, SecureCacheConfig, SecureCacheError};

const TTL: Duration = Duration::from_secs(300);

fn cache_for(
    provider: Arc<dyn EncryptionProvider>,
    tenant: &str,
) -> (MockClock, SecureCache<MockClock>) {
    let clock = MockClock::new();
    let cache = SecureCache::with_clock(provider, SecureCacheConfig::new(tenant, TTL), clock.clone())
        .expect("valid config");
    (clock, cache)
}

/// Validates stored values decrypt back to the original.
#[tokio::test]
async fn test_round_trip_through_aes() {
    let (_, cache) = cache_for(Arc::new(AesTestProvider::new()), "acme");

    cache.set("oauth:refresh", secret("rt-0123456789")).await.unwrap();
    cache.set("unicode", secret("pässwörd ✓")).await.unwrap();

    assert_eq!(cache.get("oauth:refresh").await.unwrap().expose(), "rt-0123456789");
    assert_eq!(cache.get("unicode").await.unwrap().expose(), "pässwörd ✓");
    assert_eq!(cache.size().await, 2);

    let stats = cache.stats().await;
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.inserts, 2);
}

/// Validates every read decrypts again rather than reusing plaintext.
#[tokio::test]
async fn test_each_get_decrypts() {
    let provider = SwitchableProvider::new();
    let (_, cache) = cache_for(provider.clone(), "acme");

    cache.set("k", secret("v")).await.unwrap();
    for _ in 0..3 {
        assert!(cache.get("k").await.is_some());
    }
    assert_eq!(provider.encrypt_calls(), 1);
    assert_eq!(provider.decrypt_calls(), 3);
}

/// Validates entries expire only once their age exceeds the TTL.
#[tokio::test]
async fn test_ttl_expiry_with_mock_clock() {
    let (clock, cache) = cache_for(Arc::new(AesTestProvider::new()), "acme");
    cache.set("session", secret("s")).await.unwrap();

    clock.advance(TTL);
    assert!(cache.get("session").await.is_some());

    clock.advance_millis(1);
    assert!(cache.get("session").await.is_none());
    assert!(!cache.contains_key("session").await);
}

/// Validates size counts expired records until they are pruned or read.
#[tokio::test]
async fn test_prune_expired_reports_count() {
    let (clock, cache) = cache_for(Arc::new(AesTestProvider::new()), "acme");
    for key in ["a", "b", "c"] {
        cache.set(key, secret(key)).await.unwrap();
    }
    clock.advance(TTL / 2);
    cache.set("d", secret("d")).await.unwrap();
    clock.advance(TTL / 2 + Duration::from_millis(1));

    assert_eq!(cache.size().await, 4);
    assert_eq!(cache.prune_expired().await, 3);
    assert_eq!(cache.size().await, 1);
    assert_eq!(cache.get("d").await.unwrap().expose(), "d");

    let stats = cache.stats().await;
    assert_eq!(stats.expirations, 3);
    assert_eq!(stats.size, 1);
}

/// Validates a decryption failure is a logged miss that evicts the record.
#[tokio::test(flavor = "current_thread")]
async fn test_decrypt_failure_is_logged_miss() {
    let capture = LogCapture::new();
    let _guard = capture.set_default();

    let provider = SwitchableProvider::new();
    let (_, cache) = cache_for(provider.clone(), "acme");
    cache.set("api-key", secret("sk-live-secret")).await.unwrap();

    provider.fail_decrypt(true);
    assert!(cache.get("api-key").await.is_none());
    assert_eq!(cache.size().await, 0);

    let lines = capture.lines_containing("Failed to decrypt secure cache entry");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("ERROR"));
    assert!(lines[0].contains("api-key"));
    assert!(!capture.contains("sk-live-secret"));

    // Later reads miss without touching the provider.
    provider.fail_decrypt(false);
    assert!(cache.get("api-key").await.is_none());
    assert_eq!(provider.decrypt_calls(), 1);
}

/// Validates encryption failures propagate and leave no record behind.
#[tokio::test]
async fn test_encrypt_failure_propagates() {
    let provider = SwitchableProvider::new();
    let (_, cache) = cache_for(provider.clone(), "acme");
    provider.fail_encrypt(true);

    let err = cache.set("token", secret("t")).await.unwrap_err();
    match &err {
        SecureCacheError::Encryption { key, tenant_id, .. } => {
            assert_eq!(key, "token");
            assert_eq!(tenant_id, "acme");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("test key withdrawn"));
    assert_eq!(cache.size().await, 0);
}

/// Validates overwrite, delete and clear.
#[tokio::test]
async fn test_overwrite_delete_clear() {
    let (_, cache) = cache_for(Arc::new(AesTestProvider::new()), "acme");

    cache.set("k", secret("first")).await.unwrap();
    cache.set("k", secret("second")).await.unwrap();
    assert_eq!(cache.get("k").await.unwrap().expose(), "second");
    assert_eq!(cache.size().await, 1);

    assert!(cache.delete("k").await);
    assert!(!cache.delete("k").await);

    cache.set("x", secret("1")).await.unwrap();
    cache.set("y", secret("2")).await.unwrap();
    cache.clear().await;
    assert_eq!(cache.size().await, 0);
    assert!(cache.get("x").await.is_none());
}

/// Validates ciphertext sealed for one tenant does not open for another.
#[tokio::test]
async fn test_tenant_binding() {
    let provider = Arc::new(AesTestProvider::new());
    let entry = provider.encrypt(&secret("shared"), "tenant-a").await.unwrap();

    assert!(provider.decrypt(&entry, "tenant-b").await.is_err());
    assert_eq!(provider.decrypt(&entry, "tenant-a").await.unwrap().expose(), "shared");
}

/// Validates concurrent writers and readers keep the index consistent.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_access() {
    let provider: Arc<dyn EncryptionProvider> = Arc::new(AesTestProvider::new());
    let cache = Arc::new(
        SecureCache::new(provider, SecureCacheConfig::new("acme", TTL)).expect("valid config"),
    );

    let mut handles = Vec::new();
    for i in 0..32 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            let key = format!("key-{}", i % 8);
            cache.set(key.clone(), secret(&format!("value-{i}"))).await.unwrap();
            cache.get(&key).await.map(|v| v.expose().starts_with("value-"))
        }));
    }

    for handle in handles {
        if let Some(ok) = handle.await.unwrap() {
            assert!(ok);
        }
    }
    assert_eq!(cache.size().await, 8);
}

/// Validates configuration loaded from TOML builds a cache.
#[test]
fn test_config_from_toml() -> anyhow::Result<()> {
    let config: SecureCacheConfig = toml::from_str(
        r#"
        tenant_id = "acme"
        default_ttl = 60000
        "#,
    )?;
    assert_eq!(config.default_ttl, Duration::from_secs(60));

    let cache = SecureCache::new(Arc::new(AesTestProvider::new()), config)?;
    assert_eq!(cache.tenant_id(), "acme");
    assert_eq!(cache.ttl(), Duration::from_secs(60));
    Ok(())
}
