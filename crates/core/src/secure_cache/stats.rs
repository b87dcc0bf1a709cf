//! Secure cache statistics
//!
//! Counters are lock-free atomics so reading them never contends with the
//! record lock.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time snapshot of cache counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecureCacheStats {
    /// Records currently held, including expired ones not yet pruned
    pub size: usize,

    /// Reads that returned a decrypted value
    pub hits: u64,

    /// Reads that returned nothing (absent, expired or undecryptable)
    pub misses: u64,

    /// Successful writes
    pub inserts: u64,

    /// Records removed because their TTL elapsed
    pub expirations: u64,

    /// Reads whose entry failed to decrypt
    pub decrypt_failures: u64,

    /// Records wiped for any reason other than expiry
    pub evictions: u64,
}

impl SecureCacheStats {
    /// Calculate hit rate (hits / total reads)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct MetricsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    expirations: AtomicU64,
    decrypt_failures: AtomicU64,
    evictions: AtomicU64,
}

impl MetricsCollector {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expirations(&self, count: u64) {
        self.expirations.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_decrypt_failure(&self) {
        self.decrypt_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evictions(&self, count: u64) {
        self.evictions.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, size: usize) -> SecureCacheStats {
        SecureCacheStats {
            size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            decrypt_failures: self.decrypt_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
