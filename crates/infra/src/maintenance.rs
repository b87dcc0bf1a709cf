//! Background maintenance for secure caches

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use trustgate_common::time::Clock;
use trustgate_core::SecureCache;

/// Spawn a task that prunes expired entries every `interval`
///
/// Reads already treat expired entries as absent; pruning only bounds how
/// long their ciphertext stays in memory. The task runs until the returned
/// handle is aborted.
pub fn spawn_pruner<C: Clock>(cache: Arc<SecureCache<C>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let pruned = cache.prune_expired().await;
            if pruned > 0 {
                tracing::debug!(
                    tenant_id = %cache.tenant_id(),
                    pruned,
                    "Pruned expired secure cache entries"
                );
            }
        }
    })
}
