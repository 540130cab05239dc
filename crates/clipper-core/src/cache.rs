//! Time-bounded memoization of formatted extraction results.
//!
//! Entries are keyed by (URL, format) and live for a fixed TTL, measured
//! on a monotonic clock. Expired entries are dropped lazily on access
//! and proactively by a background sweep task.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// TTL cache of fully formatted extraction payloads.
///
/// Safe for concurrent use from arbitrarily many tasks; an entry is
/// never returned after its TTL has elapsed. Writes happen only after a
/// fully successful pipeline run, so failed requests never populate it.
pub struct ResponseCache {
    entries: moka::future::Cache<String, String>,
    sweeper_stop: CancellationToken,
}

impl ResponseCache {
    /// Build the cache and start its sweep task.
    ///
    /// Must be called within a Tokio runtime; the sweeper stops when the
    /// cache is dropped.
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        let entries: moka::future::Cache<String, String> =
            moka::future::Cache::builder().time_to_live(ttl).build();

        let sweeper_stop = CancellationToken::new();
        let sweep_cache = entries.clone();
        let stop = sweeper_stop.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(sweep_interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            tick.tick().await; // the first tick completes immediately
            loop {
                tokio::select! {
                    () = stop.cancelled() => break,
                    _ = tick.tick() => sweep_cache.run_pending_tasks().await,
                }
            }
        });

        Self {
            entries,
            sweeper_stop,
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).await
    }

    pub async fn insert(&self, key: String, payload: String) {
        self.entries.insert(key, payload).await;
    }

    /// Number of live entries, after settling pending housekeeping.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

impl Drop for ResponseCache {
    fn drop(&mut self) {
        self.sweeper_stop.cancel();
    }
}
