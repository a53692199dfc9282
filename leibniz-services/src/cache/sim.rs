//! `SimCache` - In-Process TTL Key-Value Store
//!
//! `TigerStyle`: Lazy expiry, one lock per store, injectable clock.
//!
//! Every read and write happens under a single async mutex, so the
//! read-check-evict sequence in `get` is atomic with respect to other callers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use leibniz_core::dst::SimClock;
use tokio::sync::Mutex;

use super::CacheClient;
use crate::error::ClientResult;

/// Where the store reads "now" from.
#[derive(Debug, Clone, Default)]
enum TimeSource {
    #[default]
    System,
    Sim(SimClock),
}

impl TimeSource {
    fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Sim(clock) => clock.now(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// In-memory cache simulating an expiring key-value server.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct SimCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    time: TimeSource,
}

impl SimCache {
    /// Create an empty cache on wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache that reads time from a simulated clock.
    ///
    /// # Example
    ///
    /// ```rust
    /// use leibniz_core::dst::SimClock;
    /// use leibniz_services::cache::{CacheClient, SimCache};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let clock = SimClock::new();
    ///     let cache = SimCache::with_clock(clock.clone());
    ///
    ///     cache.setex("k", 10, "v").await.unwrap();
    ///     clock.advance_secs(10);
    ///     assert!(cache.get("k").await.unwrap().is_none());
    /// }
    /// ```
    #[must_use]
    pub fn with_clock(clock: SimClock) -> Self {
        Self {
            entries: Arc::default(),
            time: TimeSource::Sim(clock),
        }
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Check if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    fn expiry_after(now: DateTime<Utc>, ttl_secs: u64) -> Option<DateTime<Utc>> {
        // A TTL too large to represent never expires.
        i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
    }
}

#[async_trait]
impl CacheClient for SimCache {
    #[tracing::instrument(level = "trace", skip(self))]
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        let now = self.time.now();

        match entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
        }

        entries.remove(key);
        tracing::trace!(key, "evicted expired entry");

        // Postcondition: an expired key is gone after the read
        debug_assert!(!entries.contains_key(key), "expired entry must be evicted");
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str) -> ClientResult<bool> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(true)
    }

    #[tracing::instrument(level = "trace", skip(self, value))]
    async fn setex(&self, key: &str, ttl_secs: u64, value: &str) -> ClientResult<bool> {
        let mut entries = self.entries.lock().await;
        let now = self.time.now();

        let expires_at = Self::expiry_after(now, ttl_secs);
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );

        Ok(true)
    }

    async fn delete(&self, key: &str) -> ClientResult<u64> {
        let mut entries = self.entries.lock().await;
        Ok(u64::from(entries.remove(key).is_some()))
    }

    async fn ping(&self) -> ClientResult<bool> {
        Ok(true)
    }

    fn pipeline(&self) -> &dyn CacheClient {
        self
    }

    async fn execute(&self) -> ClientResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "sim-cache"
    }

    fn is_simulation(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setex_then_get() {
        let cache = SimCache::new();

        assert!(cache.setex("test_key", 3600, "test_value").await.unwrap());
        assert_eq!(
            cache.get("test_key").await.unwrap().as_deref(),
            Some("test_value")
        );
    }

    #[tokio::test]
    async fn test_zero_ttl_is_immediately_expired() {
        let cache = SimCache::new();

        cache.setex("expire_key", 0, "value").await.unwrap();
        assert!(cache.get("expire_key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_on_frozen_clock() {
        let cache = SimCache::with_clock(SimClock::at_ms(1_000));

        cache.setex("k", 0, "v").await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let clock = SimClock::new();
        let cache = SimCache::with_clock(clock.clone());

        cache.setex("k", 5, "v").await.unwrap();

        clock.advance_ms(4_999);
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        clock.advance_ms(1);
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_read_evicts() {
        let clock = SimClock::new();
        let cache = SimCache::with_clock(clock.clone());

        cache.setex("a", 1, "1").await.unwrap();
        cache.setex("b", 100, "2").await.unwrap();
        clock.advance_secs(2);

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("a").await.unwrap().is_none());
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_set_never_expires() {
        let clock = SimClock::new();
        let cache = SimCache::with_clock(clock.clone());

        cache.set("k", "v").await.unwrap();
        clock.advance_secs(86_400);

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_setex_overwrites_and_resets_ttl() {
        let clock = SimClock::new();
        let cache = SimCache::with_clock(clock.clone());

        cache.setex("k", 1, "old").await.unwrap();
        cache.setex("k", 60, "new").await.unwrap();
        clock.advance_secs(30);

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_huge_ttl_does_not_overflow() {
        let cache = SimCache::new();

        cache.setex("k", u64::MAX, "v").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_delete_counts() {
        let cache = SimCache::new();

        assert_eq!(cache.delete("missing").await.unwrap(), 0);

        cache.setex("k", 60, "v").await.unwrap();
        assert_eq!(cache.delete("k").await.unwrap(), 1);
        assert!(cache.get("k").await.unwrap().is_none());
        assert_eq!(cache.delete("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ping_and_pipeline() {
        let cache = SimCache::new();

        assert!(cache.ping().await.unwrap());

        let pipe = cache.pipeline();
        pipe.setex("k", 60, "v").await.unwrap();
        assert!(pipe.execute().await.unwrap().is_empty());

        // Queued commands already ran against the store.
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let cache = SimCache::new();
        let other = cache.clone();

        cache.setex("k", 60, "v").await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        let cache = SimCache::new();

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .setex(&format!("key-{i}"), 60, &i.to_string())
                        .await
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.len().await, 32);
        assert_eq!(cache.get("key-7").await.unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn test_name_and_simulation_flag() {
        let cache = SimCache::new();
        assert_eq!(cache.name(), "sim-cache");
        assert!(cache.is_simulation());
    }
}
