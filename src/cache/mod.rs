//! Caching module for RagMix
//!
//! Memoizes knowledge-base text searches. Entries carry their own TTL and
//! expire passively (checked on read); there is no sweeper thread. The cache
//! is best-effort: serialization problems degrade to a miss and are never
//! surfaced to the caller.

use crate::results::SearchResult;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use tracing::warn;

/// A cached payload with its own time-to-live
#[derive(Clone)]
struct CachedEntry {
    payload: Vec<u8>,
    ttl: Duration,
}

/// Per-entry TTL policy
struct PerEntryExpiry;

impl Expiry<String, CachedEntry> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Cache for knowledge-base text search results
pub struct SearchCache {
    cache: Cache<String, CachedEntry>,
    default_ttl: Duration,
}

impl SearchCache {
    /// Create a new cache with a default TTL and capacity bound
    pub fn new(default_ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .build();

        Self {
            cache,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }

    /// Get a cached value if present and not expired
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.cache.get(key).await.map(|entry| entry.payload)
    }

    /// Store a value under the default TTL, overwriting unconditionally
    pub async fn put(&self, key: String, value: Vec<u8>) {
        self.put_with_ttl(key, value, self.default_ttl).await;
    }

    /// Store a value with an explicit TTL
    pub async fn put_with_ttl(&self, key: String, value: Vec<u8>, ttl: Duration) {
        self.cache
            .insert(
                key,
                CachedEntry {
                    payload: value,
                    ttl,
                },
            )
            .await;
    }

    /// Get a cached result list; a decode failure counts as a miss
    pub async fn get_results(&self, key: &str) -> Option<Vec<SearchResult>> {
        let bytes = self.get(key).await?;
        match serde_json::from_slice(&bytes) {
            Ok(results) => Some(results),
            Err(e) => {
                warn!("Discarding undecodable cache entry: {}", e);
                None
            }
        }
    }

    /// Store a result list; an encode failure skips the put
    pub async fn put_results(&self, key: String, results: &[SearchResult]) {
        match serde_json::to_vec(results) {
            Ok(bytes) => self.put(key, bytes).await,
            Err(e) => warn!("Skipping cache write, serialization failed: {}", e),
        }
    }

    /// Remove a cached entry
    pub async fn remove(&self, key: &str) {
        self.cache.remove(key).await;
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Number of live entries
    pub fn size(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(300, 10_000) // 5 minutes TTL, 10k max entries
    }
}

/// Cache key for a knowledge-base text search
pub fn text_search_key(collection: &str, query: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(b"search:");
    hasher.update(collection.as_bytes());
    hasher.update(b":");
    hasher.update(query.as_bytes());

    format!("{:x}", hasher.finalize())
}
