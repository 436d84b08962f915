//! Response caching keyed on the canonical request.
//!
//! Memoizes full response payloads with TTL expiration and bounded size.
//! Thread-safe using `Mutex`; the cache is the only shared mutable state
//! across concurrent requests, and any internal failure degrades to a miss
//! rather than surfacing to the caller.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::CacheConfig;

/// A cached payload with its store time.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    /// The memoized response payload, immutable once stored.
    payload: T,
    /// When this entry was created.
    stored_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(payload: T) -> Self {
        Self {
            payload,
            stored_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() > ttl
    }
}

/// Thread-safe response cache with TTL expiration and bounded size.
///
/// - **TTL expiration**: entries older than the configured window are
///   treated as a miss even if still physically present, and are lazily
///   dropped on the next access or eviction sweep.
/// - **Bounded size**: when the table exceeds the cap, the oldest entries
///   (by store time) are evicted down to the cap as a side effect of
///   [`set`](Self::set), not a background timer.
///
/// # Example
///
/// ```rust
/// use atlas_engine::{CacheConfig, ResponseCache};
///
/// let cache: ResponseCache<String> = ResponseCache::new(CacheConfig::default());
/// cache.set("country=Germany".to_string(), "payload".to_string());
/// assert_eq!(cache.get("country=Germany"), Some("payload".to_string()));
/// ```
pub struct ResponseCache<T> {
    inner: Mutex<LruCache<String, CacheEntry<T>>>,
    max_entries: usize,
    ttl: Duration,
}

impl<T: Clone> ResponseCache<T> {
    /// Creates a cache from configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_capacity(config.max_entries, config.ttl)
    }

    /// Creates a cache with explicit capacity and TTL.
    pub fn with_capacity(max_entries: usize, ttl: Duration) -> Self {
        Self {
            // Unbounded inner map; the cap is enforced by store-time sweeps
            // in `set`, which evict oldest-first rather than least-recently
            // -used.
            inner: Mutex::new(LruCache::unbounded()),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    /// Gets a cached payload by key.
    ///
    /// Returns `None` when the key is absent, the entry has expired, or the
    /// lock is poisoned. Expired entries are dropped on the way out.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut cache = self.inner.lock().ok()?;
        if let Some(entry) = cache.peek(key) {
            if entry.is_expired(self.ttl) {
                cache.pop(key);
                return None;
            }
            return Some(entry.payload.clone());
        }
        None
    }

    /// Stores a payload, then sweeps expired entries and evicts the oldest
    /// entries (by store time) down to the cap.
    ///
    /// Callers are expected to skip `set` for empty results; the cache does
    /// not inspect payloads.
    pub fn set(&self, key: String, payload: T) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.put(key, CacheEntry::new(payload));
            Self::sweep(&mut cache, self.ttl, self.max_entries);
        }
    }

    /// Drops expired entries, then evicts oldest-first until at most
    /// `max_entries` remain.
    fn sweep(cache: &mut LruCache<String, CacheEntry<T>>, ttl: Duration, max_entries: usize) {
        let expired: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl))
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            cache.pop(&key);
        }

        while cache.len() > max_entries {
            let oldest = cache
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    cache.pop(&key);
                }
                None => break,
            }
        }
    }

    /// Number of entries currently held, expired entries included.
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(cache) => cache.len(),
            _ => 0,
        }
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all entries.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.clear();
        }
    }

    /// Drops expired entries explicitly.
    ///
    /// Normally this happens lazily during `get`/`set`.
    pub fn cleanup_expired(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            Self::sweep(&mut cache, self.ttl, usize::MAX);
        }
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        match self.inner.lock() {
            Ok(cache) => {
                let total = cache.len();
                let expired = cache
                    .iter()
                    .filter(|(_, entry)| entry.is_expired(self.ttl))
                    .count();
                CacheStats {
                    total_entries: total,
                    expired_entries: expired,
                    valid_entries: total.saturating_sub(expired),
                }
            }
            _ => CacheStats::default(),
        }
    }
}

impl<T> std::fmt::Debug for ResponseCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.inner.lock().map(|c| c.len()).unwrap_or(0);
        f.debug_struct("ResponseCache")
            .field("entries", &len)
            .field("max_entries", &self.max_entries)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Statistics about the cache state.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Total number of entries in the cache.
    pub total_entries: usize,
    /// Number of expired entries not yet dropped.
    pub expired_entries: usize,
    /// Number of valid (non-expired) entries.
    pub valid_entries: usize,
}

/// Builds an order-independent cache key from request parameters.
///
/// All parameters are sorted by name (then value), so structurally
/// identical requests produce the same key regardless of the order the
/// parameters arrived in, and distinct filter combinations never collide.
///
/// # Example
///
/// ```rust
/// use atlas_engine::canonical_key;
///
/// let a = canonical_key(vec![
///     ("country".to_string(), "Germany".to_string()),
///     ("limit".to_string(), "10".to_string()),
/// ]);
/// let b = canonical_key(vec![
///     ("limit".to_string(), "10".to_string()),
///     ("country".to_string(), "Germany".to_string()),
/// ]);
/// assert_eq!(a, b);
/// ```
pub fn canonical_key<I>(params: I) -> String
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut pairs: Vec<(String, String)> = params.into_iter().collect();
    pairs.sort();

    let mut key = String::new();
    for (i, (name, value)) in pairs.iter().enumerate() {
        if i > 0 {
            key.push('&');
        }
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}
