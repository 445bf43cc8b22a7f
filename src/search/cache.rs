//! LRU caching for query embeddings.
//!
//! Repeated queries skip the embedding round-trip. The cache never changes
//! results: a miss, a lock collision, or a disabled cache all fall through
//! to the wrapped embedder.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::error::Result;
use crate::search::embeddings::Embedder;

/// Default cache size for embeddings (number of distinct query texts)
pub const DEFAULT_EMBEDDING_CACHE_SIZE: usize = 1024;

/// Cache statistics for monitoring and tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Calculate hit rate.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Embedder wrapper with a thread-safe LRU in front.
///
/// Cache operations use try-lock and never block a request.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Mutex<LruCache<String, Vec<f32>>>,
    stats: Mutex<CacheStats>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Snapshot of hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().map(|s| *s).unwrap_or_default()
    }

    fn lookup(&self, text: &str) -> Option<Vec<f32>> {
        let mut cache = self.cache.try_lock().ok()?;
        let found = cache.get(text).cloned();
        if let Ok(mut stats) = self.stats.try_lock() {
            if found.is_some() {
                stats.hits += 1;
            } else {
                stats.misses += 1;
            }
        }
        found
    }

    fn store(&self, text: &str, vector: &[f32]) {
        if let Ok(mut cache) = self.cache.try_lock() {
            cache.put(text.to_string(), vector.to_vec());
        }
    }
}

impl<E: Embedder> Embedder for CachedEmbedder<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(hit) = self.lookup(text) {
            return Ok(hit);
        }
        let vector = self.inner.embed(text)?;
        self.store(text, &vector);
        Ok(vector)
    }

    fn dims(&self) -> usize {
        self.inner.dims()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
