use std::fmt::Display;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::models::MovieId;

/// Key space for cached provider responses, keyed by item id (metadata is
/// treated as static for the process lifetime, so there is no TTL).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Details(MovieId),
    Trailer(MovieId),
    Poster(MovieId),
    Trending(u32),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Details(id) => write!(f, "details:{}", id),
            CacheKey::Trailer(id) => write!(f, "trailer:{}", id),
            CacheKey::Poster(id) => write!(f, "poster:{}", id),
            CacheKey::Trending(page) => write!(f, "trending:{}", page),
        }
    }
}

/// Bounded in-process cache for enrichment responses.
///
/// Values are stored JSON-serialized so one cache serves every response
/// type. Capacity-bounded with LRU eviction; injected into the provider
/// rather than living as ambient global state.
pub struct MetadataCache {
    entries: Mutex<LruCache<String, String>>,
}

impl MetadataCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Retrieves and deserializes a cached value, or `None` on a miss.
    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let mut entries = self.entries.lock();
        let json = entries.get(&key.to_string())?;
        match serde_json::from_str(json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache deserialization error");
                None
            }
        }
    }

    /// Serializes and stores a value, evicting the least recently used entry
    /// when at capacity.
    pub fn insert<T: serde::Serialize>(&self, key: &CacheKey, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache serialization error");
                return;
            }
        };
        self.entries.lock().put(key.to_string(), json);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Checks the cache for a key; on a miss, runs the block, stores the result,
/// and returns it. The block must evaluate to a future of `AppResult<T>`.
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        if let Some(cached) = $cache.get(&$key) {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.insert(&$key, &value);
            Ok(value)
        }
    }};
}
