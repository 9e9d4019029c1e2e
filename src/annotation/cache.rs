use super::MessageId;
use ahash::RandomState;
use lru::LruCache;
use std::hash::{BuildHasher, Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

/// Default number of messages remembered across all shards
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

const SHARD_COUNT: usize = 16;

/// Last annotation written per message
///
/// Lock-striped: each message id maps to one of a fixed number of LRU shards,
/// so updates for different messages rarely share a lock. Entries are evicted
/// by capacity or dropped explicitly with [`AnnotationCache::forget`].
#[derive(Debug)]
pub struct AnnotationCache {
    shards: Vec<Mutex<LruCache<MessageId, String>>>,
    hasher: RandomState,
    capacity: usize,
}

impl AnnotationCache {
    /// Create a cache holding about `capacity` messages; 0 means the default
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CACHE_CAPACITY
        } else {
            capacity
        };
        let per_shard =
            NonZeroUsize::new(capacity.div_ceil(SHARD_COUNT)).unwrap_or(NonZeroUsize::MIN);

        Self {
            shards: (0..SHARD_COUNT)
                .map(|_| Mutex::new(LruCache::new(per_shard)))
                .collect(),
            hasher: RandomState::new(),
            capacity,
        }
    }

    fn shard(&self, id: MessageId) -> &Mutex<LruCache<MessageId, String>> {
        let mut hasher = self.hasher.build_hasher();
        id.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }

    /// Store `value` for `id` unless it is already the cached value
    ///
    /// Returns true when the value changed (or was not cached).
    pub fn update_if_changed(&self, id: MessageId, value: &str) -> bool {
        let mut shard = self.shard(id).lock().unwrap_or_else(PoisonError::into_inner);
        if shard.get(&id).is_some_and(|last| last == value) {
            return false;
        }
        shard.put(id, value.to_string());
        true
    }

    /// Last value stored for `id`
    pub fn last(&self, id: MessageId) -> Option<String> {
        let shard = self.shard(id).lock().unwrap_or_else(PoisonError::into_inner);
        shard.peek(&id).cloned()
    }

    /// Drop the entry for `id`; returns whether one existed
    pub fn forget(&self, id: MessageId) -> bool {
        let mut shard = self.shard(id).lock().unwrap_or_else(PoisonError::into_inner);
        shard.pop(&id).is_some()
    }

    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for AnnotationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
