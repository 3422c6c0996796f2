//! Rendered page cache

use crate::pdf::RenderedPage;
use crate::source::SourceId;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Cache key: one surface per source, page and zoom step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub source: SourceId,
    pub page: u32,
    /// Zoom scale in tenths (9 = 0.9)
    pub scale_tenths: u8,
}

struct CacheInner {
    lru: LruCache<RenderKey, RenderedPage>,
    total_bytes: usize,
}

/// Cache for rendered surfaces with entry count and byte budget limits
pub struct RenderCache {
    inner: Mutex<CacheInner>,
    max_bytes: usize,
}

impl RenderCache {
    /// Create a new cache with the specified entry capacity and byte budget
    pub fn new(capacity: usize, max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(CacheInner {
                lru: LruCache::new(capacity),
                total_bytes: 0,
            }),
            max_bytes,
        }
    }

    /// Store a surface.
    /// Surfaces larger than max_bytes are not cached at all.
    /// Evicts LRU entries until the byte budget is satisfied.
    pub fn put(&self, key: RenderKey, page: RenderedPage) {
        let new_size = page.byte_len();

        if new_size > self.max_bytes {
            return;
        }

        let mut inner = self.inner.lock();

        if let Some(old) = inner.lru.pop(&key) {
            inner.total_bytes = inner.total_bytes.saturating_sub(old.byte_len());
        }

        while inner.total_bytes + new_size > self.max_bytes {
            if let Some((_evicted_key, evicted)) = inner.lru.pop_lru() {
                inner.total_bytes = inner.total_bytes.saturating_sub(evicted.byte_len());
            } else {
                break;
            }
        }

        inner.total_bytes += new_size;
        // Capacity eviction inside put() bypasses our byte accounting
        if let Some((evicted_key, evicted)) = inner.lru.push(key, page) {
            if evicted_key != key {
                inner.total_bytes = inner.total_bytes.saturating_sub(evicted.byte_len());
            }
        }
    }

    pub fn get(&self, key: &RenderKey) -> Option<RenderedPage> {
        self.inner.lock().lru.get(key).cloned()
    }

    pub fn contains(&self, key: &RenderKey) -> bool {
        self.inner.lock().lru.contains(key)
    }

    /// Drop every surface belonging to a source
    pub fn release_source(&self, source: SourceId) -> usize {
        let mut inner = self.inner.lock();
        let stale: Vec<RenderKey> = inner
            .lru
            .iter()
            .filter(|(key, _)| key.source == source)
            .map(|(key, _)| *key)
            .collect();

        for key in &stale {
            if let Some(val) = inner.lru.pop(key) {
                inner.total_bytes = inner.total_bytes.saturating_sub(val.byte_len());
            }
        }
        stale.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.inner.lock().total_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn surface(page: u32, bytes: usize) -> RenderedPage {
        RenderedPage {
            page,
            width: 10,
            height: 10,
            png: Arc::new(vec![0u8; bytes]),
        }
    }

    fn key(source: SourceId, page: u32, scale_tenths: u8) -> RenderKey {
        RenderKey {
            source,
            page,
            scale_tenths,
        }
    }

    #[test]
    fn test_cache_basic_operations() {
        let cache = RenderCache::new(10, 1024);
        let source = SourceId::new();

        assert!(cache.is_empty());

        cache.put(key(source, 1, 9), surface(1, 3));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_bytes(), 3);
        assert_eq!(cache.get(&key(source, 1, 9)).unwrap().page, 1);

        // Different zoom is a different surface
        assert!(!cache.contains(&key(source, 1, 10)));
    }

    #[test]
    fn test_cache_entry_eviction_tracks_bytes() {
        let cache = RenderCache::new(2, 1024);
        let source = SourceId::new();

        cache.put(key(source, 1, 9), surface(1, 10));
        cache.put(key(source, 2, 9), surface(2, 10));
        cache.put(key(source, 3, 9), surface(3, 10));

        assert!(!cache.contains(&key(source, 1, 9)));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.total_bytes(), 20);
    }

    #[test]
    fn test_cache_byte_budget_eviction() {
        let cache = RenderCache::new(10, 100);
        let source = SourceId::new();

        cache.put(key(source, 1, 9), surface(1, 30));
        cache.put(key(source, 2, 9), surface(2, 30));
        cache.put(key(source, 3, 9), surface(3, 30));
        assert_eq!(cache.total_bytes(), 90);

        cache.put(key(source, 4, 9), surface(4, 30));
        assert!(!cache.contains(&key(source, 1, 9)));
        assert!(cache.contains(&key(source, 4, 9)));
        assert_eq!(cache.total_bytes(), 90);
    }

    #[test]
    fn test_cache_oversized_entry_rejected() {
        let cache = RenderCache::new(10, 50);
        let source = SourceId::new();

        cache.put(key(source, 1, 9), surface(1, 100));
        assert!(cache.is_empty());
        assert_eq!(cache.total_bytes(), 0);
    }

    #[test]
    fn test_cache_replace_same_key() {
        let cache = RenderCache::new(10, 1024);
        let source = SourceId::new();

        cache.put(key(source, 1, 9), surface(1, 50));
        cache.put(key(source, 1, 9), surface(1, 30));
        assert_eq!(cache.total_bytes(), 30);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_release_source_keeps_others() {
        let cache = RenderCache::new(10, 1024);
        let old = SourceId::new();
        let new = SourceId::new();

        cache.put(key(old, 1, 9), surface(1, 5));
        cache.put(key(old, 2, 9), surface(2, 5));
        cache.put(key(new, 1, 9), surface(1, 7));

        assert_eq!(cache.release_source(old), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_bytes(), 7);
        assert!(cache.contains(&key(new, 1, 9)));
    }
}
