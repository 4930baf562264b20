use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// Insertion-ordered memo cache with bulk oldest-half eviction.
///
/// Nothing is touched until the size cap is crossed; then the oldest entries
/// are trimmed in a single pass until only half the cap remains. That gives
/// the size profile a sawtooth, not the steady decay of an LRU, and the
/// distinction is load-bearing: eviction timing is observable to callers.
/// Re-inserting an existing key updates its value but keeps the original
/// insertion slot.
pub struct ResultCache<T> {
    max_size: usize,
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    entries: HashMap<String, T>,
    order: VecDeque<String>,
}

impl<T: Clone> ResultCache<T> {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.lock().entries.get(key).cloned()
    }

    pub fn put(&self, key: String, value: T) {
        let mut inner = self.lock();
        if inner.entries.insert(key.clone(), value).is_none() {
            inner.order.push_back(key);
        }
        Self::trim(&mut inner, self.max_size);
    }

    /// Idempotent; the janitor and request-path guards may both call this at
    /// any time without coordination.
    pub fn evict_if_oversize(&self) {
        let mut inner = self.lock();
        Self::trim(&mut inner, self.max_size);
    }

    /// Unconditional trim down to half the cap, regardless of current size.
    /// The memory guards reach for this when process RSS crosses a watermark.
    pub fn shed_oldest(&self) {
        let mut inner = self.lock();
        let target = self.max_size / 2;
        while inner.entries.len() > target {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn trim(inner: &mut Inner<T>, max_size: usize) {
        if inner.entries.len() <= max_size {
            return;
        }
        let target = max_size / 2;
        while inner.entries.len() > target {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // A poisoned lock only means a writer panicked mid-update; entries
        // and order stay consistent because both mutate before unlock.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_put_roundtrip() {
        let cache = ResultCache::new(10);
        assert!(cache.get("a").is_none());
        cache.put("a".into(), 1);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sawtooth_eviction() {
        // Five inserts into a cache capped at four must leave at most two
        // entries, and only the most recent ones.
        let cache = ResultCache::new(4);
        for i in 1..=5 {
            cache.put(format!("k{i}"), i);
        }
        assert!(cache.len() <= 2);
        assert_eq!(cache.get("k4"), Some(4));
        assert_eq!(cache.get("k5"), Some(5));
        for stale in ["k1", "k2", "k3"] {
            assert!(cache.get(stale).is_none());
        }
    }

    #[test]
    fn test_no_eviction_below_cap() {
        let cache = ResultCache::new(4);
        for i in 1..=4 {
            cache.put(format!("k{i}"), i);
        }
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.get("k1"), Some(1));
    }

    #[test]
    fn test_overwrite_keeps_insertion_slot() {
        let cache = ResultCache::new(4);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        cache.put("a".into(), 10);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(10));
        // "a" still holds the oldest slot, so it goes first on overflow.
        cache.put("c".into(), 3);
        cache.put("d".into(), 4);
        cache.put("e".into(), 5);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("e"), Some(5));
    }

    #[test]
    fn test_evict_if_oversize_is_idempotent() {
        let cache = ResultCache::new(2);
        for i in 1..=3 {
            cache.put(format!("k{i}"), i);
        }
        let after_first = cache.len();
        cache.evict_if_oversize();
        cache.evict_if_oversize();
        assert_eq!(cache.len(), after_first);
        assert!(after_first <= 1);
    }

    #[test]
    fn test_shed_oldest_trims_below_cap() {
        let cache = ResultCache::new(8);
        for i in 1..=6 {
            cache.put(format!("k{i}"), i);
        }
        cache.shed_oldest();
        assert_eq!(cache.len(), 4);
        assert!(cache.get("k1").is_none());
        assert!(cache.get("k2").is_none());
        assert_eq!(cache.get("k6"), Some(6));
    }

    #[test]
    fn test_concurrent_put_and_evict() {
        let cache = Arc::new(ResultCache::new(8));
        let mut handles = Vec::new();
        for t in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    cache.put(format!("t{t}-{i}"), i);
                    cache.evict_if_oversize();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 8);
    }
}
