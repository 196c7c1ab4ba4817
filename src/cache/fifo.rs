use lru::LruCache;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;
use tracing::debug;

/// Fixed-capacity cache that evicts the oldest inserted key on overflow.
///
/// Backed by an `LruCache` that is only ever read through `peek`, so reads
/// never promote an entry and the LRU end is always the oldest insertion.
/// The queue and map live behind one mutex, so concurrent writers cannot
/// interleave an eviction with an insert.
pub struct BoundedCache<K: Hash + Eq, V> {
    name: &'static str,
    capacity: usize,
    cache: Mutex<LruCache<K, V>>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone + std::fmt::Debug,
    V: Clone,
{
    /// Create a new cache with the given capacity (at least 1)
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            capacity: capacity.get(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up a key without touching eviction order
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.lock().peek(key).cloned()
    }

    /// Insert a value, evicting the oldest key if the cache is full.
    ///
    /// Re-inserting a present key replaces its value and moves it to the
    /// newest position; nothing is evicted in that case.
    pub fn put(&self, key: K, value: V) {
        let mut cache = self.cache.lock();
        if !cache.contains(&key) && cache.len() >= self.capacity {
            if let Some((evicted, _)) = cache.pop_lru() {
                debug!(cache = self.name, key = ?evicted, "Evicted oldest entry");
            }
        }
        cache.put(key, value);
    }

    /// Return the cached value or build, insert and return a new one
    pub fn get_or_try_insert<E, F>(&self, key: K, build: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(cached) = self.get(&key) {
            return Ok(cached);
        }
        let value = build()?;
        self.put(key, value.clone());
        Ok(value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.lock().contains(key)
    }

    /// Snapshot of all values, oldest insertion first
    pub fn values(&self) -> Vec<V> {
        self.cache.lock().iter().rev().map(|(_, v)| v.clone()).collect()
    }

    /// Snapshot of all keys, oldest insertion first
    pub fn keys(&self) -> Vec<K> {
        self.cache.lock().iter().rev().map(|(k, _)| k.clone()).collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_overflow_evicts_first_inserted() {
        let cache = BoundedCache::new("test", 1000);
        for i in 0..1001 {
            cache.put(format!("key{}", i), i);
        }

        assert_eq!(cache.len(), 1000);
        assert!(!cache.contains("key0"));
        for i in 1..1001 {
            assert!(cache.contains(format!("key{}", i).as_str()));
        }
    }

    #[test]
    fn test_reads_do_not_promote() {
        let cache = BoundedCache::new("test", 2);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);

        // Reading "a" must not save it from eviction
        assert_eq!(cache.get("a"), Some(1));
        cache.put("c".to_string(), 3);

        assert!(!cache.contains("a"));
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_reput_existing_key_does_not_evict() {
        let cache = BoundedCache::new("test", 2);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.put("a".to_string(), 10);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.keys(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_get_or_try_insert_builds_once() {
        let cache: BoundedCache<String, usize> = BoundedCache::new("test", 4);
        let first: Result<usize, ()> = cache.get_or_try_insert("k".to_string(), || Ok(7));
        let second: Result<usize, ()> =
            cache.get_or_try_insert("k".to_string(), || panic!("should not build again"));
        assert_eq!(first, Ok(7));
        assert_eq!(second, Ok(7));
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let cache: BoundedCache<String, usize> = BoundedCache::new("test", 4);
        let result: Result<usize, &str> = cache.get_or_try_insert("k".to_string(), || Err("nope"));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_puts_respect_capacity() {
        let cache = Arc::new(BoundedCache::new("test", 50));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        cache.put(format!("{}-{}", t, i), i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 50);
        assert_eq!(cache.keys().len(), 50);
    }
}
