//! Memoized query results
//!
//! A bounded LRU stands in for soft references: entries may vanish at any
//! time, and a miss always recomputes. Invalidation is per key.

use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to recompute
    pub misses: u64,
    /// Entries dropped by a mutation
    pub invalidations: u64,
    /// Entries currently held
    pub len: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Per-key memo of ordered query results
#[derive(Debug)]
pub struct ResultCache<K: Hash + Eq, V> {
    /// `None` when caching is disabled
    entries: Option<LruCache<K, Vec<V>>>,
    hits: u64,
    misses: u64,
    invalidations: u64,
}

impl<K: Hash + Eq, V: Clone> ResultCache<K, V> {
    /// Cache holding at most `capacity` results; zero disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(LruCache::new),
            hits: 0,
            misses: 0,
            invalidations: 0,
        }
    }

    /// Copy of the cached result, if still held
    pub fn get(&mut self, key: &K) -> Option<Vec<V>> {
        let found = self.entries.as_mut().and_then(|entries| entries.get(key).cloned());
        match found {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        found
    }

    /// Remember a result
    pub fn put(&mut self, key: K, value: Vec<V>) {
        if let Some(entries) = self.entries.as_mut() {
            entries.put(key, value);
        }
    }

    /// Forget the result for one key
    pub fn invalidate(&mut self, key: &K) {
        if let Some(entries) = self.entries.as_mut() {
            if entries.pop(key).is_some() {
                self.invalidations += 1;
            }
        }
    }

    /// Forget everything
    pub fn clear(&mut self) {
        if let Some(entries) = self.entries.as_mut() {
            self.invalidations += entries.len() as u64;
            entries.clear();
        }
    }

    /// Whether a result is held for `key`, without touching recency
    pub fn contains(&self, key: &K) -> bool {
        self.entries.as_ref().is_some_and(|entries| entries.contains(key))
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            invalidations: self.invalidations,
            len: self.entries.as_ref().map_or(0, LruCache::len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_and_miss() {
        let mut cache: ResultCache<&str, u32> = ResultCache::new(4);
        assert_eq!(cache.get(&"a"), None);

        cache.put("a", vec![1, 2]);
        assert_eq!(cache.get(&"a"), Some(vec![1, 2]));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.len, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalidate_only_touches_one_key() {
        let mut cache: ResultCache<&str, u32> = ResultCache::new(4);
        cache.put("a", vec![1]);
        cache.put("b", vec![2]);

        cache.invalidate(&"a");
        assert!(!cache.contains(&"a"));
        assert!(cache.contains(&"b"));
        assert_eq!(cache.stats().invalidations, 1);

        cache.invalidate(&"missing");
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut cache: ResultCache<u32, u32> = ResultCache::new(2);
        cache.put(1, vec![]);
        cache.put(2, vec![]);
        cache.put(3, vec![]);

        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn test_zero_capacity_disables() {
        let mut cache: ResultCache<u32, u32> = ResultCache::new(0);
        cache.put(1, vec![1]);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.stats().len, 0);
    }

    #[test]
    fn test_clear() {
        let mut cache: ResultCache<u32, u32> = ResultCache::new(8);
        cache.put(1, vec![1]);
        cache.put(2, vec![2]);
        cache.clear();

        assert_eq!(cache.stats().len, 0);
        assert_eq!(cache.stats().invalidations, 2);
    }
}
