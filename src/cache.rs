//! Bounded cache of compiled predicates keyed by query text.

pub mod lru;

use crate::compiler::FilterCompiler;
use crate::error::FilterResult;
use crate::expression::CompiledPredicate;
use self::lru::LruList;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default number of predicates kept per cache
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Hit and miss counters of a [`PredicateCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoises [`FilterCompiler::compile`] for repeated queries.
///
/// Lookups go through a concurrent map; recency is tracked separately under
/// a mutex and the least recently used query is dropped once `capacity` is
/// exceeded. Failed compilations are never cached.
pub struct PredicateCache<T> {
    compiler: FilterCompiler<T>,
    entries: DashMap<String, CompiledPredicate<T>>,
    lru: Mutex<LruList>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T: 'static> PredicateCache<T> {
    pub fn new(compiler: FilterCompiler<T>) -> Self {
        Self::with_capacity(compiler, DEFAULT_CACHE_CAPACITY)
    }

    /// A capacity of zero disables caching
    pub fn with_capacity(compiler: FilterCompiler<T>, capacity: usize) -> Self {
        Self {
            compiler,
            entries: DashMap::with_capacity(capacity),
            lru: Mutex::new(LruList::new()),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get_or_compile(&self, query: &str) -> FilterResult<CompiledPredicate<T>> {
        // Clone out so the shard guard is released before taking the LRU lock
        let cached = self.entries.get(query).map(|entry| entry.value().clone());
        if let Some(predicate) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            let mut lru = self.lru.lock();
            // May have been evicted since the lookup
            if self.entries.contains_key(query) {
                lru.touch(query);
            }
            drop(lru);
            log::trace!("Predicate cache hit for {:?}", query);
            return Ok(predicate);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let predicate = self.compiler.compile(query)?;
        if self.capacity == 0 {
            return Ok(predicate);
        }

        let mut lru = self.lru.lock();
        self.entries.insert(query.to_string(), predicate.clone());
        lru.touch(query);
        while lru.len() > self.capacity {
            match lru.evict() {
                Some(evicted) => {
                    log::trace!("Evicting cached predicate {:?}", evicted);
                    self.entries.remove(&evicted);
                }
                None => break,
            }
        }

        Ok(predicate)
    }

    pub fn compiler(&self) -> &FilterCompiler<T> {
        &self.compiler
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, query: &str) -> bool {
        self.entries.contains_key(query)
    }

    pub fn invalidate(&self, query: &str) -> bool {
        let mut lru = self.lru.lock();
        lru.remove(query);
        self.entries.remove(query).is_some()
    }

    pub fn clear(&self) {
        let mut lru = self.lru.lock();
        lru.clear();
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
