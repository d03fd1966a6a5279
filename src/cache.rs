//! Compiled pattern caching
//!
//! Compiling a pattern builds a regex, which is far more expensive than
//! running it. Route trees are matched against every location change, so the
//! same handful of patterns are compiled over and over. [`PatternCache`] keeps
//! recent compilations with LRU eviction.

use crate::matcher::{CompiledPath, PathPattern};
use crate::trace_log;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache performance statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
    pub invalidations: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Compiled pattern cache with LRU eviction
///
/// Keyed by pattern string, case sensitivity and end flag. Default capacity:
/// 256 patterns.
#[derive(Debug)]
pub struct PatternCache {
    compiled: LruCache<PathPattern, CompiledPath>,
    stats: CacheStats,
}

impl PatternCache {
    const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// A zero capacity is raised to one
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            compiled: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    pub fn get(&mut self, pattern: &PathPattern) -> Option<CompiledPath> {
        if let Some(compiled) = self.compiled.get(pattern) {
            self.stats.hits += 1;
            trace_log!("Pattern cache hit for '{}'", pattern.path);
            Some(compiled.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Pattern cache miss for '{}'", pattern.path);
            None
        }
    }

    pub fn insert(&mut self, pattern: PathPattern, compiled: CompiledPath) {
        if self.compiled.contains(&pattern) {
            self.compiled.put(pattern, compiled);
            return;
        }
        if let Some((evicted, _)) = self.compiled.push(pattern, compiled) {
            trace_log!("Evicted compiled pattern '{}'", evicted.path);
            self.stats.evictions += 1;
        }
    }

    pub fn clear(&mut self) {
        trace_log!("Clearing pattern cache");
        self.compiled.clear();
        self.stats.invalidations += 1;
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new()
    }
}
