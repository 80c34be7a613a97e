//! Tween shell pooling
//!
//! Shells come from three places, tried in order:
//!
//! 1. a prewarmed [`FixedPool`] arena with O(1) acquire and release,
//! 2. a bounded LRU fallback cache of shells released while the arena was
//!    full, matched by [`TweenKind`],
//! 3. a fresh allocation, whose properties record comes from a separate
//!    fixed pool of [`TweenProperties`].
//!
//! Shells taken from the cache are marked resurrected and only ever go back
//! to the cache. Cache eviction discards the shell and reclaims its
//! properties record.

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::config::EngineConfig;
use crate::interpolator::TweenKind;
use crate::properties::TweenProperties;
use crate::tween::{Origin, Tween};
use crate::values::ValueKind;

/// Fixed-capacity arena with explicit free-index stacks
#[derive(Debug)]
pub struct FixedPool<T> {
    slots: Vec<Option<T>>,
    /// Indices currently holding an item
    available: Vec<usize>,
    /// Indices currently empty
    vacant: Vec<usize>,
}

impl<T> FixedPool<T> {
    /// Create a pool of `capacity` slots, each filled by `make`
    pub fn prewarmed(capacity: usize, mut make: impl FnMut() -> T) -> Self {
        Self {
            slots: (0..capacity).map(|_| Some(make())).collect(),
            available: (0..capacity).rev().collect(),
            vacant: Vec::with_capacity(capacity),
        }
    }

    /// Take an item, or `None` when every slot is empty
    pub fn acquire(&mut self) -> Option<T> {
        let index = self.available.pop()?;
        self.vacant.push(index);
        self.slots[index].take()
    }

    /// Put an item into a vacant slot. Hands it back when the pool is full.
    pub fn release(&mut self, item: T) -> Result<(), T> {
        let Some(index) = self.vacant.pop() else {
            return Err(item);
        };
        self.slots[index] = Some(item);
        self.available.push(index);
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Items ready to be acquired
    pub fn available(&self) -> usize {
        self.available.len()
    }
}

/// Pool counters, cumulative since engine construction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub fixed_hits: u64,
    pub cache_hits: u64,
    pub fresh: u64,
    /// Shells dropped by cache eviction
    pub discarded: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: TweenKind,
    serial: u64,
}

/// Shell source for the engine
pub struct TweenPool {
    fixed: FixedPool<Tween>,
    cache: Option<LruCache<CacheKey, Tween>>,
    properties: FixedPool<Box<TweenProperties>>,
    serial: u64,
    stats: PoolStats,
}

impl TweenPool {
    pub fn new(config: &EngineConfig) -> Self {
        let blank = TweenKind::Value(ValueKind::Float);
        Self {
            fixed: FixedPool::prewarmed(config.pool_capacity, || {
                Tween::shell(blank, Box::new(TweenProperties::new()))
            }),
            cache: NonZeroUsize::new(config.cache_capacity).map(LruCache::new),
            properties: FixedPool::prewarmed(config.properties_capacity, || {
                Box::new(TweenProperties::new())
            }),
            serial: 0,
            stats: PoolStats::default(),
        }
    }

    /// Hand out a shell for a tween of `kind`. Never fails.
    pub fn acquire(&mut self, kind: TweenKind) -> Tween {
        if let Some(mut tween) = self.fixed.acquire() {
            self.stats.fixed_hits += 1;
            tween.origin = Origin::Pool;
            tween.kind = kind;
            return tween;
        }

        if let Some(mut tween) = self.take_cached(kind) {
            self.stats.cache_hits += 1;
            tracing::debug!("tween pool exhausted, resurrected cached {:?} shell", kind);
            tween.origin = Origin::Cache;
            tween.resurrected = true;
            return tween;
        }

        self.stats.fresh += 1;
        tracing::debug!("tween pool exhausted, allocating {:?} shell", kind);
        let properties = self
            .properties
            .acquire()
            .unwrap_or_else(|| Box::new(TweenProperties::new()));
        let mut tween = Tween::shell(kind, properties);
        tween.origin = Origin::Fresh;
        tween
    }

    /// Take the most recently cached shell of `kind`
    fn take_cached(&mut self, kind: TweenKind) -> Option<Tween> {
        let cache = self.cache.as_mut()?;
        let key = cache
            .iter()
            .map(|(key, _)| *key)
            .find(|key| key.kind == kind)?;
        cache.pop(&key)
    }

    /// Return a retired shell. It is reset before it is stored.
    pub fn release(&mut self, mut tween: Tween) {
        tween.reset();

        let tween = if tween.resurrected {
            tween
        } else {
            match self.fixed.release(tween) {
                Ok(()) => return,
                Err(tween) => tween,
            }
        };

        let Some(cache) = self.cache.as_mut() else {
            self.discard(tween);
            return;
        };

        self.serial = self.serial.wrapping_add(1);
        let key = CacheKey {
            kind: tween.kind,
            serial: self.serial,
        };
        if let Some((_, evicted)) = cache.push(key, tween) {
            self.discard(evicted);
        }
    }

    fn discard(&mut self, tween: Tween) {
        self.stats.discarded += 1;
        tracing::debug!("discarding {:?} shell", tween.kind);
        let mut properties = tween.properties;
        properties.reset();
        // A full properties pool simply drops the record
        let _ = self.properties.release(properties);
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Shells ready in the fixed pool
    pub fn pooled(&self) -> usize {
        self.fixed.available()
    }

    pub fn cached(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.len())
    }
}

impl std::fmt::Debug for TweenPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenPool")
            .field("capacity", &self.fixed.capacity())
            .field("pooled", &self.pooled())
            .field("cached", &self.cached())
            .field("properties", &self.properties.available())
            .field("stats", &self.stats)
            .finish()
    }
}
