//! Read-through memoization of solver results
//!
//! No expiry and no invalidation: a cache lives as long as the session that
//! owns it. `CompositionCache` needs `&mut` access; share one across threads
//! through `SharedCompositionCache`.

use super::{Composition, Preference};
use crate::error::Result;
use crate::Money;
use std::collections::HashMap;
use std::sync::Mutex;

/// Cache key: target installment, preference and catalog size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    target_bits: u64,
    preference: Preference,
    catalog_size: usize,
}

impl CacheKey {
    pub fn new(target: Money, preference: Preference, catalog_size: usize) -> Self {
        // Fold -0.0 into 0.0 so equal targets hash the same
        let target = if target == 0.0 { 0.0 } else { target };
        Self {
            target_bits: target.to_bits(),
            preference,
            catalog_size,
        }
    }

    pub fn target(&self) -> Money {
        f64::from_bits(self.target_bits)
    }
}

/// Single-owner composition cache
#[derive(Debug, Default)]
pub struct CompositionCache {
    entries: HashMap<CacheKey, Composition>,
    hits: u64,
    misses: u64,
}

impl CompositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached composition for `key`, or compute and store it
    ///
    /// A failed computation is returned as-is and nothing is stored.
    pub fn get_or_compute<F>(&mut self, key: CacheKey, compute: F) -> Result<Composition>
    where
        F: FnOnce() -> Result<Composition>,
    {
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(hit.clone());
        }

        self.misses += 1;
        let composition = compute()?;
        log::debug!("Caching composition for target {:.2} ({:?})", key.target(), key.preference);
        self.entries.insert(key, composition.clone());
        Ok(composition)
    }

    pub fn get(&self, key: &CacheKey) -> Option<&Composition> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// Mutex-guarded cache for callers sharing one cache across threads
///
/// The lock is held while computing, so concurrent requests for the same key
/// compute once.
#[derive(Debug, Default)]
pub struct SharedCompositionCache {
    inner: Mutex<CompositionCache>,
}

impl SharedCompositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Result<Composition>
    where
        F: FnOnce() -> Result<Composition>,
    {
        // A panic inside `compute` never leaves a half-written entry
        let mut cache = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.get_or_compute(key, compute)
    }

    /// (hits, misses, entries)
    pub fn stats(&self) -> (u64, u64, usize) {
        let cache = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        (cache.hits(), cache.misses(), cache.len())
    }
}
