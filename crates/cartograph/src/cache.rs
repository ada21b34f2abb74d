//! Injected, bounded cache of deterministic layouts.
//!
//! The cache is an ordinary value the caller owns and passes in; there is no
//! process-wide instance. When full, the entry inserted longest ago is
//! evicted. Hits refresh an entry's position, so the policy is least recently
//! used by insertion order.

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use log::trace;
use rustc_hash::FxHasher;

use cartograph_core::{spec::Specification, theme::Theme};

use crate::{
    layout::{Dimensions, LayoutResult},
    selector::Preferences,
};

/// Cache key over everything that influences a deterministic layout
pub fn cache_key(
    spec: &Specification,
    dimensions: Dimensions,
    theme: &Theme,
    preferences: &Preferences,
) -> u64 {
    let mut hasher = FxHasher::default();
    spec.hash(&mut hasher);
    dimensions.hash_bits().hash(&mut hasher);
    theme.hash(&mut hasher);
    // Model-assist settings never change the deterministic base
    preferences.preferred_algorithm.hash(&mut hasher);
    preferences.no_connectors.hash(&mut hasher);
    hasher.finish()
}

/// Fixed-capacity layout cache with hit and miss counters.
#[derive(Debug, Clone)]
pub struct LayoutCache {
    capacity: usize,
    entries: IndexMap<u64, LayoutResult>,
    hits: u64,
    misses: u64,
}

impl LayoutCache {
    /// Creates a cache holding at most `capacity` layouts. Zero disables storage.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: IndexMap::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns a copy of the cached layout for `key`, counting the hit or miss
    pub fn get(&mut self, key: u64) -> Option<LayoutResult> {
        match self.entries.shift_remove(&key) {
            Some(result) => {
                self.hits += 1;
                let copy = result.clone();
                self.entries.insert(key, result);
                Some(copy)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Stores `result`, evicting the oldest entry when full
    pub fn insert(&mut self, key: u64, result: LayoutResult) {
        if self.capacity == 0 {
            return;
        }
        self.entries.shift_remove(&key);
        while self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.shift_remove_index(0) {
                trace!(key = evicted; "Evicted cached layout");
            }
        }
        self.entries.insert(key, result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
