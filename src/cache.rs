//! Explicit TTL cache for rebuilt point sets.
//!
//! Fetching POIs for a bounding box is expensive; the sets built from a
//! fetch are valid for a while. This cache makes that reuse explicit: the
//! owner holds a [`PointSetCache`] with a chosen time-to-live, keys entries
//! by category and quantized bounding box, and gets back only entries that
//! have not expired. Nothing here is process-global or implicit — the
//! caller owns the cache and its lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::pointset::PointSet;
use crate::Bounds;

/// Quantization scale for cache keys: 1e-5 degrees, roughly one meter.
/// Bounding boxes closer than that are the same fetch area.
const KEY_SCALE: f64 = 1e5;

fn quantize(value: f64) -> i64 {
    (value * KEY_SCALE).round() as i64
}

/// Deterministic cache key: category plus bounding box quantized to
/// 1e-5 degrees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    category: String,
    south: i64,
    west: i64,
    north: i64,
    east: i64,
}

impl CacheKey {
    /// Build a key for a category and fetch bounding box.
    pub fn new(category: &str, bounds: &Bounds) -> Self {
        Self {
            category: category.to_string(),
            south: quantize(bounds.min_lat),
            west: quantize(bounds.min_lng),
            north: quantize(bounds.max_lat),
            east: quantize(bounds.max_lng),
        }
    }

    /// The category this key refers to.
    pub fn category(&self) -> &str {
        &self.category
    }
}

struct CacheEntry {
    set: Arc<PointSet>,
    stored_at: Instant,
}

/// Caller-owned cache of built point sets with a fixed time-to-live.
///
/// `get` returns only unexpired entries; expired entries linger until
/// overwritten or [`purge_expired`](Self::purge_expired) runs. Entries
/// hold `Arc`s, so a hit shares the set with whatever index already
/// publishes it.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use geoprox::{Bounds, CacheKey, PointSet, PointSetCache};
///
/// let mut cache = PointSetCache::new(Duration::from_secs(3600));
/// let bounds = Bounds { min_lat: 29.8, max_lat: 30.0, min_lng: -95.6, max_lng: -95.3 };
/// let key = CacheKey::new("supermarket", &bounds);
///
/// if cache.get(&key).is_none() {
///     // fetch + build happen here, outside this crate
///     let set = PointSet::build("supermarket", Vec::new());
///     cache.insert(key.clone(), Arc::new(set));
/// }
/// assert!(cache.get(&key).is_some());
/// ```
pub struct PointSetCache {
    ttl: Duration,
    entries: HashMap<CacheKey, CacheEntry>,
}

impl PointSetCache {
    /// Create an empty cache with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get an unexpired entry.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<PointSet>> {
        self.entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.set))
    }

    /// Store a point set under a key, replacing any previous entry and
    /// restarting its time-to-live.
    pub fn insert(&mut self, key: CacheKey, set: Arc<PointSet>) {
        self.entries.insert(
            key,
            CacheEntry {
                set,
                stored_at: Instant::now(),
            },
        );
    }

    /// Remove all expired entries, returning how many were evicted.
    pub fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() < ttl);
        before - self.entries.len()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get the number of stored entries, including expired ones not yet
    /// purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
