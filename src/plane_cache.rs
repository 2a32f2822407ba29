//! Bounded in-memory cache of decoded planes.
//!
//! The cache is bounded by a byte budget rather than an entry count: all
//! planes of one pixel set share dimensions, so the budget divides into a
//! fixed number of slots. Eviction is strictly insertion-ordered (FIFO):
//! reads never promote an entry, so the oldest inserted plane is always
//! the one displaced when the cache is full.

use std::sync::Arc;

use lru::LruCache;
use tracing::debug;

use crate::descriptor::PlaneIndex;
use crate::error::{PlaneError, PlaneResult};
use crate::plane::DecodedPlane;

pub struct PlaneCache {
    entries: LruCache<PlaneIndex, Arc<DecodedPlane>>,
    max_entries: usize,
    plane_bytes: usize,
    byte_budget: usize,
    current_bytes: usize,
}

impl PlaneCache {
    /// Create a cache holding up to `byte_budget / plane_bytes` planes.
    ///
    /// A budget smaller than one plane yields `max_entries == 0`, which
    /// disables caching entirely: every [`insert`](Self::insert) is a
    /// no-op and every [`get`](Self::get) a miss. Zero arguments are
    /// rejected.
    pub fn new(byte_budget: usize, plane_bytes: usize) -> PlaneResult<Self> {
        if byte_budget == 0 || plane_bytes == 0 {
            return Err(PlaneError::InvalidCapacity {
                byte_budget,
                plane_bytes,
            });
        }
        Ok(PlaneCache {
            entries: LruCache::unbounded(),
            max_entries: byte_budget / plane_bytes,
            plane_bytes,
            byte_budget,
            current_bytes: 0,
        })
    }

    /// Look up a cached plane. Reads do not affect eviction order.
    #[must_use]
    pub fn get(&self, index: PlaneIndex) -> Option<Arc<DecodedPlane>> {
        // peek, not get: recency must never be updated, or eviction
        // degrades from FIFO to LRU.
        self.entries.peek(&index).map(Arc::clone)
    }

    #[must_use]
    pub fn contains(&self, index: PlaneIndex) -> bool {
        self.entries.contains(&index)
    }

    /// Insert a plane, evicting the oldest inserted entry if the cache is
    /// full. No-op when caching is disabled.
    pub fn insert(&mut self, index: PlaneIndex, plane: Arc<DecodedPlane>) {
        if self.max_entries == 0 {
            return;
        }

        if self.entries.pop(&index).is_some() {
            self.current_bytes = self.current_bytes.saturating_sub(self.plane_bytes);
        }

        while self.entries.len() >= self.max_entries {
            if let Some((evicted, _)) = self.entries.pop_lru() {
                debug!(plane = evicted, "evicting oldest cached plane");
                self.current_bytes = self.current_bytes.saturating_sub(self.plane_bytes);
            } else {
                break;
            }
        }

        self.current_bytes = self.current_bytes.saturating_add(self.plane_bytes);
        self.entries.put(index, plane);
    }

    /// Drop all entries, keeping the current capacity.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_bytes = 0;
    }

    /// Recompute capacity from a new byte budget and drop all entries.
    /// A resize is a full invalidation, not a partial re-balancing.
    pub fn resize(&mut self, byte_budget: usize) -> PlaneResult<()> {
        if byte_budget == 0 {
            return Err(PlaneError::InvalidCapacity {
                byte_budget,
                plane_bytes: self.plane_bytes,
            });
        }
        self.max_entries = byte_budget / self.plane_bytes;
        self.byte_budget = byte_budget;
        self.clear();
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    #[must_use]
    pub fn byte_budget(&self) -> usize {
        self.byte_budget
    }

    /// Bytes currently held across all retained planes.
    #[must_use]
    pub fn current_bytes(&self) -> usize {
        self.current_bytes
    }
}
