//! Cache statistics tracking and reporting

use serde::{Deserialize, Serialize};

/// Point-in-time cache statistics, serialized as reported to callers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_requests: u64,
    pub memory_hits: u64,
    pub memory_misses: u64,
    pub disk_hits: u64,
    pub disk_misses: u64,
    pub memory_cache_size: usize,
    pub disk_cache_size: usize,
    pub hit_rate: f64,
}

/// Running counters kept by the cache
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub memory_hits: u64,
    pub memory_misses: u64,
    pub disk_hits: u64,
    pub disk_misses: u64,
}

impl Counters {
    pub fn snapshot(&self, memory_cache_size: usize, disk_cache_size: usize) -> CacheStats {
        // Every request consults memory first, so memory lookups count requests
        let total_requests = self.memory_hits + self.memory_misses;
        let hits = self.memory_hits + self.disk_hits;
        let hit_rate = if total_requests == 0 {
            0.0
        } else {
            hits as f64 / total_requests as f64
        };

        CacheStats {
            total_requests,
            memory_hits: self.memory_hits,
            memory_misses: self.memory_misses,
            disk_hits: self.disk_hits,
            disk_misses: self.disk_misses,
            memory_cache_size,
            disk_cache_size,
            hit_rate,
        }
    }
}
