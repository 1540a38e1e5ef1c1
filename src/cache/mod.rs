//! Content-addressed geometry cache
//!
//! Two tiers: an in-memory map in front of a directory of serialized
//! entries. Keys are hashes of canonical territory expressions, so one key
//! always names one geometry and entries never need invalidating. The cache
//! is an optimization only: disk problems degrade to misses, never errors.

mod disk;
pub mod stats;

pub use stats::CacheStats;

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::core::config::CacheConfig;
use crate::geometry::Geometry;
use disk::{DiskRead, DiskStore};
use stats::Counters;

/// Which tiers `GeometryCache::clear` purges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearScope {
    #[default]
    All,
    MemoryOnly,
    DiskOnly,
}

impl ClearScope {
    /// Map the `(memory_only, disk_only)` flag pair; both or neither set means all
    pub fn from_flags(memory_only: bool, disk_only: bool) -> Self {
        match (memory_only, disk_only) {
            (true, false) => ClearScope::MemoryOnly,
            (false, true) => ClearScope::DiskOnly,
            _ => ClearScope::All,
        }
    }
}

#[derive(Debug)]
pub struct GeometryCache {
    memory: AHashMap<String, Geometry>,
    disk: Option<DiskStore>,
    key_len: usize,
    counters: Counters,
}

impl GeometryCache {
    /// Cache backed by `cache_dir` with default key length
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(&CacheConfig {
            cache_dir: cache_dir.into(),
            ..CacheConfig::default()
        })
    }

    /// Cache without a disk tier
    pub fn memory_only() -> Self {
        Self::from_config(&CacheConfig {
            disk_enabled: false,
            ..CacheConfig::default()
        })
    }

    /// Falls back to memory-only if the directory cannot be created
    pub fn from_config(config: &CacheConfig) -> Self {
        let disk = if config.disk_enabled {
            match DiskStore::open(config.cache_dir.clone()) {
                Ok(store) => Some(store),
                Err(e) => {
                    warn!(
                        dir = %config.cache_dir.display(),
                        error = %e,
                        "geometry cache directory unavailable, using memory only"
                    );
                    None
                }
            }
        } else {
            None
        };

        Self {
            memory: AHashMap::new(),
            disk,
            key_len: config.effective_key_len(),
            counters: Counters::default(),
        }
    }

    /// Hex length of keys produced for this cache
    pub fn key_len(&self) -> usize {
        self.key_len
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.disk.as_ref().map(DiskStore::dir)
    }

    pub fn has_disk_tier(&self) -> bool {
        self.disk.is_some()
    }

    pub fn get(&mut self, key: &str) -> Option<Geometry> {
        if let Some(geometry) = self.memory.get(key) {
            self.counters.memory_hits += 1;
            return Some(geometry.clone());
        }
        self.counters.memory_misses += 1;

        let disk = self.disk.as_ref().filter(|_| DiskStore::accepts(key))?;
        match disk.read(key) {
            DiskRead::Hit(geometry) => {
                self.counters.disk_hits += 1;
                debug!(key, "geometry cache disk hit");
                self.memory.insert(key.to_string(), geometry.clone());
                Some(geometry)
            }
            DiskRead::Missing => {
                self.counters.disk_misses += 1;
                None
            }
            DiskRead::Corrupt(reason) => {
                self.counters.disk_misses += 1;
                warn!(key, reason = reason.as_str(), "evicting corrupt geometry cache entry");
                disk.remove(key);
                None
            }
        }
    }

    /// Store in memory and, best effort, on disk
    pub fn put(&mut self, key: &str, geometry: &Geometry) {
        self.memory.insert(key.to_string(), geometry.clone());

        if let Some(disk) = self.disk.as_ref().filter(|_| DiskStore::accepts(key)) {
            if let Err(e) = disk.write(key, geometry) {
                warn!(key, error = %e, "failed to persist geometry cache entry");
            }
        }
    }

    pub fn contains_in_memory(&self, key: &str) -> bool {
        self.memory.contains_key(key)
    }

    pub fn clear(&mut self, scope: ClearScope) {
        if scope != ClearScope::DiskOnly {
            self.memory.clear();
        }
        if scope != ClearScope::MemoryOnly {
            if let Some(disk) = &self.disk {
                disk.clear();
            }
        }
        debug!(?scope, "geometry cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let disk_size = self.disk.as_ref().map_or(0, DiskStore::len);
        self.counters.snapshot(self.memory.len(), disk_size)
    }

    pub fn reset_stats(&mut self) {
        self.counters = Counters::default();
    }
}
