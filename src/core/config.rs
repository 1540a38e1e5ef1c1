//! Engine configuration with documented defaults
//!
//! Loaded from TOML; every section and field is optional and falls back to
//! the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{AtlasError, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub cache: CacheConfig,
    pub centroid: CentroidConfig,
}

/// Geometry cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one serialized geometry per key
    ///
    /// Shared between processes rendering different maps. Entries are
    /// immutable, so concurrent writers of the same key are harmless.
    pub cache_dir: PathBuf,

    /// When false the cache keeps the memory tier only
    pub disk_enabled: bool,

    /// Number of hex characters of the SHA-256 digest used as a key
    ///
    /// 32 characters = 128 bits, far beyond any realistic number of
    /// distinct expressions. Clamped to 8..=64.
    pub key_hex_len: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".cache/territories"),
            disk_enabled: true,
            key_hex_len: 32,
        }
    }
}

impl CacheConfig {
    pub fn effective_key_len(&self) -> usize {
        self.key_hex_len.clamp(8, 64)
    }
}

/// Centroid calculator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentroidConfig {
    /// Rings whose absolute signed area falls below this are degenerate
    ///
    /// Coordinates are degrees, so 1e-12 sq. degrees is well under a
    /// square metre anywhere on the globe.
    pub area_epsilon: f64,
}

impl Default for CentroidConfig {
    fn default() -> Self {
        Self {
            area_epsilon: 1e-12,
        }
    }
}

impl AtlasConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AtlasConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let eps = self.centroid.area_epsilon;
        if eps.is_nan() || eps < 0.0 {
            return Err(AtlasError::Config(format!(
                "centroid.area_epsilon must be a non-negative number, got {}",
                eps
            )));
        }
        if self.cache.disk_enabled && self.cache.cache_dir.as_os_str().is_empty() {
            return Err(AtlasError::Config(
                "cache.cache_dir must be set when the disk tier is enabled".into(),
            ));
        }
        Ok(())
    }
}
