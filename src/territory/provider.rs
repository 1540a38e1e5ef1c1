//! Geometry sources for territory leaves

use ahash::AHashMap;
use serde_json::Value;

use crate::core::error::{AtlasError, Result};
use crate::geometry::{geojson, GeometricValidator, Geometry};

/// Supplies validated geometry for territory leaves
///
/// Storage is up to the implementor (files, network, literals).
pub trait GeometryProvider {
    /// Look up a geometry by opaque key; `AtlasError::NotFound` when missing
    fn fetch(&self, key: &str) -> Result<Geometry>;

    /// Decode literal GeoJSON carried by a leaf
    fn decode(&self, raw: &Value) -> Result<Geometry> {
        geojson::decode(raw)
    }
}

impl<F> GeometryProvider for F
where
    F: Fn(&str) -> Result<Geometry>,
{
    fn fetch(&self, key: &str) -> Result<Geometry> {
        self(key)
    }
}

/// Keyed geometries held in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryProvider {
    entries: AHashMap<String, Geometry>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a geometry after validating every ring
    pub fn insert(&mut self, key: impl Into<String>, geometry: Geometry) -> Result<()> {
        let errors = GeometricValidator::validate_geometry(&geometry);
        if !errors.is_empty() {
            return Err(errors.into());
        }
        self.entries.insert(key.into(), geometry);
        Ok(())
    }

    pub fn insert_geojson(&mut self, key: impl Into<String>, value: &Value) -> Result<()> {
        let geometry = geojson::decode(value)?;
        self.entries.insert(key.into(), geometry);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GeometryProvider for MemoryProvider {
    fn fetch(&self, key: &str) -> Result<Geometry> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| AtlasError::NotFound(key.to_string()))
    }
}
