//! Evaluation of territory trees against a provider and an optional cache

use geo::BooleanOps;
use tracing::{debug, trace};

use super::provider::GeometryProvider;
use super::{LeafSource, Territory, TerritoryExpr};
use crate::cache::GeometryCache;
use crate::core::error::Result;
use crate::geometry::{non_empty, Geometry};

/// Bundles the injected geometry source with the cache used for composites
///
/// Leaves always go to the provider; only composite nodes are cached, keyed
/// by the canonical form of their expression.
pub struct TerritoryResolver<'a> {
    provider: &'a dyn GeometryProvider,
    cache: Option<&'a mut GeometryCache>,
    leaf_fetches: u64,
    combines: u64,
}

impl<'a> TerritoryResolver<'a> {
    pub fn new(provider: &'a dyn GeometryProvider) -> Self {
        Self {
            provider,
            cache: None,
            leaf_fetches: 0,
            combines: 0,
        }
    }

    pub fn with_cache(provider: &'a dyn GeometryProvider, cache: &'a mut GeometryCache) -> Self {
        Self {
            provider,
            cache: Some(cache),
            leaf_fetches: 0,
            combines: 0,
        }
    }

    /// Leaves handed to the provider or GeoJSON decoder so far
    pub fn leaf_fetches(&self) -> u64 {
        self.leaf_fetches
    }

    /// Boolean operations actually computed (cache hits excluded)
    pub fn combines(&self) -> u64 {
        self.combines
    }

    pub(super) fn evaluate(&mut self, territory: &Territory) -> Result<Option<Geometry>> {
        if let TerritoryExpr::Leaf(source) = territory.expr() {
            return self.resolve_leaf(source);
        }

        let key = self
            .cache
            .as_deref()
            .map(|cache| territory.cache_key(cache.key_len()));

        if let (Some(cache), Some(key)) = (self.cache.as_deref_mut(), key.as_deref()) {
            if let Some(hit) = cache.get(key) {
                debug!(key, expr = %territory, "territory cache hit");
                return Ok(non_empty(hit));
            }
        }

        let result = self.combine(territory.expr())?;

        if let (Some(cache), Some(key)) = (self.cache.as_deref_mut(), key.as_deref()) {
            // Absent results are stored as empty geometry
            let stored = result.clone().unwrap_or_else(|| Geometry::new(vec![]));
            cache.put(key, &stored);
        }
        Ok(result)
    }

    fn resolve_leaf(&mut self, source: &LeafSource) -> Result<Option<Geometry>> {
        self.leaf_fetches += 1;
        let geometry = match source {
            LeafSource::ExternalKey(key) => {
                trace!(key = key.as_str(), "fetching leaf geometry");
                self.provider.fetch(key)?
            }
            LeafSource::RawGeoJson(value) => self.provider.decode(value)?,
        };
        Ok(non_empty(geometry))
    }

    fn combine(&mut self, expr: &TerritoryExpr) -> Result<Option<Geometry>> {
        let result = match expr {
            TerritoryExpr::Leaf(source) => return self.resolve_leaf(source),
            TerritoryExpr::Union(a, b) => match (a.resolve(self)?, b.resolve(self)?) {
                (Some(a), Some(b)) => {
                    self.combines += 1;
                    non_empty(a.union(b))
                }
                (Some(only), None) | (None, Some(only)) => Some(only.clone()),
                (None, None) => None,
            },
            TerritoryExpr::Difference(a, b) => match a.resolve(self)? {
                None => None,
                Some(a) => match b.resolve(self)? {
                    None => Some(a.clone()),
                    Some(b) => {
                        self.combines += 1;
                        non_empty(a.difference(b))
                    }
                },
            },
            TerritoryExpr::Intersection(a, b) => match (a.resolve(self)?, b.resolve(self)?) {
                (Some(a), Some(b)) => {
                    self.combines += 1;
                    non_empty(a.intersection(b))
                }
                _ => None,
            },
        };
        Ok(result)
    }
}
