//! Territory algebra
//!
//! A `Territory` is an immutable expression tree over geometry sources.
//! Nothing is computed until `resolve` is called; the result is then kept on
//! the node, so clones made afterwards carry the resolved geometry with them.

mod canonical;
pub mod provider;
pub mod resolver;

pub use provider::{GeometryProvider, MemoryProvider};
pub use resolver::TerritoryResolver;

use std::cell::OnceCell;
use std::fmt;
use std::ops::{BitAnd, BitOr, Sub};

use serde_json::Value;

use crate::core::error::Result;
use crate::geometry::Geometry;

/// Where a leaf's geometry comes from
#[derive(Debug, Clone, PartialEq)]
pub enum LeafSource {
    /// Literal GeoJSON, decoded locally
    RawGeoJson(Value),
    /// Opaque key looked up through the injected `GeometryProvider`
    ExternalKey(String),
}

#[derive(Debug, Clone)]
pub enum TerritoryExpr {
    Leaf(LeafSource),
    Union(Box<Territory>, Box<Territory>),
    Difference(Box<Territory>, Box<Territory>),
    Intersection(Box<Territory>, Box<Territory>),
}

#[derive(Debug, Clone)]
pub struct Territory {
    expr: TerritoryExpr,
    resolved: OnceCell<Option<Geometry>>,
    canonical: OnceCell<String>,
}

impl Territory {
    fn from_expr(expr: TerritoryExpr) -> Self {
        Self {
            expr,
            resolved: OnceCell::new(),
            canonical: OnceCell::new(),
        }
    }

    pub fn leaf(source: LeafSource) -> Self {
        Self::from_expr(TerritoryExpr::Leaf(source))
    }

    /// Leaf resolved by key through the provider
    pub fn key(key: impl Into<String>) -> Self {
        Self::leaf(LeafSource::ExternalKey(key.into()))
    }

    /// Leaf holding literal GeoJSON
    pub fn geojson(value: Value) -> Self {
        Self::leaf(LeafSource::RawGeoJson(value))
    }

    pub fn union(self, other: Territory) -> Self {
        Self::from_expr(TerritoryExpr::Union(Box::new(self), Box::new(other)))
    }

    pub fn difference(self, other: Territory) -> Self {
        Self::from_expr(TerritoryExpr::Difference(Box::new(self), Box::new(other)))
    }

    pub fn intersection(self, other: Territory) -> Self {
        Self::from_expr(TerritoryExpr::Intersection(Box::new(self), Box::new(other)))
    }

    /// Left fold with union; `None` for an empty sequence
    pub fn union_all<I>(territories: I) -> Option<Self>
    where
        I: IntoIterator<Item = Territory>,
    {
        territories.into_iter().reduce(Territory::union)
    }

    pub fn expr(&self) -> &TerritoryExpr {
        &self.expr
    }

    /// Resolve the tree, reusing the stored result after the first call
    ///
    /// `Ok(None)` means the expression is valid but covers nothing.
    pub fn resolve(&self, resolver: &mut TerritoryResolver<'_>) -> Result<Option<&Geometry>> {
        if let Some(done) = self.resolved.get() {
            return Ok(done.as_ref());
        }
        let computed = resolver.evaluate(self)?;
        Ok(self.resolved.get_or_init(|| computed).as_ref())
    }

    /// Stored result, if this node has been resolved
    pub fn resolved(&self) -> Option<Option<&Geometry>> {
        self.resolved.get().map(Option::as_ref)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }
}

impl BitOr for Territory {
    type Output = Territory;

    fn bitor(self, rhs: Territory) -> Territory {
        self.union(rhs)
    }
}

impl Sub for Territory {
    type Output = Territory;

    fn sub(self, rhs: Territory) -> Territory {
        self.difference(rhs)
    }
}

impl BitAnd for Territory {
    type Output = Territory;

    fn bitand(self, rhs: Territory) -> Territory {
        self.intersection(rhs)
    }
}

/// Expression as written, e.g. `(IND | PAK) - KAS`
impl fmt::Display for Territory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expr {
            TerritoryExpr::Leaf(LeafSource::ExternalKey(key)) => write!(f, "{key}"),
            TerritoryExpr::Leaf(LeafSource::RawGeoJson(_)) => write!(f, "<geojson>"),
            TerritoryExpr::Union(a, b) => write!(f, "({a} | {b})"),
            TerritoryExpr::Difference(a, b) => write!(f, "({a} - {b})"),
            TerritoryExpr::Intersection(a, b) => write!(f, "({a} & {b})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_build_expected_tree() {
        let t = (Territory::key("A") | Territory::key("B")) - Territory::key("C");
        assert!(matches!(t.expr(), TerritoryExpr::Difference(..)));
        assert_eq!(t.to_string(), "((A | B) - C)");

        let t = Territory::key("A") & Territory::geojson(serde_json::json!({}));
        assert_eq!(t.to_string(), "(A & <geojson>)");
    }

    #[test]
    fn test_union_all() {
        assert!(Territory::union_all(Vec::new()).is_none());
        let t = Territory::union_all(["A", "B", "C"].map(Territory::key)).unwrap();
        assert_eq!(t.to_string(), "((A | B) | C)");
    }

    #[test]
    fn test_unresolved_until_asked() {
        let t = Territory::key("A");
        assert!(!t.is_resolved());
        assert!(t.resolved().is_none());
    }
}
