//! Polygonal geometry: the value every territory resolves to

pub mod centroid;
pub mod geojson;
pub mod validation;

pub use centroid::{centroid, CentroidCalculator};
pub use validation::{GeometricValidator, ValidationError};

use geo::{Area, BooleanOps, MultiPolygon};

/// Resolved territory geometry in GeoJSON axis order (`x` = lon, `y` = lat)
pub type Geometry = MultiPolygon<f64>;

/// True when the geometry covers no area
pub fn is_empty(geometry: &Geometry) -> bool {
    geometry.0.is_empty() || geometry.unsigned_area() == 0.0
}

/// Map empty geometry to `None`, which is how absence is modelled everywhere
pub fn non_empty(geometry: Geometry) -> Option<Geometry> {
    if is_empty(&geometry) {
        None
    } else {
        Some(geometry)
    }
}

/// Fold a sequence of geometries with geometric union, skipping empty parts
pub fn union_all<I>(parts: I) -> Option<Geometry>
where
    I: IntoIterator<Item = Geometry>,
{
    parts
        .into_iter()
        .filter_map(non_empty)
        .reduce(|acc, next| acc.union(&next))
        .and_then(non_empty)
}

/// Geometric equality up to `tolerance` square units of symmetric difference
pub fn approx_eq(a: &Geometry, b: &Geometry, tolerance: f64) -> bool {
    a.xor(b).unsigned_area() <= tolerance
}
