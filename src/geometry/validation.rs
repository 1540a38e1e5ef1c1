//! Ring validation: vertex count, finite coordinates, self-intersection

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Line, LineString, MultiPolygon, Polygon};
use thiserror::Error;

use crate::core::error::AtlasError;

/// Validation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("ring has {count} distinct vertices, at least {minimum} required")]
    InsufficientVertices { count: usize, minimum: usize },
    #[error("non-finite coordinate {coordinate:?}")]
    NonFiniteCoordinate { coordinate: [f64; 2] },
    #[error("ring edges cross each other")]
    SelfIntersecting,
}

impl From<Vec<ValidationError>> for AtlasError {
    fn from(errors: Vec<ValidationError>) -> Self {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        AtlasError::InvalidGeometry(joined)
    }
}

pub struct GeometricValidator;

impl GeometricValidator {
    /// Validate a ring given as `(x, y)` pairs; a repeated closing vertex is ignored
    pub fn validate_ring(coords: &[(f64, f64)]) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for &(x, y) in coords {
            if !x.is_finite() || !y.is_finite() {
                errors.push(ValidationError::NonFiniteCoordinate { coordinate: [x, y] });
                return errors;
            }
        }

        let open = open_ring(coords);
        if open.len() < 3 {
            errors.push(ValidationError::InsufficientVertices {
                count: open.len(),
                minimum: 3,
            });
            return errors; // Can't do further checks
        }

        if Self::is_self_intersecting(open) {
            errors.push(ValidationError::SelfIntersecting);
        }

        errors
    }

    pub fn validate_polygon(polygon: &Polygon<f64>) -> Vec<ValidationError> {
        std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .flat_map(|ring| Self::validate_ring(&ring_coords(ring)))
            .collect()
    }

    pub fn validate_geometry(geometry: &MultiPolygon<f64>) -> Vec<ValidationError> {
        geometry.iter().flat_map(Self::validate_polygon).collect()
    }

    /// Check if ring edges intersect each other (excluding adjacent edges)
    ///
    /// Non-adjacent edges may not cross or overlap; touching at a single
    /// endpoint is allowed.
    fn is_self_intersecting(coords: &[(f64, f64)]) -> bool {
        let mut ring = LineString::from(coords.to_vec());
        ring.close();
        let edges: Vec<Line<f64>> = ring.lines().collect();
        let n = edges.len();
        if n < 4 {
            return false; // Triangle can't self-intersect
        }

        for i in 0..n {
            for j in (i + 2)..n {
                // First and last edges share the closing vertex
                if i == 0 && j == n - 1 {
                    continue;
                }
                match line_intersection(edges[i], edges[j]) {
                    Some(LineIntersection::SinglePoint { is_proper: true, .. })
                    | Some(LineIntersection::Collinear { .. }) => return true,
                    _ => {}
                }
            }
        }
        false
    }
}

fn ring_coords(ring: &LineString<f64>) -> Vec<(f64, f64)> {
    ring.coords().map(|c| (c.x, c.y)).collect()
}

fn open_ring(coords: &[(f64, f64)]) -> &[(f64, f64)] {
    match (coords.first(), coords.last()) {
        (Some(first), Some(last)) if coords.len() > 1 && first == last => {
            &coords[..coords.len() - 1]
        }
        _ => coords,
    }
}
