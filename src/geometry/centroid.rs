//! Area-weighted centroid used to anchor a label on a merged territory
//!
//! Only exterior rings count; holes are ignored. Input is GeoJSON order
//! `(lon, lat)`, output is map order `[lat, lng]`.

use geo::{LineString, Polygon};

use super::Geometry;
use crate::core::config::CentroidConfig;
use crate::core::types::LatLng;

#[derive(Debug, Clone, Copy)]
pub struct CentroidCalculator {
    area_epsilon: f64,
}

impl Default for CentroidCalculator {
    fn default() -> Self {
        Self::from_config(&CentroidConfig::default())
    }
}

impl CentroidCalculator {
    pub fn new(area_epsilon: f64) -> Self {
        Self { area_epsilon }
    }

    pub fn from_config(config: &CentroidConfig) -> Self {
        Self::new(config.area_epsilon)
    }

    /// Centroid of a whole multipolygon, weighted by each part's area
    pub fn centroid(&self, geometry: &Geometry) -> Option<LatLng> {
        let mut total_area = 0.0;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;

        for (area, (cx, cy)) in geometry.iter().filter_map(|p| self.weighted_part(p)) {
            total_area += area;
            sum_x += cx * area;
            sum_y += cy * area;
        }

        if total_area < self.area_epsilon || total_area == 0.0 {
            return None;
        }
        Some(LatLng::from_lon_lat(sum_x / total_area, sum_y / total_area))
    }

    /// Centroid of one polygon's exterior ring
    pub fn polygon_centroid(&self, polygon: &Polygon<f64>) -> Option<LatLng> {
        self.weighted_part(polygon)
            .map(|(_, (x, y))| LatLng::from_lon_lat(x, y))
    }

    fn weighted_part(&self, polygon: &Polygon<f64>) -> Option<(f64, (f64, f64))> {
        let (signed_area, center) = ring_moments(polygon.exterior())?;
        if signed_area.abs() < self.area_epsilon || signed_area == 0.0 {
            return None;
        }
        Some((signed_area.abs(), center))
    }
}

/// Shoelace area and centroid of a ring; `None` below three vertices
fn ring_moments(ring: &LineString<f64>) -> Option<(f64, (f64, f64))> {
    let mut coords: Vec<_> = ring.coords().copied().collect();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() < 3 {
        return None;
    }

    let n = coords.len();
    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let a = coords[i];
        let b = coords[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        twice_area += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }

    let area = 0.5 * twice_area;
    if area == 0.0 {
        return Some((0.0, (0.0, 0.0)));
    }
    Some((area, (cx / (6.0 * area), cy / (6.0 * area))))
}

/// Centroid with the default degeneracy threshold
pub fn centroid(geometry: &Geometry) -> Option<LatLng> {
    CentroidCalculator::default().centroid(geometry)
}
