//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Calendar year; negative values are BCE
pub type Year = i32;

/// Half-open `[start, end)` span of years during which a flag holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: Year,
    pub end: Year,
}

impl Period {
    pub fn new(start: Year, end: Year) -> Self {
        Self { start, end }
    }

    /// Start included, end excluded. Empty and inverted periods contain nothing.
    #[inline]
    pub fn contains(&self, year: Year) -> bool {
        self.start <= year && year < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl From<(Year, Year)> for Period {
    fn from((start, end): (Year, Year)) -> Self {
        Self::new(start, end)
    }
}

/// Label anchor in map order; serializes as `[lat, lng]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng(pub f64, pub f64);

impl LatLng {
    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lng(&self) -> f64 {
        self.1
    }

    /// Build from a GeoJSON-ordered `(lon, lat)` pair
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self(lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_is_clopen() {
        let p = Period::new(-300, -100);
        assert!(p.contains(-300));
        assert!(p.contains(-101));
        assert!(!p.contains(-100));
        assert!(!p.contains(-301));
    }

    #[test]
    fn test_inverted_period_never_active() {
        let p = Period::new(10, 10);
        assert!(p.is_empty());
        assert!(!p.contains(10));

        let p = Period::new(50, 0);
        assert!(!p.contains(25));
    }

    #[test]
    fn test_latlng_serializes_as_pair() {
        let c = LatLng::from_lon_lat(80.5, 20.25);
        assert_eq!(serde_json::to_string(&c).unwrap(), "[20.25,80.5]");
    }
}
