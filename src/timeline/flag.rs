//! Flags: labeled, optionally time-scoped claims on a territory

use crate::core::types::{Period, Year};
use crate::geometry::Geometry;
use crate::territory::Territory;

/// What a flag covers: an unresolved expression or ready geometry
#[derive(Debug, Clone)]
pub enum FlagGeometry {
    Territory(Territory),
    Geometry(Geometry),
}

impl From<Territory> for FlagGeometry {
    fn from(territory: Territory) -> Self {
        FlagGeometry::Territory(territory)
    }
}

impl From<Geometry> for FlagGeometry {
    fn from(geometry: Geometry) -> Self {
        FlagGeometry::Geometry(geometry)
    }
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub label: String,
    pub geometry: FlagGeometry,
    pub period: Option<Period>,
    pub note: Option<String>,
    pub color: Option<String>,
    pub classes: Option<String>,
}

impl Flag {
    pub fn new(label: impl Into<String>, geometry: impl Into<FlagGeometry>) -> Self {
        Self {
            label: label.into(),
            geometry: geometry.into(),
            period: None,
            note: None,
            color: None,
            classes: None,
        }
    }

    /// Held from `start` up to, not including, `end`
    pub fn with_period(mut self, start: Year, end: Year) -> Self {
        self.period = Some(Period::new(start, end));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Space-separated CSS-style class tokens
    pub fn with_classes(mut self, classes: impl Into<String>) -> Self {
        self.classes = Some(classes.into());
        self
    }

    /// Timeless flags are always active
    pub fn is_active_at(&self, year: Year) -> bool {
        self.period.map_or(true, |p| p.contains(year))
    }
}
