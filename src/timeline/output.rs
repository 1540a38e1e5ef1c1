//! Aggregation output consumed by map renderers

use serde::Serialize;
use serde_json::Value;

use crate::core::types::{LatLng, Year};
use crate::geometry::{geojson, Geometry};

/// One merged label within a static map or a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagRecord {
    pub label: String,
    #[serde(serialize_with = "geojson::serialize_optional")]
    pub geometry: Option<Geometry>,
    pub centroid: Option<LatLng>,
    pub note: Option<String>,
    pub color: Option<String>,
    pub classes: Option<String>,
}

/// Complete state at one breakpoint year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub year: Year,
    pub flags: Vec<FlagRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum FlagTimeline {
    Static {
        flags: Vec<FlagRecord>,
    },
    Dynamic {
        breakpoints: Vec<Year>,
        snapshots: Vec<Snapshot>,
    },
}

impl FlagTimeline {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, FlagTimeline::Dynamic { .. })
    }

    /// Records in force at `year`: the latest snapshot at or before it
    pub fn at_year(&self, year: Year) -> &[FlagRecord] {
        match self {
            FlagTimeline::Static { flags } => flags,
            FlagTimeline::Dynamic { snapshots, .. } => {
                let idx = snapshots.partition_point(|s| s.year <= year);
                match idx {
                    0 => &[],
                    n => &snapshots[n - 1].flags,
                }
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
