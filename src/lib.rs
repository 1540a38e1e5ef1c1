//! Pax Atlas - temporal territory resolution for historical maps
//!
//! Territories are lazy set-algebra expressions over geometry sources.
//! Flags claim territories for a span of years; the pax-max aggregator
//! turns a list of flags into the minimal sequence of map snapshots.

pub mod cache;
pub mod core;
pub mod geometry;
pub mod territory;
pub mod timeline;

pub use crate::cache::{CacheStats, ClearScope, GeometryCache};
pub use crate::core::{AtlasConfig, AtlasError, LatLng, Period, Result, Year};
pub use crate::geometry::Geometry;
pub use crate::territory::{
    GeometryProvider, LeafSource, MemoryProvider, Territory, TerritoryResolver,
};
pub use crate::timeline::{Aggregator, Flag, FlagGeometry, FlagRecord, FlagTimeline, Snapshot};
