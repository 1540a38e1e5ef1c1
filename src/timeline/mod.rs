//! Time-scoped flags and the pax-max aggregation over them

pub mod aggregate;
pub mod flag;
pub mod output;

pub use aggregate::{compute_breakpoints, AggregationStats, Aggregator};
pub use flag::{Flag, FlagGeometry};
pub use output::{FlagRecord, FlagTimeline, Snapshot};
