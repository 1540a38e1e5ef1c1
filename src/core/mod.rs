pub mod config;
pub mod error;
pub mod types;

pub use config::{AtlasConfig, CacheConfig, CentroidConfig};
pub use error::{AtlasError, Result};
pub use types::{LatLng, Period, Year};
