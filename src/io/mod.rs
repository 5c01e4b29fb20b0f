//! Input/output helpers.
//!
//! - JSON configuration loading + validation surface (`config`)
//! - GeoJSON FeatureCollection export (`geojson`)

pub mod config;
pub mod geojson;

pub use config::*;
pub use geojson::*;
