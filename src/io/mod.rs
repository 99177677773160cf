//! Export of assembled rings and lines.
//!
//! - `geojson` - GeoJSON feature collections, one feature per ring or line

pub mod geojson;

pub use geojson::{to_geojson, write_geojson};
