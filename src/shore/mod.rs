//! Binned shoreline databases: bin selection, decoding, and stitching of
//! bin-local segments into closed rings.

mod assemble;
pub mod bin;
pub mod catalog;
pub mod grid;
pub mod prep;
pub mod side;
pub mod wrap;

use geo::LineString;
use serde::Serialize;

pub use bin::{DecodedBin, Segment, SegmentInfo, RIVERLAKE};
pub use catalog::{DbInfo, ShoreCatalog};
pub use grid::{BinGrid, ANTARCTICA_LIMIT};
pub use prep::prep_shore_polygons;
pub use side::{Crossing, CrossingKind, Side, SideIndex};

/// A ring (or open line) produced from one bin.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShorePolygon {
    /// Longitude/latitude vertices.
    pub ring: LineString<f64>,
    /// Hierarchical level: 0 ocean, 1 land, 2 lake, 3 island in lake, 4 pond.
    pub level: u8,
    /// Fill index; equal to `level` except for river-lakes ([`RIVERLAKE`]).
    pub fid: u8,
    /// True for a ring that lies wholly inside its bin.
    pub interior: bool,
}

impl ShorePolygon {
    pub fn new(ring: LineString<f64>, level: u8) -> Self {
        Self { ring, level, fid: level, interior: false }
    }

    #[inline] pub fn len(&self) -> usize { self.ring.0.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.ring.0.is_empty() }

    /// At least four vertices with the last repeating the first.
    pub fn is_closed(&self) -> bool {
        self.ring.0.len() >= 4 && self.ring.0.first() == self.ring.0.last()
    }
}
