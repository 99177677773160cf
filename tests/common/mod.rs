// Shared fixtures: small 20-degree databases built in memory.
#![allow(dead_code)]

use binarray::MemArrays;
use geo::{Area, LineString, Polygon};
use shorebin::{build::DbBuilder, Region, Resolution, ShoreCatalog, ShoreSelect};

pub const BIN_SIZE: i32 = 1200;
/// Row 3, column 0: 0..20E, 10..30N.
pub const BIN: usize = 54;
/// Row 3, column 17: 340..360E, 10..30N.
pub const DATELINE_BIN: usize = 71;

pub fn bin_region() -> Region {
    Region::new(0.0, 20.0, 10.0, 30.0)
}

pub fn builder() -> DbBuilder {
    DbBuilder::shore(BIN_SIZE).unwrap().with_title("fixture")
}

pub fn catalog(db: &DbBuilder, region: &Region, select: &str) -> ShoreCatalog<MemArrays> {
    let select: ShoreSelect = if select.is_empty() { ShoreSelect::default() } else { select.parse().unwrap() };
    ShoreCatalog::init(db.build().unwrap(), Resolution::Crude, region, &select).unwrap()
}

/// Index of global bin `bin` among the catalog's selected bins.
pub fn index_of<R: binarray::ArrayReader>(catalog: &ShoreCatalog<R>, bin: usize) -> usize {
    catalog.bins().iter().position(|&b| b == bin).unwrap()
}

pub fn signed_area(ring: &LineString<f64>) -> f64 {
    Polygon::new(ring.clone(), vec![]).signed_area()
}
