#![doc = "Binned shoreline database decoder and polygon reassembly"]
//!
//! Shorelines, lakes, rivers and borders are stored in fixed-size bins
//! holding fragments clipped to the bin. A query opens a [`ShoreCatalog`]
//! for a region, decodes each selected bin with
//! [`ShoreCatalog::get_bin`], stitches its fragments into closed rings
//! with [`DecodedBin::assemble`], and fits the rings to the map with
//! [`prep_shore_polygons`].

pub mod boundary;
pub mod build;
mod common;
pub mod config;
pub mod error;
pub mod io;
pub mod lines;
pub mod shore;

#[doc(inline)]
pub use boundary::{CutSide, LonLatBoundary, MapBoundary};

#[doc(inline)]
pub use common::{
    adjust_resolution, available_resolutions, database_version, find_database, DbKind, DbVersion, DB_EXTENSION,
    MIN_VERSION,
};

#[doc(inline)]
pub use config::{AntarcticaMode, Direction, LakeFilter, Region, Resolution, ShoreConfig, ShoreSelect};

#[doc(inline)]
pub use error::{Result, ShoreError};

#[doc(inline)]
pub use lines::{LineBin, LineCatalog, LineKind};

#[doc(inline)]
pub use shore::{prep_shore_polygons, DecodedBin, ShoreCatalog, ShorePolygon};
