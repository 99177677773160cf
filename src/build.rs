//! Writing binned databases from explicit bins, segments and polygons.
//!
//! Used by converters and as the fixture factory for tests:
//!
//! ```no_run
//! use shorebin::{build::DbBuilder, shore::Side};
//!
//! let mut db = DbBuilder::shore(1200)?;
//! let land = db.add_polygon(None, 5000.0);
//! db.set_corner_levels(0, [0, 0, 1, 1])?;
//! db.add_segment(0, land, 1, Some(Side::West), Some(Side::East), &[(0, 100), (65535, 200)])?;
//! db.write("binned_GSHHS_c.nc", true)?;
//! # Ok::<(), shorebin::ShoreError>(())
//! ```

use std::{collections::BTreeMap, path::Path};

use binarray::MemArrays;

use crate::{
    common::names::*,
    config::MAX_LEVEL,
    error::{Result, ShoreError},
    shore::{BinGrid, SegmentInfo, Side},
};

/// Micro-fraction of a polygon kept in full at every resolution.
pub const FULL_FRACTION: i32 = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    Shore,
    Lines,
}

#[derive(Clone, Debug)]
struct PolygonRecord {
    parent: i32,
    area: f64,
    fraction: i32,
}

#[derive(Clone, Debug)]
struct SegmentRecord {
    info: SegmentInfo,
    polygon: i32,
    points: Vec<(u16, u16)>,
}

#[derive(Clone, Debug, Default)]
struct BinRecord {
    corners: [u8; 4],
    segments: Vec<SegmentRecord>,
}

/// Accumulates a shoreline or line database in memory.
#[derive(Clone, Debug)]
pub struct DbBuilder {
    layout: Layout,
    grid: BinGrid,
    version: String,
    title: String,
    source: String,
    legacy_area: bool,
    polygons: Vec<PolygonRecord>,
    node_polygon: Vec<i32>,
    bins: BTreeMap<usize, BinRecord>,
}

impl DbBuilder {
    /// Empty shoreline database over the whole globe with square bins of
    /// `bin_size` minutes.
    pub fn shore(bin_size: i32) -> Result<Self> {
        Self::new(Layout::Shore, bin_size)
    }

    /// Empty river or border database.
    pub fn lines(bin_size: i32) -> Result<Self> {
        Self::new(Layout::Lines, bin_size)
    }

    fn new(layout: Layout, bin_size: i32) -> Result<Self> {
        if bin_size <= 0 {
            return Err(ShoreError::Format(format!("bin size {bin_size} must be positive")));
        }
        let nx = (21600 / bin_size) as usize;
        let ny = (10800 / bin_size) as usize;
        let grid = BinGrid::new(bin_size, nx, ny, nx * ny)?;
        Ok(Self {
            layout,
            grid,
            version: "2.3.7".into(),
            title: String::new(),
            source: String::new(),
            legacy_area: false,
            polygons: Vec::new(),
            node_polygon: vec![-1; grid.node_count()],
            bins: BTreeMap::new(),
        })
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Store areas the way older releases did: ten times the km² area as
    /// integers.
    pub fn with_legacy_area(mut self, legacy: bool) -> Self {
        self.legacy_area = legacy;
        self
    }

    #[inline] pub fn grid(&self) -> &BinGrid { &self.grid }

    /// Register a polygon and return its id. Negative `area` marks a
    /// river-lake.
    pub fn add_polygon(&mut self, parent: Option<usize>, area: f64) -> usize {
        self.polygons.push(PolygonRecord {
            parent: parent.map_or(-1, |p| p as i32),
            area,
            fraction: FULL_FRACTION,
        });
        self.polygons.len() - 1
    }

    /// Set the micro-fraction of the full-resolution area retained.
    pub fn set_fraction(&mut self, polygon: usize, fraction: i32) -> Result<&mut Self> {
        let n = self.polygons.len();
        let record = self.polygons.get_mut(polygon)
            .ok_or(ShoreError::PolygonIdOutOfRange { bin: 0, id: polygon as i64, len: n })?;
        record.fraction = fraction;
        Ok(self)
    }

    /// Levels at the SW, SE, NE and NW corners of `bin`.
    pub fn set_corner_levels(&mut self, bin: usize, levels: [u8; 4]) -> Result<&mut Self> {
        if levels.iter().any(|&l| l > MAX_LEVEL) {
            return Err(ShoreError::Format(format!("bin {bin}: corner levels {levels:?} above {MAX_LEVEL}")));
        }
        self.bin_mut(bin)?.corners = levels;
        Ok(self)
    }

    /// Polygons that determine the levels at the SW, SE, NE and NW corners
    /// of `bin`. Corners are grid nodes shared with neighbouring bins.
    pub fn set_corner_polygons(&mut self, bin: usize, polygons: [usize; 4]) -> Result<&mut Self> {
        self.check_bin(bin)?;
        for (node, polygon) in self.grid.corner_nodes(bin).into_iter().zip(polygons) {
            self.check_polygon(bin, polygon)?;
            self.node_polygon[node] = polygon as i32;
        }
        Ok(self)
    }

    /// Add a shoreline segment of `polygon` to `bin`. `None` sides mark a
    /// closed ring lying inside the bin.
    pub fn add_segment(
        &mut self,
        bin: usize,
        polygon: usize,
        level: u8,
        entry: Option<Side>,
        exit: Option<Side>,
        points: &[(u16, u16)],
    ) -> Result<&mut Self> {
        self.check_polygon(bin, polygon)?;
        let info = SegmentInfo { n: points.len(), level, entry, exit };
        // reject what the decoder would reject
        SegmentInfo::unpack(info.pack())?;
        if points.len() >= 1 << 22 {
            return Err(ShoreError::Format(format!("bin {bin}: segment of {} points is too long", points.len())));
        }
        self.bin_mut(bin)?.segments.push(SegmentRecord { info, polygon: polygon as i32, points: points.to_vec() });
        Ok(self)
    }

    /// Add a river or border polyline to `bin`.
    pub fn add_line(&mut self, bin: usize, level: u8, points: &[(u16, u16)]) -> Result<&mut Self> {
        if points.is_empty() || points.len() > i16::MAX as usize {
            return Err(ShoreError::Format(format!("bin {bin}: line with {} points", points.len())));
        }
        let info = SegmentInfo { n: points.len(), level, entry: None, exit: None };
        self.bin_mut(bin)?.segments.push(SegmentRecord { info, polygon: -1, points: points.to_vec() });
        Ok(self)
    }

    fn check_bin(&self, bin: usize) -> Result<()> {
        if bin >= self.grid.n_bin() {
            return Err(ShoreError::BinOutOfRange { index: bin, len: self.grid.n_bin() });
        }
        Ok(())
    }

    fn check_polygon(&self, bin: usize, polygon: usize) -> Result<()> {
        if polygon >= self.polygons.len() {
            return Err(ShoreError::PolygonIdOutOfRange { bin, id: polygon as i64, len: self.polygons.len() });
        }
        Ok(())
    }

    fn bin_mut(&mut self, bin: usize) -> Result<&mut BinRecord> {
        self.check_bin(bin)?;
        Ok(self.bins.entry(bin).or_default())
    }

    /// Lay the database out as named arrays.
    pub fn build(&self) -> Result<MemArrays> {
        let n_bin = self.grid.n_bin();
        let mut bin_firstseg = Vec::with_capacity(n_bin);
        let mut bin_nseg = Vec::with_capacity(n_bin);
        let mut bin_info = Vec::with_capacity(n_bin);
        let (mut seg_info, mut seg_start, mut seg_polygon) = (Vec::new(), Vec::new(), Vec::new());
        let (mut seg_npts, mut seg_level) = (Vec::new(), Vec::new());
        let (mut dx, mut dy) = (Vec::<i16>::new(), Vec::<i16>::new());

        for bin in 0..n_bin {
            let record = self.bins.get(&bin);
            let segments = record.map_or(&[][..], |r| &r.segments[..]);
            let [sw, se, ne, nw] = record.map_or([0; 4], |r| r.corners).map(|l| l as i16);

            bin_firstseg.push(seg_start.len() as i32);
            bin_nseg.push(i16::try_from(segments.len())
                .map_err(|_| ShoreError::Format(format!("bin {bin} holds too many segments")))?);
            bin_info.push(sw << 9 | se << 6 | ne << 3 | nw);

            for seg in segments {
                seg_start.push(dx.len() as i32);
                seg_info.push(seg.info.pack());
                seg_polygon.push(seg.polygon);
                seg_npts.push(seg.info.n as i16);
                seg_level.push(seg.info.level as i16);
                for &(x, y) in &seg.points {
                    dx.push(x as i16);
                    dy.push(y as i16);
                }
            }
        }

        let scalar = |v: usize| vec![v as i32];
        let mut db = MemArrays::new();
        db.set_attribute(ATTR_VERSION, self.version.as_str())
            .set_attribute(ATTR_TITLE, self.title.as_str())
            .set_attribute(ATTR_SOURCE, self.source.as_str())
            .put(BIN_SIZE, vec![self.grid.bin_size()])
            .put(BIN_NX, scalar(self.grid.nx()))
            .put(BIN_NY, scalar(self.grid.ny()))
            .put(N_BIN, scalar(n_bin))
            .put(N_SEG, scalar(seg_start.len()))
            .put(N_PT, scalar(dx.len()))
            .put(BIN_FIRSTSEG, bin_firstseg)
            .put(BIN_NSEG, bin_nseg)
            .put(SEG_START, seg_start)
            .put(PT_DX, dx)
            .put(PT_DY, dy)
            .set_var_attribute(PT_DX, ATTR_UNITS, "1/65535 of the bin size")
            .set_var_attribute(PT_DY, ATTR_UNITS, "1/65535 of the bin size");

        match self.layout {
            Layout::Lines => {
                db.put(SEG_NPTS, seg_npts).put(SEG_LEVEL, seg_level);
            }
            Layout::Shore => {
                db.put(BIN_INFO, bin_info)
                    .put(SEG_INFO, seg_info)
                    .put(SEG_POLYGON, seg_polygon)
                    .put(N_POLY, scalar(self.polygons.len()))
                    .put(N_NODE, scalar(self.node_polygon.len()))
                    .put(POLY_PARENT, self.polygons.iter().map(|p| p.parent).collect::<Vec<_>>())
                    .put(POLY_AREA_FRACTION, self.polygons.iter().map(|p| p.fraction).collect::<Vec<_>>())
                    .put(NODE_POLYGON, self.node_polygon.clone());
                if self.legacy_area {
                    let ten_times: Vec<i32> = self.polygons.iter().map(|p| (p.area * 10.0).round() as i32).collect();
                    db.put(POLY_AREA_LEGACY, ten_times);
                } else {
                    db.put(POLY_AREA, self.polygons.iter().map(|p| p.area).collect::<Vec<_>>());
                }
            }
        }
        Ok(db)
    }

    /// Build the database and write it to `path` as NetCDF.
    pub fn write(&self, path: impl AsRef<Path>, compress: bool) -> Result<()> {
        binarray::write(&self.build()?, path, compress)?;
        Ok(())
    }
}
