//! River and border databases. They share the bin layout of the shoreline
//! database but store plain polylines with a level and no polygon tables.

use binarray::{ArrayReader, NcArrays};
use geo::LineString;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    common::{find_database, names::*, DbKind},
    config::{Region, Resolution, ShoreConfig},
    error::{Result, ShoreError},
    shore::{
        catalog::{read_header, read_selected, Selection},
        wrap::{path_shift, to_degrees},
        BinGrid, DbInfo, ShorePolygon,
    },
};

/// Which line database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    River,
    Border,
}

impl From<LineKind> for DbKind {
    fn from(kind: LineKind) -> Self {
        match kind {
            LineKind::River => DbKind::River,
            LineKind::Border => DbKind::Border,
        }
    }
}

/// One polyline of a line database, in fixed-point bin coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineSegment {
    pub level: u8,
    pub dx: Vec<u16>,
    pub dy: Vec<u16>,
}

/// The retained polylines of one bin.
#[derive(Clone, Debug, PartialEq)]
pub struct LineBin {
    bin: usize,
    lon_sw: f64,
    lat_sw: f64,
    bsize: f64,
    segments: Vec<LineSegment>,
}

impl LineBin {
    #[inline] pub fn bin(&self) -> usize { self.bin }
    #[inline] pub fn sw_corner(&self) -> (f64, f64) { (self.lon_sw, self.lat_sw) }
    #[inline] pub fn segments(&self) -> &[LineSegment] { &self.segments }
    #[inline] pub fn is_empty(&self) -> bool { self.segments.is_empty() }

    /// True when the bin's longitude span crosses `edge + 180`, the seam
    /// of a world map centred on `edge`.
    pub fn straddles(&self, edge: f64) -> bool {
        let (left, right) = (self.lon_sw, self.lon_sw + self.bsize);
        left - edge <= 180.0 && right - edge > 180.0
    }

    /// Polylines in degrees with `fid == level`; with `shift`, longitudes
    /// at or past `edge` move back by 360°.
    pub fn assemble(&self, shift: bool, edge: f64) -> Vec<ShorePolygon> {
        let scale = self.bsize / 65535.0;
        self.segments.iter().map(|seg| {
            let mut line: LineString<f64> = seg.dx.iter().zip(&seg.dy)
                .map(|(&x, &y)| to_degrees(self.lon_sw, self.lat_sw, scale, x, y))
                .collect();
            if shift {
                path_shift(&mut line.0, edge);
            }
            ShorePolygon::new(line, seg.level)
        }).collect()
    }

    pub fn free(self) {}
}

/// An opened river or border database restricted to one query region.
pub struct LineCatalog<R: ArrayReader = NcArrays> {
    reader: R,
    kind: LineKind,
    resolution: Resolution,
    sel: Selection,
    info: DbInfo,
    bin_firstseg: Vec<i32>,
    bin_nseg: Vec<i32>,
}

impl LineCatalog<NcArrays> {
    pub fn open(config: &ShoreConfig, kind: LineKind, resolution: Resolution, region: &Region) -> Result<Self> {
        let path = find_database(config, kind.into(), resolution)?;
        debug!("[lines] opening {}", path.display());
        Self::init(NcArrays::open(&path)?, kind, resolution, region)
    }
}

impl<R: ArrayReader> LineCatalog<R> {
    pub fn init(mut reader: R, kind: LineKind, resolution: Resolution, region: &Region) -> Result<Self> {
        let (grid, info) = read_header(&mut reader)?;
        let sel = Selection::new(grid, region, false)?;
        debug!("[lines] {:?}: {} of {} bins selected", kind, sel.bins.len(), info.n_bin);
        let bin_firstseg = read_selected(&mut reader, BIN_FIRSTSEG, info.n_bin, &sel.bins)?;
        let bin_nseg = read_selected(&mut reader, BIN_NSEG, info.n_bin, &sel.bins)?;
        Ok(Self { reader, kind, resolution, sel, info, bin_firstseg, bin_nseg })
    }

    #[inline] pub fn kind(&self) -> LineKind { self.kind }
    #[inline] pub fn resolution(&self) -> Resolution { self.resolution }
    #[inline] pub fn info(&self) -> &DbInfo { &self.info }
    #[inline] pub fn grid(&self) -> &BinGrid { &self.sel.grid }
    #[inline] pub fn region(&self) -> &Region { &self.sel.region }
    #[inline] pub fn n_bins(&self) -> usize { self.sel.bins.len() }
    #[inline] pub fn bin_id(&self, index: usize) -> Option<usize> { self.sel.bins.get(index).copied() }
    #[inline] pub fn is_world(&self) -> bool { self.sel.is_world }

    /// Decode the `index`-th selected bin, keeping segments whose level is
    /// in `levels` (all of them when `levels` is empty).
    pub fn get_bin(&mut self, index: usize, levels: &[u8]) -> Result<LineBin> {
        let bin = self.sel.bin(index)?;
        let (lon_sw, lat_sw) = self.sel.grid.sw_corner(bin);
        let mut out = LineBin { bin, lon_sw, lat_sw, bsize: self.sel.grid.bsize(), segments: Vec::new() };

        let n_seg = usize::try_from(self.bin_nseg[index])
            .map_err(|_| ShoreError::Format(format!("bin {bin}: negative segment count")))?;
        if n_seg == 0 {
            return Ok(out);
        }
        let first = usize::try_from(self.bin_firstseg[index])
            .map_err(|_| ShoreError::Format(format!("bin {bin}: negative first segment")))?;

        let seg_n = self.reader.read_i32(SEG_NPTS, first, n_seg)?;
        let seg_level = self.reader.read_i32(SEG_LEVEL, first, n_seg)?;
        let seg_start = self.reader.read_i32(SEG_START, first, n_seg)?;

        for ((&n, &level), &start) in seg_n.iter().zip(&seg_level).zip(&seg_start) {
            let level = u8::try_from(level)
                .map_err(|_| ShoreError::Format(format!("bin {bin}: line level {level}")))?;
            if !levels.is_empty() && !levels.contains(&level) { continue }
            let (Ok(n), Ok(start)) = (usize::try_from(n), usize::try_from(start)) else {
                return Err(ShoreError::Format(format!("bin {bin}: line with {n} points at {start}")));
            };
            let dx = self.reader.read_i16(PT_DX, start, n)?;
            let dy = self.reader.read_i16(PT_DY, start, n)?;
            out.segments.push(LineSegment {
                level,
                dx: dx.into_iter().map(|v| v as u16).collect(),
                dy: dy.into_iter().map(|v| v as u16).collect(),
            });
        }

        debug!("[lines] bin {bin}: {} of {n_seg} lines kept", out.segments.len());
        Ok(out)
    }

    pub fn close(mut self) -> Result<()> {
        self.reader.close()?;
        Ok(())
    }
}
