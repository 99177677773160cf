//! Opening a shoreline database and decoding the bins a query touches.

use ahash::AHashSet;
use binarray::{ArrayReader, NcArrays};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    common::{find_database, names::*, DbKind, DbVersion, MIN_VERSION},
    config::{LakeFilter, Region, Resolution, ShoreConfig, ShoreSelect},
    error::{Result, ShoreError},
};

use super::{
    bin::{DecodedBin, Segment, SegmentInfo, RIVERLAKE},
    grid::{leftmost_bin, BinGrid, ANTARCTICA_LIMIT},
};

/// Descriptive metadata and element counts of an opened database.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DbInfo {
    pub version: String,
    pub title: String,
    pub source: String,
    /// Unit attribute of the point arrays, if present.
    pub units: Option<String>,
    pub n_bin: usize,
    pub n_seg: usize,
    pub n_pt: usize,
    pub n_poly: usize,
    pub n_node: usize,
}

/// Read the global attributes and the bin layout shared by all binned
/// databases, rejecting releases older than [`MIN_VERSION`].
pub(crate) fn read_header<R: ArrayReader>(reader: &mut R) -> Result<(BinGrid, DbInfo)> {
    let version = reader.attribute(None, ATTR_VERSION)?;
    let parsed: DbVersion = version.parse()?;
    if parsed < MIN_VERSION {
        return Err(ShoreError::Format(format!("database version {parsed} is older than {MIN_VERSION}")));
    }
    let title = reader.attribute(None, ATTR_TITLE).unwrap_or_default();
    let source = reader.attribute(None, ATTR_SOURCE).unwrap_or_default();
    let units = reader.attribute(Some(PT_DX), ATTR_UNITS).ok();

    let count = |reader: &mut R, name: &str| -> Result<usize> {
        let v = reader.read_scalar(name)?;
        usize::try_from(v).map_err(|_| ShoreError::Format(format!("{name} is negative ({v})")))
    };
    let optional = |reader: &mut R, name: &str| -> Result<usize> {
        if reader.has_variable(name) { count(reader, name) } else { Ok(0) }
    };

    let bin_size = reader.read_scalar(BIN_SIZE)?;
    let bin_size = i32::try_from(bin_size)
        .map_err(|_| ShoreError::Format(format!("bin size {bin_size} out of range")))?;
    let nx = count(reader, BIN_NX)?;
    let ny = count(reader, BIN_NY)?;
    let n_bin = count(reader, N_BIN)?;
    let grid = BinGrid::new(bin_size, nx, ny, n_bin)?;

    let info = DbInfo {
        version,
        title,
        source,
        units,
        n_bin,
        n_seg: count(reader, N_SEG)?,
        n_pt: count(reader, N_PT)?,
        n_poly: optional(reader, N_POLY)?,
        n_node: optional(reader, N_NODE)?,
    };
    Ok((grid, info))
}

/// Region, grid and selection state common to shoreline and line catalogs.
#[derive(Clone, Debug)]
pub(crate) struct Selection {
    pub region: Region,
    pub grid: BinGrid,
    pub bins: Vec<usize>,
    pub west_border: f64,
    pub east_border: f64,
    pub is_world: bool,
}

impl Selection {
    pub fn new(grid: BinGrid, region: &Region, skip_antarctica: bool) -> Result<Self> {
        let region = region.normalized()?;
        let (iw, ie, _, _) = grid.expand(&region);
        let bins = grid.select(&region, skip_antarctica);
        if bins.is_empty() {
            return Err(ShoreError::InvalidRegion(format!("{region} selects none of the database's bins")));
        }
        Ok(Self {
            region,
            grid,
            bins,
            west_border: iw as f64 / 60.0,
            east_border: ie as f64 / 60.0,
            is_world: 360.0 - region.width().abs() < grid.bsize(),
        })
    }

    pub fn bin(&self, index: usize) -> Result<usize> {
        self.bins.get(index).copied()
            .ok_or(ShoreError::BinOutOfRange { index, len: self.bins.len() })
    }

    pub fn leftmost(&self, lon_sw: f64) -> bool {
        leftmost_bin(lon_sw, self.grid.bsize(), self.region.west, self.is_world)
    }
}

/// Read `name` for the selected bins only.
pub(crate) fn read_selected<R: ArrayReader>(reader: &mut R, name: &str, n_bin: usize, bins: &[usize]) -> Result<Vec<i32>> {
    let all = reader.read_i32(name, 0, n_bin)?;
    Ok(bins.iter().map(|&b| all[b]).collect())
}

/// An opened shoreline database restricted to the bins of one query.
///
/// Built by [`ShoreCatalog::open`] (or [`ShoreCatalog::init`] for any
/// [`ArrayReader`]); bins are then decoded one at a time with
/// [`ShoreCatalog::get_bin`].
pub struct ShoreCatalog<R: ArrayReader = NcArrays> {
    reader: R,
    resolution: Resolution,
    select: ShoreSelect,
    sel: Selection,
    info: DbInfo,

    // per selected bin
    bin_firstseg: Vec<i32>,
    bin_info: Vec<i32>,
    bin_nseg: Vec<i32>,

    // per polygon
    poly_parent: Vec<i32>,
    poly_area: Vec<f64>,
    poly_fraction: Vec<i32>,

    /// Per grid node; empty unless an area or lake filter is active.
    node_polygon: Vec<i32>,
}

impl ShoreCatalog<NcArrays> {
    /// Locate and open the shoreline database for `resolution`.
    pub fn open(config: &ShoreConfig, resolution: Resolution, region: &Region, select: &ShoreSelect) -> Result<Self> {
        let path = find_database(config, DbKind::Shore, resolution)?;
        debug!("[shore::catalog] opening {}", path.display());
        let reader = NcArrays::open(&path)?;
        Self::init(reader, resolution, region, select)
    }
}

impl<R: ArrayReader> ShoreCatalog<R> {
    /// Read the database metadata and the tables needed to decode the bins
    /// overlapping `region`.
    pub fn init(mut reader: R, resolution: Resolution, region: &Region, select: &ShoreSelect) -> Result<Self> {
        let (grid, info) = read_header(&mut reader)?;
        let sel = Selection::new(grid, region, select.skips_antarctica())?;
        debug!(
            "[shore::catalog] {} bins of {} minutes, {} selected for {}",
            info.n_bin, grid.bin_size(), sel.bins.len(), sel.region,
        );

        let n_poly = info.n_poly;
        let poly_parent = reader.read_i32(POLY_PARENT, 0, n_poly)?;
        let poly_fraction = reader.read_i32(POLY_AREA_FRACTION, 0, n_poly)?;
        let poly_area = if reader.has_variable(POLY_AREA) {
            reader.read_f64(POLY_AREA, 0, n_poly)?
        } else if reader.has_variable(POLY_AREA_LEGACY) {
            warn!("database stores ten times the polygon areas, rescaling");
            reader.read_f64(POLY_AREA_LEGACY, 0, n_poly)?.into_iter().map(|a| a * 0.1).collect()
        } else {
            return Err(ShoreError::Format("no polygon area variable".into()));
        };

        let node_polygon = if select.min_area > 0.0 || select.suppresses_lakes() {
            if info.n_node < grid.node_count() {
                return Err(ShoreError::Format(format!(
                    "{} node polygons for a grid of {} nodes", info.n_node, grid.node_count(),
                )));
            }
            reader.read_i32(NODE_POLYGON, 0, info.n_node)?
        } else {
            Vec::new()
        };

        let bin_firstseg = read_selected(&mut reader, BIN_FIRSTSEG, info.n_bin, &sel.bins)?;
        let bin_info = read_selected(&mut reader, BIN_INFO, info.n_bin, &sel.bins)?;
        let bin_nseg = read_selected(&mut reader, BIN_NSEG, info.n_bin, &sel.bins)?;

        Ok(Self {
            reader,
            resolution,
            select: *select,
            sel,
            info,
            bin_firstseg,
            bin_info,
            bin_nseg,
            poly_parent,
            poly_area,
            poly_fraction,
            node_polygon,
        })
    }

    /// Number of selected bins.
    #[inline] pub fn n_bins(&self) -> usize { self.sel.bins.len() }
    /// Global id of the `index`-th selected bin.
    #[inline] pub fn bin_id(&self, index: usize) -> Option<usize> { self.sel.bins.get(index).copied() }
    #[inline] pub fn bins(&self) -> &[usize] { &self.sel.bins }
    #[inline] pub fn info(&self) -> &DbInfo { &self.info }
    #[inline] pub fn grid(&self) -> &BinGrid { &self.sel.grid }
    #[inline] pub fn resolution(&self) -> Resolution { self.resolution }
    /// Query region after normalisation.
    #[inline] pub fn region(&self) -> &Region { &self.sel.region }
    #[inline] pub fn select(&self) -> &ShoreSelect { &self.select }
    /// West edge of the region rounded out to whole bins.
    #[inline] pub fn west_border(&self) -> f64 { self.sel.west_border }
    /// East edge of the region rounded out to whole bins.
    #[inline] pub fn east_border(&self) -> f64 { self.sel.east_border }
    /// True when the region spans the globe to within one bin.
    #[inline] pub fn is_world(&self) -> bool { self.sel.is_world }
    /// Global id of the bin containing the point.
    #[inline] pub fn bin_at(&self, lon: f64, lat: f64) -> Option<usize> { self.sel.grid.bin_at(lon, lat) }

    /// Decode the `index`-th selected bin, applying the level, area,
    /// fraction and lake filters.
    pub fn get_bin(&mut self, index: usize) -> Result<DecodedBin> {
        let bin = self.sel.bin(index)?;
        let grid = self.sel.grid;
        let (lon_sw, lat_sw) = grid.sw_corner(bin);
        let bsize = grid.bsize();
        let max_level = self.select.max_level();
        let min_area = self.select.min_area;

        let packed = self.bin_info[index];
        let mut node_level = [9, 6, 3, 0].map(|shift| (((packed >> shift) & 7) as u8).min(max_level));

        let mut node_poly = [-1i64; 4];
        if !self.node_polygon.is_empty() {
            for (slot, node) in node_poly.iter_mut().zip(grid.corner_nodes(bin)) {
                *slot = self.node_polygon.get(node).copied()
                    .ok_or_else(|| ShoreError::Format(format!("bin {bin}: node {node} outside the node table")))?
                    as i64;
            }
        }

        if min_area > 0.0 {
            for (level, id) in node_level.iter_mut().zip(node_poly.iter_mut()) {
                while *level > 0 && self.area(bin, *id)?.abs() < min_area {
                    *id = self.parent(bin, *id)?;
                    *level -= 1;
                }
            }
        }

        let n_seg = usize::try_from(self.bin_nseg[index])
            .map_err(|_| ShoreError::Format(format!("bin {bin}: negative segment count")))?;
        let first = usize::try_from(self.bin_firstseg[index])
            .map_err(|_| ShoreError::Format(format!("bin {bin}: negative first segment")))?;

        let (infos, starts, polys) = if n_seg > 0 {
            let infos = self.reader.read_i32(SEG_INFO, first, n_seg)?
                .into_iter()
                .map(SegmentInfo::unpack)
                .collect::<Result<Vec<_>>>()?;
            let starts = self.reader.read_i32(SEG_START, first, n_seg)?;
            let polys = self.reader.read_i32(SEG_POLYGON, first, n_seg)?;
            (infos, starts, polys)
        } else {
            Default::default()
        };
        for &id in &polys {
            self.check_polygon(bin, id as i64)?;
        }

        let lakes = self.select.lakes;
        let mut skip: Vec<bool> = infos.iter().zip(&polys).map(|(info, &id)| {
            let id = id as usize;
            let area = self.poly_area[id];
            self.poly_fraction[id] < self.select.fraction
                || area.abs() < min_area
                || info.level < self.select.min_level()
                || info.level > max_level
                || (info.level == 2 && area < 0.0 && lakes == LakeFilter::NoRiverLakes)
                || (info.level == 2 && area > 0.0 && lakes == LakeFilter::NoLakes)
        }).collect();

        if lakes == LakeFilter::NoLakes && node_level.iter().all(|&l| l == 2) {
            skip.iter_mut().for_each(|s| *s = true);
            node_level = [1; 4];
        } else if self.select.suppresses_lakes() {
            self.drop_orphans(bin, &infos, &polys, &mut skip, &mut node_level, &node_poly)?;
        }

        let mut decoded = DecodedBin::new(bin, lon_sw, lat_sw, bsize)
            .with_node_levels(node_level)
            .with_min_level(self.select.min_level())
            .with_lake_filter(lakes)
            .with_leftmost(self.sel.leftmost(lon_sw))
            .with_antarctica_split(
                self.select.skips_antarctica() && lat_sw < ANTARCTICA_LIMIT && lat_sw + bsize > ANTARCTICA_LIMIT,
            );

        for ((info, &start), (&id, &skipped)) in infos.iter().zip(&starts).zip(polys.iter().zip(&skip)) {
            if skipped { continue }
            let start = usize::try_from(start)
                .map_err(|_| ShoreError::Format(format!("bin {bin}: negative point offset")))?;
            let dx = self.reader.read_i16(PT_DX, start, info.n)?;
            let dy = self.reader.read_i16(PT_DY, start, info.n)?;
            let fid = if self.poly_area[id as usize] < 0.0 { RIVERLAKE } else { info.level };
            decoded.push_segment(Segment {
                level: info.level,
                fid,
                entry: info.entry,
                exit: info.exit,
                dx: dx.into_iter().map(|v| v as u16).collect(),
                dy: dy.into_iter().map(|v| v as u16).collect(),
            });
        }

        debug!(
            "[shore::catalog] bin {bin}: {} of {n_seg} segments kept, corners {:?}",
            decoded.segments().len(), decoded.node_levels(),
        );
        Ok(decoded)
    }

    /// Drop level-3 and level-4 segments whose parent polygon was dropped in
    /// this bin, then lower the corners those children determined.
    fn drop_orphans(
        &self,
        bin: usize,
        infos: &[SegmentInfo],
        polys: &[i32],
        skip: &mut [bool],
        node_level: &mut [u8; 4],
        node_poly: &[i64; 4],
    ) -> Result<()> {
        let mut dropped: AHashSet<i64> = infos.iter().zip(polys).zip(skip.iter())
            .filter(|&((info, _), &s)| s && info.level == 2)
            .map(|((_, &id), _)| id as i64)
            .collect();
        let mut orphans = AHashSet::new();

        for feature in [3u8, 4] {
            for i in 0..infos.len() {
                if infos[i].level != feature || skip[i] { continue }
                let parent = self.parent(bin, polys[i] as i64)?;
                let parent_dropped = infos.iter().zip(polys).zip(skip.iter())
                    .any(|((info, &id), &s)| s && info.level == feature - 1 && id as i64 == parent);
                if parent_dropped {
                    skip[i] = true;
                    dropped.insert(polys[i] as i64);
                    orphans.insert(polys[i] as i64);
                }
            }
        }
        if orphans.is_empty() {
            return Ok(());
        }

        for (level, &start) in node_level.iter_mut().zip(node_poly) {
            if !orphans.contains(&start) { continue }
            let mut id = start;
            while *level > 0 && dropped.contains(&id) {
                id = self.parent(bin, id)?;
                *level -= 1;
            }
        }
        Ok(())
    }

    fn check_polygon(&self, bin: usize, id: i64) -> Result<usize> {
        let len = self.poly_area.len();
        usize::try_from(id).ok()
            .filter(|&i| i < len)
            .ok_or(ShoreError::PolygonIdOutOfRange { bin, id, len })
    }

    fn area(&self, bin: usize, id: i64) -> Result<f64> {
        Ok(self.poly_area[self.check_polygon(bin, id)?])
    }

    fn parent(&self, bin: usize, id: i64) -> Result<i64> {
        let i = self.check_polygon(bin, id)?;
        Ok(self.poly_parent.get(i).copied().unwrap_or(-1) as i64)
    }

    /// Release the reader and every table.
    pub fn close(mut self) -> Result<()> {
        self.reader.close()?;
        Ok(())
    }
}
