use geo::Coord;

use crate::{
    config::{LakeFilter, MAX_LEVEL},
    error::{Result, ShoreError},
};

use super::{side::Side, wrap::to_degrees};

/// Fill id reported for river-lakes in place of level 2.
pub const RIVERLAKE: u8 = 5;

/// One run of shoreline inside a bin, in fixed-point bin coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub level: u8,
    /// Same as `level`, or [`RIVERLAKE`] for polygons with negative area.
    pub fid: u8,
    /// Side the segment enters through; `None` for a closed interior ring.
    pub entry: Option<Side>,
    pub exit: Option<Side>,
    pub dx: Vec<u16>,
    pub dy: Vec<u16>,
}

/// Fields of a packed segment word: `n << 9 | level << 6 | entry << 3 | exit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentInfo {
    pub n: usize,
    pub level: u8,
    pub entry: Option<Side>,
    pub exit: Option<Side>,
}

impl SegmentInfo {
    pub fn unpack(word: i32) -> Result<Self> {
        if word < 0 {
            return Err(ShoreError::Format(format!("negative segment word {word}")));
        }
        let n = (word >> 9) as usize;
        let level = ((word >> 6) & 7) as u8;
        let side = |code: i32| -> Result<Option<Side>> {
            match code {
                4 => Ok(None),
                c => Side::from_code(c as u8).map(Some)
                    .ok_or_else(|| ShoreError::Format(format!("side code {c} in segment word {word}"))),
            }
        };
        let entry = side((word >> 3) & 7)?;
        let exit = side(word & 7)?;
        if entry.is_some() != exit.is_some() {
            return Err(ShoreError::Format(format!("segment word {word} mixes interior and edge sides")));
        }
        if level > MAX_LEVEL || n == 0 {
            return Err(ShoreError::Format(format!("segment word {word} has level {level} and {n} points")));
        }
        Ok(Self { n, level, entry, exit })
    }

    pub fn pack(&self) -> i32 {
        let code = |s: Option<Side>| s.map_or(4, |s| s.index() as i32);
        (self.n as i32) << 9 | (self.level as i32) << 6 | code(self.entry) << 3 | code(self.exit)
    }
}

impl Segment {
    /// Segment from bin-local points; `fid` starts equal to `level`.
    pub fn new(level: u8, entry: Option<Side>, exit: Option<Side>, points: Vec<(u16, u16)>) -> Self {
        let (dx, dy) = points.into_iter().unzip();
        Self { level, fid: level, entry, exit, dx, dy }
    }

    #[inline] pub fn len(&self) -> usize { self.dx.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.dx.is_empty() }
    #[inline] pub fn is_interior(&self) -> bool { self.entry.is_none() }

    #[inline] pub fn first_point(&self) -> (u16, u16) {
        (self.dx.first().copied().unwrap_or(0), self.dy.first().copied().unwrap_or(0))
    }

    #[inline] pub fn last_point(&self) -> (u16, u16) {
        (self.dx.last().copied().unwrap_or(0), self.dy.last().copied().unwrap_or(0))
    }
}

/// One bin's retained segments plus the levels at its four corners.
///
/// Produced by [`ShoreCatalog::get_bin`](super::ShoreCatalog::get_bin) and
/// turned into rings by [`DecodedBin::assemble`].
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedBin {
    pub(crate) bin: usize,
    pub(crate) lon_sw: f64,
    pub(crate) lat_sw: f64,
    pub(crate) bsize: f64,
    pub(crate) scale: f64,
    /// SW, SE, NE, NW.
    pub(crate) node_level: [u8; 4],
    pub(crate) leftmost: bool,
    pub(crate) ant_special: bool,
    pub(crate) min_level: u8,
    pub(crate) lakes: LakeFilter,
    pub(crate) segments: Vec<Segment>,
}

impl DecodedBin {
    /// Empty bin `bin` with its south-west corner at (`lon_sw`, `lat_sw`)
    /// and sides of `bsize` degrees; all corners at level 0.
    pub fn new(bin: usize, lon_sw: f64, lat_sw: f64, bsize: f64) -> Self {
        Self {
            bin,
            lon_sw,
            lat_sw,
            bsize,
            scale: bsize / 65535.0,
            node_level: [0; 4],
            leftmost: false,
            ant_special: false,
            min_level: 0,
            lakes: LakeFilter::KeepAll,
            segments: Vec::new(),
        }
    }

    pub fn with_node_levels(mut self, levels: [u8; 4]) -> Self {
        self.node_level = levels;
        self
    }

    pub fn with_min_level(mut self, min_level: u8) -> Self {
        self.min_level = min_level;
        self
    }

    pub fn with_lake_filter(mut self, lakes: LakeFilter) -> Self {
        self.lakes = lakes;
        self
    }

    pub fn with_leftmost(mut self, leftmost: bool) -> Self {
        self.leftmost = leftmost;
        self
    }

    pub fn with_antarctica_split(mut self, ant_special: bool) -> Self {
        self.ant_special = ant_special;
        self
    }

    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Global bin id.
    #[inline] pub fn bin(&self) -> usize { self.bin }
    #[inline] pub fn sw_corner(&self) -> (f64, f64) { (self.lon_sw, self.lat_sw) }
    #[inline] pub fn bsize(&self) -> f64 { self.bsize }
    #[inline] pub fn scale(&self) -> f64 { self.scale }
    #[inline] pub fn node_levels(&self) -> [u8; 4] { self.node_level }
    #[inline] pub fn is_leftmost(&self) -> bool { self.leftmost }
    #[inline] pub fn is_antarctica_split(&self) -> bool { self.ant_special }
    #[inline] pub fn segments(&self) -> &[Segment] { &self.segments }
    #[inline] pub fn n_points(&self) -> usize { self.segments.iter().map(Segment::len).sum() }

    /// Release the bin's segments.
    pub fn free(self) {}

    /// Degrees of a bin-local fixed-point coordinate.
    #[inline] pub fn to_degrees(&self, x: u16, y: u16) -> Coord<f64> {
        to_degrees(self.lon_sw, self.lat_sw, self.scale, x, y)
    }

    pub(crate) fn segment_coords<'a>(&'a self, seg: &'a Segment) -> impl Iterator<Item = Coord<f64>> + 'a {
        seg.dx.iter().zip(&seg.dy).map(move |(&x, &y)| self.to_degrees(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_word_round_trip() {
        let info = SegmentInfo { n: 300, level: 2, entry: Some(Side::West), exit: Some(Side::North) };
        assert_eq!(info.pack(), 300 << 9 | 2 << 6 | 3 << 3 | 2);
        assert_eq!(SegmentInfo::unpack(info.pack()).unwrap(), info);
    }

    #[test]
    fn interior_word() {
        let info = SegmentInfo::unpack(6 << 9 | 1 << 6 | 4 << 3 | 4).unwrap();
        assert_eq!((info.n, info.level, info.entry, info.exit), (6, 1, None, None));
    }

    #[test]
    fn mixed_interior_word_is_malformed() {
        assert!(matches!(SegmentInfo::unpack(6 << 9 | 1 << 6 | 4 << 3 | 1), Err(ShoreError::Format(_))));
        assert!(matches!(SegmentInfo::unpack(6 << 9 | 1 << 6 | 5 << 3 | 5), Err(ShoreError::Format(_))));
        assert!(matches!(SegmentInfo::unpack(1 << 6 | 1 << 3 | 2), Err(ShoreError::Format(_))));
    }

    #[test]
    fn degrees_use_the_bin_corner() {
        let bin = DecodedBin::new(0, 10.0, -20.0, 5.0);
        let c = bin.to_degrees(65535, 0);
        assert!((c.x - 15.0).abs() < 1e-12);
        assert_eq!(c.y, -20.0);
    }
}
