use geo::{Coord, LineString};
use tracing::trace;

use crate::{
    config::{Direction, LakeFilter, MAX_LEVEL},
    error::{Result, ShoreError},
};

use super::{
    bin::{DecodedBin, Segment, RIVERLAKE},
    grid::ANTARCTICA_LIMIT,
    side::{CrossingKind, Side, SideIndex},
    wrap::path_shift2,
    ShorePolygon,
};

impl DecodedBin {
    /// Turn the bin's segments into rings (`assemble == true`) or open
    /// lines, with longitudes wrapped into the `west..east` window.
    ///
    /// Rings are traced counter-clockwise for [`Direction::Land`] and
    /// clockwise for [`Direction::Water`]. A bin with no edge-crossing
    /// segments yields its own outline when its corner level has the
    /// parity painted in `dir`.
    pub fn assemble(&self, dir: Direction, assemble: bool, west: f64, east: f64) -> Result<Vec<ShorePolygon>> {
        let mut out = if assemble { self.stitch(dir)? } else { self.open_lines() };
        for poly in &mut out {
            path_shift2(&mut poly.ring.0, west, east, self.leftmost);
        }
        Ok(out)
    }

    fn open_lines(&self) -> Vec<ShorePolygon> {
        self.segments.iter()
            .map(|seg| ShorePolygon {
                ring: self.segment_coords(seg).collect(),
                level: seg.level,
                fid: seg.fid,
                interior: false,
            })
            .filter(|p| !self.south_of_split(&p.ring))
            .collect()
    }

    fn stitch(&self, dir: Direction) -> Result<Vec<ShorePolygon>> {
        let node_level = self.capped_node_levels();
        let high_level = node_level.iter().copied().max().unwrap_or(0);
        let use_this_level = high_level % 2 == dir.parity() && high_level >= self.min_level;

        if self.segments.is_empty() && !use_this_level {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        let completely_inside = self.segments.iter().all(Segment::is_interior);
        if completely_inside && use_this_level {
            let level = if node_level[0] == 2 && self.lakes == LakeFilter::NoLakes { 1 } else { node_level[0] };
            let ring = self.outline(dir);
            if !self.south_of_split(&ring) {
                out.push(ShorePolygon { ring, level, fid: level, interior: false });
            }
        }

        let mut sides = SideIndex::build(self, dir);
        while sides.remaining() > 0 {
            let poly = self.walk_ring(&mut sides, &node_level)?;
            if !self.south_of_split(&poly.ring) {
                out.push(poly);
            }
        }

        for seg in self.segments.iter().filter(|s| s.is_interior()) {
            let ring: LineString<f64> = self.segment_coords(seg).collect();
            if !self.south_of_split(&ring) {
                out.push(ShorePolygon { ring, level: seg.level, fid: seg.fid, interior: true });
            }
        }

        trace!("[shore::assemble] bin {}: {} rings", self.bin, out.len());
        Ok(out)
    }

    /// Corner levels capped by the highest level among edge-crossing
    /// segments, or by the lowest corner when the bin has no segments.
    fn capped_node_levels(&self) -> [u8; 4] {
        let high_seg_level = if self.segments.is_empty() {
            self.node_level.iter().copied().min().unwrap_or(0).min(MAX_LEVEL)
        } else {
            self.segments.iter()
                .filter(|s| !s.is_interior())
                .map(|s| s.level)
                .max()
                .unwrap_or(MAX_LEVEL)
        };
        self.node_level.map(|l| l.min(high_seg_level))
    }

    /// Follow crossings from the first unused segment until the walk
    /// returns to its start.
    fn walk_ring(&self, sides: &mut SideIndex, node_level: &[u8; 4]) -> Result<ShorePolygon> {
        let dir = sides.direction();
        let (start_side, first) = sides.first_entry(Side::South)
            .ok_or(ShoreError::UnclosedRing { bin: self.bin, side: 0, steps: 0 })?;
        let unclosed = |steps| ShoreError::UnclosedRing { bin: self.bin, side: start_side as u8, steps };

        let seg = &self.segments[first];
        let (x0, y0) = seg.first_point();
        let first_pos = start_side.position(x0, y0);
        let fid = seg.fid;
        let mut low = seg.level.min(MAX_LEVEL);
        let mut coords: Vec<Coord<f64>> = self.segment_coords(seg).collect();
        let (mut side, mut from) = self.exit_of(seg).ok_or_else(|| unclosed(0))?;

        let max_steps = self.segments.len() + 4;
        for step in 1..=max_steps {
            let crossing = sides.next_entry(side, from).ok_or_else(|| unclosed(step))?;
            match crossing.kind {
                CrossingKind::Corner(corner) => {
                    coords.push(self.corner_coord(corner, dir));
                    low = low.min(node_level[corner_node(corner, dir)]);
                    side = corner.step(dir);
                    from = sides.side_start();
                }
                CrossingKind::Segment(id) => {
                    if side == start_side && crossing.pos == first_pos {
                        coords.push(coords[0]);
                        let level = ring_level(low, dir);
                        let fid = if level == 2 && fid == RIVERLAKE { RIVERLAKE } else { level };
                        return Ok(ShorePolygon { ring: LineString(coords), level, fid, interior: false });
                    }
                    let seg = &self.segments[id];
                    coords.extend(self.segment_coords(seg));
                    low = low.min(seg.level);
                    (side, from) = self.exit_of(seg).ok_or_else(|| unclosed(step))?;
                }
            }
        }
        Err(unclosed(max_steps))
    }

    /// Exit side of an edge segment and its position along that side.
    fn exit_of(&self, seg: &Segment) -> Option<(Side, u16)> {
        let exit = seg.exit?;
        let (x, y) = seg.last_point();
        Some((exit, exit.position(x, y)))
    }

    /// Coordinate of the corner that ends `side` when walking in `dir`.
    fn corner_coord(&self, side: Side, dir: Direction) -> Coord<f64> {
        let (w, s) = (self.lon_sw, self.lat_sw);
        let (e, n) = (w + self.bsize, s + self.bsize);
        let (x, y) = match (dir, side) {
            (Direction::Land, Side::South) => (e, s),
            (Direction::Land, Side::East) => (e, n),
            (Direction::Land, Side::North) => (w, n),
            (Direction::Land, Side::West) => (w, s),
            (Direction::Water, Side::South) => (w, s),
            (Direction::Water, Side::East) => (e, s),
            (Direction::Water, Side::North) => (e, n),
            (Direction::Water, Side::West) => (w, n),
        };
        Coord { x, y }
    }

    /// Closed outline of the whole bin, traced in `dir`.
    fn outline(&self, dir: Direction) -> LineString<f64> {
        let (w, s) = (self.lon_sw, self.lat_sw);
        let (e, n) = (w + self.bsize, s + self.bsize);
        let pts = match dir {
            Direction::Land => [(w, s), (e, s), (e, n), (w, n), (w, s)],
            Direction::Water => [(w, s), (w, n), (e, n), (e, s), (w, s)],
        };
        pts.into_iter().map(|(x, y)| Coord { x, y }).collect()
    }

    /// True for pieces lying wholly at or south of 60°S in a bin split there.
    fn south_of_split(&self, ring: &LineString<f64>) -> bool {
        self.ant_special && ring.0.iter().all(|c| c.y <= ANTARCTICA_LIMIT)
    }
}

/// Node (SW, SE, NE, NW) whose level applies at the corner ending `side`.
#[inline]
fn corner_node(side: Side, dir: Direction) -> usize {
    match dir {
        Direction::Land => (side.index() + 1) % 4,
        Direction::Water => side.index(),
    }
}

/// Level of a stitched ring from the lowest level met along it: odd for
/// land walks, even for water walks.
#[inline]
pub(crate) fn ring_level(low: u8, dir: Direction) -> u8 {
    let low = low as i32;
    let level = match dir {
        Direction::Land => 2 * ((low - 1) / 2) + 1,
        Direction::Water => 2 * (low / 2),
    };
    level as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const E: Option<Side> = Some(Side::East);
    const W: Option<Side> = Some(Side::West);

    fn west_to_east() -> DecodedBin {
        let mut bin = DecodedBin::new(7, 10.0, 20.0, 1.0).with_node_levels([0, 0, 1, 1]);
        bin.push_segment(Segment::new(1, W, E, vec![(0, 65435), (20000, 30000), (40000, 35000), (65535, 40000)]));
        bin
    }

    fn is_closed(p: &ShorePolygon) -> bool {
        p.ring.0.len() >= 4 && p.ring.0.first() == p.ring.0.last()
    }

    #[test]
    fn ring_levels_follow_parity() {
        assert_eq!(ring_level(0, Direction::Land), 1);
        assert_eq!(ring_level(1, Direction::Land), 1);
        assert_eq!(ring_level(2, Direction::Land), 1);
        assert_eq!(ring_level(3, Direction::Land), 3);
        assert_eq!(ring_level(1, Direction::Water), 0);
        assert_eq!(ring_level(2, Direction::Water), 2);
        assert_eq!(ring_level(4, Direction::Water), 4);
    }

    #[test]
    fn single_crossing_gets_two_corners() {
        let bin = west_to_east();
        let rings = bin.assemble(Direction::Land, true, 0.0, 360.0).unwrap();
        assert_eq!(rings.len(), 1);
        let ring = &rings[0];
        assert!(!ring.interior);
        assert!(is_closed(ring));
        // 4 segment points, NE and NW corners, closing point
        assert_eq!(ring.ring.0.len(), 4 + 2 + 1);
        assert_eq!(ring.ring.0[4], Coord { x: 11.0, y: 21.0 });
        assert_eq!(ring.ring.0[5], Coord { x: 10.0, y: 21.0 });
        assert_eq!(ring.level, 1);
    }

    #[test]
    fn water_walk_goes_the_other_way() {
        let bin = west_to_east();
        let rings = bin.assemble(Direction::Water, true, 0.0, 360.0).unwrap();
        assert_eq!(rings.len(), 1);
        let ring = &rings[0].ring.0;
        assert_eq!(ring.len(), 4 + 2 + 1);
        assert_eq!(ring[4], Coord { x: 11.0, y: 20.0 });
        assert_eq!(ring[5], Coord { x: 10.0, y: 20.0 });
        assert_eq!(rings[0].level, 0);
    }

    #[test]
    fn interior_segment_is_its_own_ring() {
        let mut bin = DecodedBin::new(0, 0.0, 0.0, 1.0).with_min_level(1);
        bin.push_segment(Segment::new(1, None, None, vec![(10, 10), (900, 10), (900, 900), (500, 1200), (10, 900), (10, 10)]));
        for dir in [Direction::Land, Direction::Water] {
            let rings = bin.assemble(dir, true, 0.0, 360.0).unwrap();
            assert_eq!(rings.len(), 1);
            assert!(rings[0].interior);
            assert_eq!(rings[0].ring.0.len(), 6);
        }
    }

    #[test]
    fn empty_land_bin_is_its_outline() {
        let bin = DecodedBin::new(0, 0.0, 0.0, 2.0).with_node_levels([1; 4]);
        let land = bin.assemble(Direction::Land, true, 0.0, 360.0).unwrap();
        assert_eq!(land.len(), 1);
        assert_eq!(land[0].ring.0.len(), 5);
        assert_eq!(land[0].level, 1);
        assert!(bin.assemble(Direction::Water, true, 0.0, 360.0).unwrap().is_empty());
    }

    #[test]
    fn suppressed_lake_outline_reports_land() {
        let bin = DecodedBin::new(0, 0.0, 0.0, 2.0)
            .with_node_levels([2; 4])
            .with_lake_filter(LakeFilter::NoLakes);
        let water = bin.assemble(Direction::Water, true, 0.0, 360.0).unwrap();
        assert_eq!(water[0].level, 1);
    }

    #[test]
    fn open_lines_skip_stitching() {
        let bin = west_to_east();
        let lines = bin.assemble(Direction::Land, false, 0.0, 360.0).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].ring.0.len(), 4);
        assert!(!is_closed(&lines[0]));
    }

    #[test]
    fn broken_topology_is_an_error() {
        let mut bin = DecodedBin::new(3, 0.0, 0.0, 1.0);
        // exits north but nothing ever comes back to the west entry
        bin.push_segment(Segment::new(1, W, Some(Side::North), vec![(0, 100), (500, 65535)]));
        bin.push_segment(Segment::new(1, W, Some(Side::North), vec![(0, 200), (600, 65535)]));
        let err = bin.assemble(Direction::Land, true, 0.0, 360.0).unwrap_err();
        assert!(matches!(err, ShoreError::UnclosedRing { bin: 3, .. }));
    }

    #[test]
    fn antarctic_piece_is_dropped_in_split_bin() {
        let mut bin = DecodedBin::new(0, 0.0, -70.0, 20.0)
            .with_node_levels([1; 4])
            .with_antarctica_split(true);
        bin.push_segment(Segment::new(1, None, None, vec![(100, 100), (200, 100), (200, 200), (100, 100)]));
        let rings = bin.assemble(Direction::Land, true, 0.0, 360.0).unwrap();
        // the outline crosses 60S and stays, the small ring near 70S goes
        assert_eq!(rings.len(), 1);
        assert!(!rings[0].interior);
    }
}
