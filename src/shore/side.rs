//! Per-side crossing lists that drive ring stitching.
//!
//! Each of the four bin sides holds the entry points of the segments that
//! enter the bin through it plus one corner sentinel, sorted along the
//! side in the walking direction. Positions run 0..=65535 so that moving
//! counter-clockwise around the bin always increases them.

use std::fmt;

use smallvec::SmallVec;

use crate::config::Direction;

use super::bin::DecodedBin;

/// Largest fixed-point coordinate inside a bin.
pub const MAX_DELTA: u16 = u16::MAX;

/// A bin edge, numbered counter-clockwise from the south.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    South = 0,
    East = 1,
    North = 2,
    West = 3,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::South, Side::East, Side::North, Side::West];

    #[inline] pub fn index(self) -> usize { self as usize }

    /// Side for a packed entry/exit code; `None` for codes above 3.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Next side counter-clockwise (`Land`) or clockwise (`Water`).
    #[inline] pub fn step(self, dir: Direction) -> Side {
        Self::ALL[(self.index() as i32 + dir.sign()).rem_euclid(4) as usize]
    }

    /// Position of a bin-local point along this side.
    pub fn position(self, x: u16, y: u16) -> u16 {
        match self {
            Side::South => x,
            Side::East => y,
            Side::North => MAX_DELTA - x,
            Side::West => MAX_DELTA - y,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::South => "south",
            Side::East => "east",
            Side::North => "north",
            Side::West => "west",
        };
        f.write_str(name)
    }
}

/// What sits at a crossing: a segment entering the bin, or the corner
/// that ends the side in the walking direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrossingKind {
    Segment(usize),
    Corner(Side),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crossing {
    pub pos: u16,
    pub kind: CrossingKind,
}

/// Crossing lists for the four sides of one bin.
#[derive(Clone, Debug)]
pub struct SideIndex {
    sides: [SmallVec<[Crossing; 8]>; 4],
    dir: Direction,
    remaining: usize,
}

impl SideIndex {
    /// Build the lists for `bin`, walking in `dir`.
    pub fn build(bin: &DecodedBin, dir: Direction) -> Self {
        let corner_pos = match dir {
            Direction::Land => MAX_DELTA,
            Direction::Water => 0,
        };
        let mut sides: [SmallVec<[Crossing; 8]>; 4] = Default::default();
        let mut remaining = 0;
        for (id, seg) in bin.segments().iter().enumerate() {
            let Some(entry) = seg.entry else { continue };
            let (x, y) = seg.first_point();
            sides[entry.index()].push(Crossing { pos: entry.position(x, y), kind: CrossingKind::Segment(id) });
            remaining += 1;
        }
        for side in Side::ALL {
            sides[side.index()].push(Crossing { pos: corner_pos, kind: CrossingKind::Corner(side) });
        }

        // stable sort: a corner stays behind any segment at the same position
        for list in &mut sides {
            match dir {
                Direction::Land => list.sort_by_key(|c| c.pos),
                Direction::Water => list.sort_by_key(|c| std::cmp::Reverse(c.pos)),
            }
        }

        Self { sides, dir, remaining }
    }

    #[inline] pub fn direction(&self) -> Direction { self.dir }

    /// Segment crossings not yet consumed.
    #[inline] pub fn remaining(&self) -> usize { self.remaining }

    #[inline] pub fn side(&self, side: Side) -> &[Crossing] { &self.sides[side.index()] }

    /// Position a walk resumes from after turning a corner onto a new side.
    #[inline] pub fn side_start(&self) -> u16 {
        match self.dir {
            Direction::Land => 0,
            Direction::Water => MAX_DELTA,
        }
    }

    /// Remove and return the first crossing on `side` at or beyond `from`
    /// in the walking direction.
    pub fn next_entry(&mut self, side: Side, from: u16) -> Option<Crossing> {
        let dir = self.dir;
        let list = &mut self.sides[side.index()];
        let k = list.iter().position(|c| match dir {
            Direction::Land => c.pos >= from,
            Direction::Water => c.pos <= from,
        })?;
        let found = list.remove(k);
        if matches!(found.kind, CrossingKind::Segment(_)) {
            self.remaining -= 1;
        }
        Some(found)
    }

    /// First side, starting at `side` and stepping in the walking
    /// direction, whose leading crossing is a segment. The crossing is
    /// left in place.
    pub fn first_entry(&self, mut side: Side) -> Option<(Side, usize)> {
        for _ in 0..4 {
            let list = &self.sides[side.index()];
            if let Some(id) = list.iter().find_map(|c| match c.kind {
                CrossingKind::Segment(id) => Some(id),
                CrossingKind::Corner(_) => None,
            }) {
                return Some((side, id));
            }
            side = side.step(self.dir);
        }
        None
    }
}
