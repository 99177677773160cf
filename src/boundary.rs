//! Map boundaries that assembled rings are clipped against.

use geo::Coord;

use crate::config::Region;

/// Which half of a ring that wraps across the map's periodic edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CutSide {
    Left,
    Right,
}

/// Plot-space boundary of a map.
///
/// Rings are passed as open vertex lists (no repeated closing vertex) and
/// are returned the same way.
pub trait MapBoundary {
    /// Part of `ring` inside the map; empty when nothing is left.
    fn clip(&self, ring: &[Coord<f64>]) -> Vec<Coord<f64>>;

    /// Index of the first vertex after a jump across the map's periodic
    /// edge, if the clipped ring has one.
    fn will_it_wrap(&self, ring: &[Coord<f64>]) -> Option<usize>;

    /// The half of a wrapping ring lying against the map's `side` edge,
    /// with the jump at `start` removed.
    fn truncate(&self, ring: &[Coord<f64>], start: usize, side: CutSide) -> Vec<Coord<f64>>;

    /// Insert vertices so no edge is longer than `step` degrees.
    fn resample(&self, ring: &[Coord<f64>], step: f64) -> Vec<Coord<f64>> {
        densify(ring, step)
    }
}

/// Straight-line densification of a ring, closing edge included.
pub fn densify(ring: &[Coord<f64>], step: f64) -> Vec<Coord<f64>> {
    if ring.len() < 2 || !(step > 0.0) {
        return ring.to_vec();
    }
    let n = ring.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        out.push(a);
        let len = (b.x - a.x).hypot(b.y - a.y);
        let parts = (len / step).ceil() as usize;
        for k in 1..parts {
            let t = k as f64 / parts as f64;
            out.push(Coord { x: a.x + t * (b.x - a.x), y: a.y + t * (b.y - a.y) });
        }
    }
    out
}

/// One Sutherland-Hodgman pass against a single half-plane.
fn clip_against_edge<F, I>(ring: &[Coord<f64>], inside: F, intersect: I) -> Vec<Coord<f64>>
where
    F: Fn(&Coord<f64>) -> bool,
    I: Fn(&Coord<f64>, &Coord<f64>) -> Coord<f64>,
{
    let n = ring.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let (current, next) = (&ring[i], &ring[(i + 1) % n]);
        match (inside(current), inside(next)) {
            (true, true) => out.push(*next),
            (true, false) => out.push(intersect(current, next)),
            (false, true) => {
                out.push(intersect(current, next));
                out.push(*next);
            }
            (false, false) => {}
        }
    }
    out
}

fn at_x(p: &Coord<f64>, q: &Coord<f64>, x: f64) -> Coord<f64> {
    let t = (x - p.x) / (q.x - p.x);
    Coord { x, y: p.y + t * (q.y - p.y) }
}

fn at_y(p: &Coord<f64>, q: &Coord<f64>, y: f64) -> Coord<f64> {
    let t = (y - p.y) / (q.y - p.y);
    Coord { x: p.x + t * (q.x - p.x), y }
}

fn keep_east_of(ring: &[Coord<f64>], west: f64) -> Vec<Coord<f64>> {
    clip_against_edge(ring, |p| p.x >= west, |p, q| at_x(p, q, west))
}

fn keep_west_of(ring: &[Coord<f64>], east: f64) -> Vec<Coord<f64>> {
    clip_against_edge(ring, |p| p.x <= east, |p, q| at_x(p, q, east))
}

fn keep_latitudes(ring: &[Coord<f64>], south: f64, north: f64) -> Vec<Coord<f64>> {
    let out = clip_against_edge(ring, |p| p.y >= south, |p, q| at_y(p, q, south));
    clip_against_edge(&out, |p| p.y <= north, |p, q| at_y(p, q, north))
}

/// Unprojected longitude/latitude map.
///
/// Regional maps are clipped to their rectangle. World maps fold every
/// longitude into `west..west + 360` and clip latitude only; rings that
/// then jump across the seam are split by [`MapBoundary::truncate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LonLatBoundary {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
    pub world: bool,
}

impl LonLatBoundary {
    pub fn new(region: &Region) -> Self {
        Self {
            west: region.west,
            east: region.east,
            south: region.south,
            north: region.north,
            world: region.width() >= 360.0,
        }
    }

    #[inline] fn fold(&self, x: f64) -> f64 {
        self.west + (x - self.west).rem_euclid(360.0)
    }

    /// Longitudes of `ring` made continuous from `start`. `None` if the
    /// ring circles the globe and cannot be unrolled.
    fn unroll(&self, ring: &[Coord<f64>], start: usize) -> Option<Vec<Coord<f64>>> {
        let n = ring.len();
        let mut out = Vec::with_capacity(n);
        let mut offset = 0.0;
        let mut prev = ring[start % n].x;
        for k in 0..=n {
            let p = ring[(start + k) % n];
            let dx = p.x - prev;
            if dx > 180.0 {
                offset -= 360.0;
            } else if dx < -180.0 {
                offset += 360.0;
            }
            prev = p.x;
            if k < n {
                out.push(Coord { x: p.x + offset, y: p.y });
            }
        }
        (offset == 0.0).then_some(out)
    }
}

impl MapBoundary for LonLatBoundary {
    fn clip(&self, ring: &[Coord<f64>]) -> Vec<Coord<f64>> {
        if ring.is_empty() {
            return Vec::new();
        }
        if self.world {
            let folded: Vec<Coord<f64>> = ring.iter().map(|c| Coord { x: self.fold(c.x), y: c.y }).collect();
            return keep_latitudes(&folded, self.south, self.north);
        }
        let out = keep_east_of(ring, self.west);
        let out = keep_west_of(&out, self.east);
        keep_latitudes(&out, self.south, self.north)
    }

    fn will_it_wrap(&self, ring: &[Coord<f64>]) -> Option<usize> {
        if !self.world {
            return None;
        }
        ring.windows(2).position(|w| (w[1].x - w[0].x).abs() > 180.0).map(|i| i + 1)
    }

    fn truncate(&self, ring: &[Coord<f64>], start: usize, side: CutSide) -> Vec<Coord<f64>> {
        if ring.is_empty() {
            return Vec::new();
        }
        let Some(u) = self.unroll(ring, start) else {
            return match side {
                CutSide::Left => ring.to_vec(),
                CutSide::Right => Vec::new(),
            };
        };
        let shifted = |d: f64| -> Vec<Coord<f64>> { u.iter().map(|c| Coord { x: c.x + d, y: c.y }).collect() };
        let max = u.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max);
        let min = u.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);

        match side {
            CutSide::Right if max > self.east => keep_west_of(&u, self.east),
            CutSide::Left if max > self.east => keep_east_of(&shifted(-360.0), self.west),
            CutSide::Left if min < self.west => keep_east_of(&u, self.west),
            CutSide::Right if min < self.west => keep_west_of(&shifted(360.0), self.east),
            CutSide::Left => u,
            CutSide::Right => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, d: f64) -> Vec<Coord<f64>> {
        vec![
            Coord { x: x0, y: y0 },
            Coord { x: x0 + d, y: y0 },
            Coord { x: x0 + d, y: y0 + d },
            Coord { x: x0, y: y0 + d },
        ]
    }

    #[test]
    fn regional_clip_cuts_to_rectangle() {
        let map = LonLatBoundary::new(&Region::new(0.0, 10.0, 0.0, 10.0));
        let out = map.clip(&square(5.0, 5.0, 10.0));
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|c| (5.0..=10.0).contains(&c.x) && (5.0..=10.0).contains(&c.y)));
        assert!(map.clip(&square(20.0, 20.0, 1.0)).is_empty());
    }

    #[test]
    fn world_clip_folds_longitudes() {
        let map = LonLatBoundary::new(&Region::world());
        assert!(map.world);
        let out = map.clip(&square(-5.0, 0.0, 2.0));
        assert!(out.iter().all(|c| (0.0..360.0).contains(&c.x)));
        assert_eq!(map.will_it_wrap(&square(10.0, 0.0, 2.0)), None);
    }

    #[test]
    fn straddling_ring_splits_into_two_halves() {
        let map = LonLatBoundary::new(&Region::world());
        let ring = map.clip(&square(-2.0, 0.0, 4.0));
        let start = map.will_it_wrap(&ring).unwrap();
        let left = map.truncate(&ring, start, CutSide::Left);
        let right = map.truncate(&ring, start, CutSide::Right);
        assert!(!left.is_empty() && !right.is_empty());
        assert!(left.iter().all(|c| (0.0..=2.0).contains(&c.x)));
        assert!(right.iter().all(|c| (358.0..=360.0).contains(&c.x)));
    }

    #[test]
    fn densify_limits_edge_length() {
        let out = densify(&square(0.0, 0.0, 1.0), 0.25);
        assert_eq!(out.len(), 16);
        assert_eq!(densify(&square(0.0, 0.0, 1.0), 0.0).len(), 4);
    }
}
