use geo::{Coord, LineString};
use tracing::{debug, warn};

use crate::boundary::{CutSide, MapBoundary};

use super::ShorePolygon;

/// Fit assembled rings to a map: optional resampling, clipping, and
/// splitting of rings that wrap across the map's periodic edge into two
/// closed halves.
///
/// `antipodal_bin` is set when the rings come from the bin holding the
/// map's antipode; without resampling (`step == 0`) such rings cannot be
/// drawn and are left out.
pub fn prep_shore_polygons(
    polys: Vec<ShorePolygon>,
    boundary: &dyn MapBoundary,
    resample: bool,
    step: f64,
    antipodal_bin: Option<usize>,
) -> Vec<ShorePolygon> {
    let mut out = Vec::with_capacity(polys.len());
    let mut warned = false;

    for poly in polys {
        let ShorePolygon { ring, level, fid, interior } = poly;
        let mut coords = ring.0;
        if !is_open(&coords) {
            coords.pop();
        }
        if resample && step > 0.0 {
            coords = boundary.resample(&coords, step);
        }

        let clipped = boundary.clip(&coords);
        if clipped.is_empty() {
            continue;
        }

        let make = |coords: Vec<Coord<f64>>| ShorePolygon { ring: LineString(coords), level, fid, interior };

        if let Some(start) = boundary.will_it_wrap(&clipped) {
            for side in [CutSide::Left, CutSide::Right] {
                let half = compact_line(boundary.truncate(&clipped, start, side));
                if half.len() >= 3 {
                    out.push(make(close(half)));
                }
            }
            continue;
        }

        if let Some(bin) = antipodal_bin {
            if step == 0.0 {
                if !warned {
                    warn!("bin {bin} holds the map's antipode; resample to draw its polygons");
                    warned = true;
                }
                continue;
            }
        }

        let compact = compact_line(clipped);
        if compact.len() >= 3 {
            out.push(make(close(compact)));
        }
    }

    debug!("[shore::prep] {} rings after clipping", out.len());
    out
}

/// True unless the last vertex repeats the first.
pub fn is_open(coords: &[Coord<f64>]) -> bool {
    coords.first() != coords.last()
}

/// Drop repeated vertices and vertices lying on a straight run between
/// their neighbours. Input and output are open vertex lists.
pub fn compact_line(coords: Vec<Coord<f64>>) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
    for c in coords {
        if out.last() == Some(&c) {
            continue;
        }
        if let [.., a, b] = out.as_slice() {
            if collinear(*a, *b, c) {
                out.pop();
            }
        }
        out.push(c);
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    // the seam between last and first vertex
    while out.len() >= 3 && collinear(out[out.len() - 2], out[out.len() - 1], out[0]) {
        out.pop();
    }
    while out.len() >= 3 && collinear(out[out.len() - 1], out[0], out[1]) {
        out.remove(0);
    }
    out
}

fn collinear(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> bool {
    let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
    let dot = (b.x - a.x) * (c.x - b.x) + (b.y - a.y) * (c.y - b.y);
    let scale = (b.x - a.x).abs() + (b.y - a.y).abs() + (c.x - b.x).abs() + (c.y - b.y).abs();
    cross.abs() <= 1e-12 * scale * scale && dot > 0.0
}

fn close(mut coords: Vec<Coord<f64>>) -> Vec<Coord<f64>> {
    if let Some(&first) = coords.first() {
        coords.push(first);
    }
    coords
}
