//! Fixed-point to degree conversion and removal of spurious 360° jumps.

use geo::Coord;

/// Degrees of a bin-local point; deltas are unsigned offsets from the
/// bin's south-west corner.
#[inline]
pub fn to_degrees(lon_sw: f64, lat_sw: f64, scale: f64, dx: u16, dy: u16) -> Coord<f64> {
    Coord { x: lon_sw + dx as f64 * scale, y: lat_sw + dy as f64 * scale }
}

/// Inverse of [`to_degrees`], rounding to the nearest fixed-point unit and
/// clamping to the bin.
#[inline]
pub fn to_fixed(lon_sw: f64, lat_sw: f64, scale: f64, c: Coord<f64>) -> (u16, u16) {
    let fix = |v: f64| v.round().clamp(0.0, u16::MAX as f64) as u16;
    (fix((c.x - lon_sw) / scale), fix((c.y - lat_sw) / scale))
}

/// Move longitudes that spill past `east` back by 360° while they stay
/// at or east of `west`. The bin straddling the western edge also moves
/// points lying exactly on `east`.
pub fn path_shift2(coords: &mut [Coord<f64>], west: f64, east: f64, leftmost: bool) {
    for c in coords {
        let past = if leftmost { c.x >= east } else { c.x > east };
        if past && c.x - 360.0 >= west {
            c.x -= 360.0;
        }
    }
}

/// Move every longitude at or beyond `edge` back by 360°.
pub fn path_shift(coords: &mut [Coord<f64>], edge: f64) {
    for c in coords.iter_mut().filter(|c| c.x >= edge) {
        c.x -= 360.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point_round_trip() {
        for (lon_sw, lat_sw, bin_deg) in [(350.0, -60.0, 5.0), (-180.0, 89.0, 1.0), (120.0, -90.0, 20.0)] {
            let scale = bin_deg / 65535.0;
            for d in 0..=u16::MAX {
                let c = to_degrees(lon_sw, lat_sw, scale, d, u16::MAX - d);
                assert_eq!(to_fixed(lon_sw, lat_sw, scale, c), (d, u16::MAX - d));
            }
        }
    }

    #[test]
    fn shift_only_within_window() {
        let mut pts = vec![Coord { x: 365.0, y: 0.0 }, Coord { x: 10.0, y: 0.0 }, Coord { x: 359.0, y: 0.0 }];
        path_shift2(&mut pts, -10.0, 350.0, false);
        assert_eq!(pts.iter().map(|c| c.x).collect::<Vec<_>>(), vec![5.0, 10.0, -1.0]);
    }

    #[test]
    fn leftmost_shifts_points_on_east_edge() {
        let mut a = vec![Coord { x: 350.0, y: 0.0 }];
        let mut b = a.clone();
        path_shift2(&mut a, -10.0, 350.0, true);
        path_shift2(&mut b, -10.0, 350.0, false);
        assert_eq!((a[0].x, b[0].x), (-10.0, 350.0));
    }

    #[test]
    fn shifting_is_idempotent() {
        let mut pts: Vec<Coord<f64>> = (0..40).map(|i| Coord { x: i as f64 * 10.0, y: 0.0 }).collect();
        path_shift2(&mut pts, -30.0, 330.0, true);
        let once = pts.clone();
        path_shift2(&mut pts, -30.0, 330.0, true);
        assert_eq!(pts, once);

        let mut line = once.clone();
        path_shift(&mut line, 180.0);
        let shifted = line.clone();
        path_shift(&mut line, 180.0);
        assert_eq!(line, shifted);
    }
}
