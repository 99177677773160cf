use crate::{config::Region, error::{Result, ShoreError}};

/// Latitude south of which Antarctica may be skipped.
pub const ANTARCTICA_LIMIT: f64 = -60.0;

const MINUTES_360: i64 = 360 * 60;
const MINUTES_90: i64 = 90 * 60;

/// Fixed bin layout of a database: square bins of `bin_size` minutes,
/// numbered row by row from the north-west corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinGrid {
    bin_size: i32,
    nx: usize,
    ny: usize,
    n_bin: usize,
}

impl BinGrid {
    pub fn new(bin_size: i32, nx: usize, ny: usize, n_bin: usize) -> Result<Self> {
        if bin_size <= 0 || MINUTES_360 % bin_size as i64 != 0 {
            return Err(ShoreError::Format(format!("bin size of {bin_size} minutes does not tile 360 degrees")));
        }
        if nx as i64 != MINUTES_360 / bin_size as i64 || ny == 0 {
            return Err(ShoreError::Format(format!("{nx} x {ny} bins do not match a bin size of {bin_size} minutes")));
        }
        if n_bin > nx * ny {
            return Err(ShoreError::Format(format!("{n_bin} bins exceed the {nx} x {ny} grid")));
        }
        Ok(Self { bin_size, nx, ny, n_bin })
    }

    /// Bin size in minutes of arc.
    #[inline] pub fn bin_size(&self) -> i32 { self.bin_size }
    #[inline] pub fn nx(&self) -> usize { self.nx }
    #[inline] pub fn ny(&self) -> usize { self.ny }
    #[inline] pub fn n_bin(&self) -> usize { self.n_bin }

    /// Bin size in degrees.
    #[inline] pub fn bsize(&self) -> f64 { self.bin_size as f64 / 60.0 }

    /// Degrees per fixed-point unit.
    #[inline] pub fn scale(&self) -> f64 { self.bsize() / 65535.0 }

    /// Number of grid nodes (bin corners).
    #[inline] pub fn node_count(&self) -> usize { (self.nx + 1) * (self.ny + 1) }

    /// South-west corner of `bin` in degrees, longitude in [0, 360).
    pub fn sw_corner(&self, bin: usize) -> (f64, f64) {
        let bsize = self.bsize();
        ((bin % self.nx) as f64 * bsize, 90.0 - ((bin / self.nx) + 1) as f64 * bsize)
    }

    /// Node indices of the bin's SW, SE, NE and NW corners.
    pub fn corner_nodes(&self, bin: usize) -> [usize; 4] {
        let row = self.nx + 1;
        let ll = ((bin / self.nx) + 1) * row + bin % self.nx;
        [ll, ll + 1, ll + 1 - row, ll - row]
    }

    /// Bin containing the point, if it is on the globe.
    pub fn bin_at(&self, lon: f64, lat: f64) -> Option<usize> {
        if !(-90.0..=90.0).contains(&lat) || !lon.is_finite() {
            return None;
        }
        let bsize = self.bsize();
        let col = ((lon.rem_euclid(360.0) / bsize).floor() as usize).min(self.nx - 1);
        let row = (((90.0 - lat) / bsize).floor() as usize).min(self.ny - 1);
        let bin = row * self.nx + col;
        (bin < self.n_bin).then_some(bin)
    }

    /// Region rounded outward to whole bins, in integer minutes:
    /// (west, east, south, north).
    pub fn expand(&self, region: &Region) -> (i64, i64, i64, i64) {
        let bs = self.bin_size as f64;
        let b = self.bin_size as i64;
        let iw = (region.west * 60.0 / bs).floor() as i64 * b;
        let ie = (region.east * 60.0 / bs).ceil() as i64 * b;
        let is = MINUTES_90 - ((5400.0 - region.south * 60.0) / bs).ceil() as i64 * b;
        let in_ = MINUTES_90 - ((5400.0 - region.north * 60.0) / bs).floor() as i64 * b;
        (iw, ie, is, in_)
    }

    /// Ids of every bin overlapping `region`, ascending.
    pub fn select(&self, region: &Region, skip_antarctica: bool) -> Vec<usize> {
        let (iw, ie, is, in_) = self.expand(region);
        let b = self.bin_size as i64;
        let limit = (ANTARCTICA_LIMIT * 60.0) as i64;

        (0..self.n_bin).filter(|&i| {
            let this_south = MINUTES_90 - b * ((i / self.nx) as i64 + 1);
            if this_south < is || this_south >= in_ { return false }
            if skip_antarctica && this_south + b <= limit { return false }
            let mut this_west = b * (i % self.nx) as i64 - MINUTES_360;
            while this_west < iw { this_west += MINUTES_360 }
            this_west < ie
        }).collect()
    }
}

/// Whether a bin whose western edge is `lon_sw` straddles the region's
/// western edge, after moving it west by whole turns on world maps.
pub fn leftmost_bin(lon_sw: f64, bsize: f64, region_west: f64, is_world: bool) -> bool {
    let mut w = lon_sw;
    while is_world && w > region_west {
        w -= 360.0;
    }
    w <= region_west && w + bsize > region_west
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(bin_size: i32) -> BinGrid {
        let nx = (21600 / bin_size) as usize;
        let ny = (10800 / bin_size) as usize;
        BinGrid::new(bin_size, nx, ny, nx * ny).unwrap()
    }

    #[test]
    fn corners_of_first_bin() {
        let g = grid(20 * 60);
        assert_eq!(g.sw_corner(0), (0.0, 70.0));
        assert_eq!(g.sw_corner(19), (20.0, 50.0));
        // 18 bins per row, 19 nodes per row
        assert_eq!(g.corner_nodes(0), [19, 20, 1, 0]);
    }

    #[test]
    fn bin_at_wraps_longitude() {
        let g = grid(600);
        assert_eq!(g.bin_at(5.0, 85.0), Some(0));
        assert_eq!(g.bin_at(-355.0, 85.0), Some(0));
        assert_eq!(g.bin_at(359.9, -90.0), Some(g.n_bin() - 1));
        assert_eq!(g.bin_at(0.0, 91.0), None);
    }

    #[test]
    fn selection_expands_to_whole_bins() {
        let g = grid(600);
        let bins = g.select(&Region::new(5.0, 15.0, 1.0, 9.0), false);
        // two columns (0-10, 10-20) in the 0-10N row
        let row = 8;
        assert_eq!(bins, vec![row * 36, row * 36 + 1]);
    }

    #[test]
    fn selection_across_the_dateline() {
        let g = grid(600);
        let bins = g.select(&Region::new(-10.0, 10.0, 0.0, 10.0), false);
        let row = 8;
        assert_eq!(bins, vec![row * 36, row * 36 + 35]);
    }

    #[test]
    fn world_selection_takes_every_bin() {
        let g = grid(1200);
        assert_eq!(g.select(&Region::world(), false).len(), g.n_bin());
    }

    #[test]
    fn antarctica_skip_drops_southern_rows() {
        let g = grid(1200);
        let all = g.select(&Region::world(), false);
        let skipped = g.select(&Region::world(), true);
        // rows with north edge <= 60S: -70..-50 is kept, -90..-70 is dropped
        assert_eq!(all.len() - skipped.len(), 18);
        assert!(skipped.iter().all(|&b| g.sw_corner(b).1 > -90.0));
    }

    #[test]
    fn leftmost_detection() {
        assert!(leftmost_bin(350.0, 20.0, -5.0, true));
        assert!(!leftmost_bin(10.0, 10.0, -5.0, true));
        assert!(leftmost_bin(0.0, 10.0, 5.0, false));
        assert!(!leftmost_bin(350.0, 20.0, -5.0, false));
    }

    #[test]
    fn rejects_inconsistent_layout() {
        assert!(BinGrid::new(0, 1, 1, 1).is_err());
        assert!(BinGrid::new(600, 35, 18, 630).is_err());
        assert!(BinGrid::new(600, 36, 18, 1000).is_err());
    }
}
