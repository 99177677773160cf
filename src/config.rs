//! Query settings: database resolution, region, level selection and
//! search paths.

use std::{env, fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShoreError};

/// Highest hierarchical level stored in a shoreline database (pond in island).
pub const MAX_LEVEL: u8 = 4;

// ------------------------------------------------------------
// Resolution
// ------------------------------------------------------------

/// Database resolution, from crude to full.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Crude,
    Low,
    Intermediate,
    High,
    Full,
}

impl Resolution {
    /// All resolutions ordered from coarsest to finest.
    pub const ALL: [Resolution; 5] = [
        Resolution::Crude,
        Resolution::Low,
        Resolution::Intermediate,
        Resolution::High,
        Resolution::Full,
    ];

    /// Single-letter code used in database file names.
    #[inline] pub fn code(self) -> char {
        match self {
            Resolution::Crude => 'c',
            Resolution::Low => 'l',
            Resolution::Intermediate => 'i',
            Resolution::High => 'h',
            Resolution::Full => 'f',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }

    /// 0 for crude up to 4 for full.
    #[inline] pub fn rank(self) -> usize { self as usize }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Resolution {
    type Err = ShoreError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let mut chars = lower.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_code(c),
            _ => match lower.as_str() {
                "crude" => Some(Resolution::Crude),
                "low" => Some(Resolution::Low),
                "intermediate" => Some(Resolution::Intermediate),
                "high" => Some(Resolution::High),
                "full" => Some(Resolution::Full),
                _ => None,
            },
        }
        .ok_or_else(|| ShoreError::UnknownResolution(s.to_string()))
    }
}

// ------------------------------------------------------------
// Direction
// ------------------------------------------------------------

/// Which side of the shoreline is painted.
///
/// `Land` walks bin sides counter-clockwise and yields dry areas; `Water`
/// walks clockwise and yields wet areas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Land,
    Water,
}

impl Direction {
    /// +1 for land, -1 for water.
    #[inline] pub fn sign(self) -> i32 {
        match self {
            Direction::Land => 1,
            Direction::Water => -1,
        }
    }

    /// Level parity painted in this direction (odd levels are dry).
    #[inline] pub fn parity(self) -> u8 {
        match self {
            Direction::Land => 1,
            Direction::Water => 0,
        }
    }

    pub fn from_sign(sign: i32) -> Option<Self> {
        match sign {
            1 => Some(Direction::Land),
            -1 => Some(Direction::Water),
            _ => None,
        }
    }
}

// ------------------------------------------------------------
// Region
// ------------------------------------------------------------

/// Query rectangle in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Region {
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self { west, east, south, north }
    }

    /// The whole globe, 0/360/-90/90.
    pub fn world() -> Self { Self::new(0.0, 360.0, -90.0, 90.0) }

    #[inline] pub fn width(&self) -> f64 { self.east - self.west }

    /// Check the region contract.
    pub fn validate(&self) -> Result<()> {
        let Region { west, east, south, north } = *self;
        if [west, east, south, north].iter().any(|v| !v.is_finite()) {
            return Err(ShoreError::InvalidRegion(format!("{self} has non-finite bounds")));
        }
        if south >= north || south < -90.0 || north > 90.0 {
            return Err(ShoreError::InvalidRegion(format!("{self}: need -90 <= south < north <= 90")));
        }
        if west >= east || east - west > 360.0 {
            return Err(ShoreError::InvalidRegion(format!("{self}: need west < east within 360 degrees")));
        }
        Ok(())
    }

    /// Validated copy; a region lying entirely at negative longitudes is
    /// moved up by 360 degrees.
    pub fn normalized(&self) -> Result<Self> {
        self.validate()?;
        let mut r = *self;
        if r.west < 0.0 && r.east < 0.0 {
            r.west += 360.0;
            r.east += 360.0;
        }
        Ok(r)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.west, self.east, self.south, self.north)
    }
}

impl FromStr for Region {
    type Err = ShoreError;

    /// Parse `west/east/south/north`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 4 {
            return Err(ShoreError::InvalidRegion(format!("{s:?}: expected west/east/south/north")));
        }
        let mut v = [0.0; 4];
        for (slot, part) in v.iter_mut().zip(&parts) {
            *slot = part.trim().parse()
                .map_err(|_| ShoreError::InvalidRegion(format!("{s:?}: {part:?} is not a number")))?;
        }
        let region = Region::new(v[0], v[1], v[2], v[3]);
        region.validate()?;
        Ok(region)
    }
}

// ------------------------------------------------------------
// Level selection
// ------------------------------------------------------------

/// Suppression of one kind of level-2 polygon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LakeFilter {
    #[default]
    KeepAll,
    /// Drop ordinary lakes (positive area), keep river-lakes.
    NoLakes,
    /// Drop river-lakes (negative area), keep ordinary lakes.
    NoRiverLakes,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntarcticaMode {
    #[default]
    Keep,
    /// Leave out everything south of 60°S.
    Skip,
}

/// Polygon filters applied while decoding bins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShoreSelect {
    /// Minimum polygon area in km².
    pub min_area: f64,
    pub low: u8,
    /// Highest level kept; `low == high == 0` means every level.
    pub high: u8,
    /// Minimum retained micro-fraction (millionths) of the full-resolution area.
    pub fraction: i32,
    pub lakes: LakeFilter,
    pub antarctica: AntarcticaMode,
}

impl ShoreSelect {
    #[inline] pub fn min_level(&self) -> u8 { self.low }

    #[inline] pub fn max_level(&self) -> u8 {
        if self.low == 0 && self.high == 0 { MAX_LEVEL } else { self.high }
    }

    /// True when lake or river-lake suppression is requested.
    #[inline] pub fn suppresses_lakes(&self) -> bool { self.lakes != LakeFilter::KeepAll }

    #[inline] pub fn skips_antarctica(&self) -> bool { self.antarctica == AntarcticaMode::Skip }
}

impl FromStr for ShoreSelect {
    type Err = ShoreError;

    /// Parse `area[/low/high][+l][+r][+p<percent>][+as]`.
    fn from_str(s: &str) -> Result<Self> {
        let bad = |reason: &str| ShoreError::InvalidSelect { input: s.to_string(), reason: reason.to_string() };
        let mut select = ShoreSelect::default();

        let (head, modifiers) = match s.find('+') {
            Some(i) => (&s[..i], &s[i..]),
            None => (s, ""),
        };

        for modifier in modifiers.split('+').filter(|m| !m.is_empty()) {
            match modifier {
                "as" => select.antarctica = AntarcticaMode::Skip,
                "l" => select.lakes = LakeFilter::NoRiverLakes,
                "r" => select.lakes = LakeFilter::NoLakes,
                m if m.starts_with('p') => {
                    let pct: f64 = m[1..].parse().map_err(|_| bad("+p needs a percentage"))?;
                    if !(0.0..=100.0).contains(&pct) {
                        return Err(bad("percentage must be within 0-100"));
                    }
                    select.fraction = (1e6 * 0.01 * pct).round() as i32;
                }
                _ => return Err(bad(&format!("unknown modifier +{modifier}"))),
            }
        }

        if head.is_empty() {
            if modifiers.is_empty() {
                return Err(bad("no area given"));
            }
            return Ok(select);
        }

        let mut fields = head.split('/');
        select.min_area = fields.next()
            .and_then(|a| a.trim().parse().ok())
            .filter(|a: &f64| a.is_finite() && *a >= 0.0)
            .ok_or_else(|| bad("area must be a non-negative number"))?;

        let mut level = |name: &str| -> Result<Option<u8>> {
            fields.next()
                .map(|v| v.trim().parse::<u8>().map_err(|_| bad(&format!("{name} level is not an integer"))))
                .transpose()
        };
        let low = level("low")?;
        let high = level("high")?;
        if fields.next().is_some() {
            return Err(bad("expected at most area/low/high"));
        }

        select.low = low.unwrap_or(0);
        select.high = high.unwrap_or(MAX_LEVEL);
        if select.high > MAX_LEVEL || select.low > select.high {
            return Err(bad("levels must satisfy low <= high <= 4"));
        }
        Ok(select)
    }
}

// ------------------------------------------------------------
// Search paths
// ------------------------------------------------------------

/// Where to look for database files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoreConfig {
    /// Directory holding the databases directly.
    pub gshhg_dir: Option<PathBuf>,
    /// Shared data directory; searched for `conf/coastline.conf`,
    /// `coast/coastline.conf` and the `coast/` subdirectory.
    pub share_dir: Option<PathBuf>,
}

impl ShoreConfig {
    pub fn new(gshhg_dir: Option<PathBuf>, share_dir: Option<PathBuf>) -> Self {
        Self { gshhg_dir, share_dir }
    }

    /// Read `GSHHGDIR` and `SHOREBIN_SHAREDIR` from the environment.
    pub fn from_env() -> Self {
        let dir = |key: &str| env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        Self { gshhg_dir: dir("GSHHGDIR"), share_dir: dir("SHOREBIN_SHAREDIR") }
    }

    pub fn with_gshhg_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.gshhg_dir = Some(dir.into());
        self
    }

    pub fn with_share_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.share_dir = Some(dir.into());
        self
    }
}
