//! Locating database files on disk and checking their version.

use std::{fmt, fs, path::{Path, PathBuf}, str::FromStr};

use binarray::{ArrayReader, NcArrays};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    common::names::ATTR_VERSION,
    config::{Resolution, ShoreConfig},
    error::{Result, ShoreError},
};

/// File extension of database files.
pub const DB_EXTENSION: &str = "nc";

/// Oldest database release the decoder understands.
pub const MIN_VERSION: DbVersion = DbVersion { major: 2, minor: 2, patch: 0 };

/// Which binned database family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbKind {
    Shore,
    River,
    Border,
}

impl DbKind {
    pub const ALL: [DbKind; 3] = [DbKind::Shore, DbKind::River, DbKind::Border];

    /// File stem, e.g. `binned_GSHHS_i`.
    pub fn stem(self, res: Resolution) -> String {
        let family = match self {
            DbKind::Shore => "GSHHS",
            DbKind::River => "river",
            DbKind::Border => "border",
        };
        format!("binned_{family}_{}", res.code())
    }

    /// File name including extension.
    pub fn file_name(self, res: Resolution) -> String {
        format!("{}.{DB_EXTENSION}", self.stem(res))
    }
}

/// `major.minor.patch` of a database release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DbVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl fmt::Display for DbVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for DbVersion {
    type Err = ShoreError;

    /// Accepts `2.3.7`, `2.2` or text with a leading word such as `GSHHG 2.3.7`.
    fn from_str(s: &str) -> Result<Self> {
        let token = s.split_whitespace()
            .find(|t| t.starts_with(|c: char| c.is_ascii_digit()))
            .ok_or_else(|| ShoreError::Format(format!("no version number in {s:?}")))?;
        let mut parts = token.split('.').map(|p| {
            let digits: String = p.chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<u32>()
        });
        let mut next = || parts.next().transpose()
            .map_err(|_| ShoreError::Format(format!("bad version number {token:?}")));
        let major = next()?.unwrap_or(0);
        let minor = next()?.unwrap_or(0);
        let patch = next()?.unwrap_or(0);
        Ok(DbVersion { major, minor, patch })
    }
}

/// Version recorded in the database's global `version` attribute.
pub fn database_version(path: &Path) -> Result<DbVersion> {
    let mut reader = NcArrays::open(path)?;
    let text = reader.attribute(None, ATTR_VERSION)?;
    reader.close()?;
    text.parse()
}

/// Find a readable, recent enough database file.
///
/// Search order: the configured database directory, then every directory
/// listed in a `coastline.conf` under the shared directory, then the
/// shared directory's `coast/` subdirectory.
pub fn find_database(config: &ShoreConfig, kind: DbKind, res: Resolution) -> Result<PathBuf> {
    let file = kind.file_name(res);
    let mut too_old = None;

    if let Some(dir) = &config.gshhg_dir {
        debug!("[shore::fs] trying database directory {}", dir.display());
        if let Some(path) = accept(dir.join(&file), &mut too_old) {
            return Ok(path);
        }
    }

    if let Some(share) = &config.share_dir {
        for conf in [share.join("conf").join("coastline.conf"), share.join("coast").join("coastline.conf")] {
            let Ok(text) = fs::read_to_string(&conf) else { continue };
            debug!("[shore::fs] coastline.conf found at {}", conf.display());
            for line in text.lines().map(str::trim) {
                if line.is_empty() || line.starts_with('#') { continue }
                if let Some(path) = accept(Path::new(line).join(&file), &mut too_old) {
                    return Ok(path);
                }
            }
        }

        if let Some(path) = accept(share.join("coast").join(&file), &mut too_old) {
            return Ok(path);
        }
    }

    match too_old {
        Some((path, found)) => Err(ShoreError::BadVersion {
            path,
            found: found.to_string(),
            required: MIN_VERSION.to_string(),
        }),
        None => Err(ShoreError::FileNotFound { stem: kind.stem(res) }),
    }
}

fn accept(path: PathBuf, too_old: &mut Option<(PathBuf, DbVersion)>) -> Option<PathBuf> {
    if !path.is_file() {
        debug!("[shore::fs] no database at {}", path.display());
        return None;
    }
    match database_version(&path) {
        Ok(version) if version >= MIN_VERSION => {
            debug!("[shore::fs] using {} (version {version})", path.display());
            Some(path)
        }
        Ok(version) => {
            debug!("[shore::fs] {} is version {version}, need {MIN_VERSION}", path.display());
            too_old.get_or_insert((path, version));
            None
        }
        Err(e) => {
            warn!("found {} but cannot read it: {e}", path.display());
            None
        }
    }
}

/// For each resolution (indexed by [`Resolution::rank`]), whether the
/// shoreline, river and border databases are all present.
pub fn available_resolutions(config: &ShoreConfig) -> [bool; 5] {
    let mut ok = [false; 5];
    for res in Resolution::ALL {
        ok[res.rank()] = DbKind::ALL.iter().all(|&kind| find_database(config, kind, res).is_ok());
    }
    ok
}

/// Highest available resolution no finer than `res`; `res` itself if
/// nothing coarser is available either.
pub fn adjust_resolution(config: &ShoreConfig, res: Resolution) -> Resolution {
    let ok = available_resolutions(config);
    match Resolution::ALL[..=res.rank()].iter().rev().find(|r| ok[r.rank()]) {
        Some(&found) => {
            if found != res {
                warn!("resolution {res} not available, substituting resolution {found}");
            }
            found
        }
        None => res,
    }
}
