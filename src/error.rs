use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening, decoding or assembling a binned database.
#[derive(Debug, Error)]
pub enum ShoreError {
    /// No readable database with this stem was found on any search path.
    #[error("cannot find database {stem} (set GSHHGDIR or list its directory in coastline.conf)")]
    FileNotFound { stem: String },

    /// A database was found but is older than the minimum supported version.
    #[error("database {} has version {found}, need {required} or newer", path.display())]
    BadVersion { path: PathBuf, found: String, required: String },

    /// Structurally invalid database contents.
    #[error("malformed database: {0}")]
    Format(String),

    #[error("failed to read database: {0}")]
    Read(#[from] binarray::ArrayError),

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("invalid level selection {input:?}: {reason}")]
    InvalidSelect { input: String, reason: String },

    #[error("unknown resolution {0:?} (expected one of f, h, i, l, c)")]
    UnknownResolution(String),

    #[error("bin index {index} out of range (catalog holds {len} bins)")]
    BinOutOfRange { index: usize, len: usize },

    #[error("bin {bin}: segment refers to polygon {id}, but only {len} polygons exist")]
    PolygonIdOutOfRange { bin: usize, id: i64, len: usize },

    /// The stitching walk did not return to its start crossing.
    #[error("bin {bin}: ring starting on side {side} did not close after {steps} steps")]
    UnclosedRing { bin: usize, side: u8, steps: usize },
}

pub type Result<T> = std::result::Result<T, ShoreError>;
