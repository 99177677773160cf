use thiserror::Error;

use crate::array::DataType;

/// Errors raised while reading or writing an array container.
#[derive(Debug, Error)]
pub enum ArrayError {
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// Contents are structurally invalid or use an unsupported type.
    #[error("invalid container data: {0}")]
    InvalidData(String),

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("slice {start}..{start}+{count} out of bounds for {name} (len {len})")]
    OutOfBounds { name: String, start: usize, count: usize, len: usize },

    #[error("variable {name} holds {found}, expected {expected}")]
    TypeMismatch { name: String, expected: DataType, found: DataType },

    #[error("container has been closed")]
    Closed,
}
