pub(crate) mod fs;
pub(crate) mod names;

pub use fs::{adjust_resolution, available_resolutions, database_version, find_database, DbKind, DbVersion, DB_EXTENSION, MIN_VERSION};
