// Variable and attribute names used by binned databases.

pub(crate) const BIN_SIZE: &str = "Bin_size_in_minutes";
pub(crate) const BIN_NX: &str = "N_bins_in_360_longitude_range";
pub(crate) const BIN_NY: &str = "N_bins_in_180_degree_latitude_range";
pub(crate) const N_BIN: &str = "N_bins_in_file";
pub(crate) const N_SEG: &str = "N_segments_in_file";
pub(crate) const N_PT: &str = "N_points_in_file";
pub(crate) const N_POLY: &str = "N_polygons_in_file";
pub(crate) const N_NODE: &str = "N_nodes_in_file";

pub(crate) const BIN_FIRSTSEG: &str = "Id_of_first_segment_in_a_bin";
pub(crate) const BIN_INFO: &str = "Embedded_node_levels_in_a_bin";
pub(crate) const BIN_NSEG: &str = "N_segments_in_a_bin";

pub(crate) const SEG_INFO: &str = "Embedded_npts_levels_exit_entry_for_a_segment";
pub(crate) const SEG_START: &str = "Id_of_first_point_in_a_segment";
pub(crate) const SEG_POLYGON: &str = "Id_of_GSHHS_ID";

pub(crate) const PT_DX: &str = "Relative_longitude_from_SW_corner_of_bin";
pub(crate) const PT_DY: &str = "Relative_latitude_from_SW_corner_of_bin";

pub(crate) const POLY_AREA_FRACTION: &str = "Micro_fraction_of_full_resolution_area";
pub(crate) const POLY_PARENT: &str = "Id_of_parent_polygons";
pub(crate) const NODE_POLYGON: &str = "Id_of_node_polygons";
pub(crate) const POLY_AREA: &str = "The_km_squared_area_of_polygons";
/// Older files: ten times the area, stored as integers.
pub(crate) const POLY_AREA_LEGACY: &str = "Ten_times_the_km_squared_area_of_polygons";

// line databases
pub(crate) const SEG_NPTS: &str = "N_points_for_a_segment";
pub(crate) const SEG_LEVEL: &str = "Hierarchial_level_of_a_segment";

pub(crate) const ATTR_VERSION: &str = "version";
pub(crate) const ATTR_TITLE: &str = "title";
pub(crate) const ATTR_SOURCE: &str = "source";
pub(crate) const ATTR_UNITS: &str = "units";
