// Integration tests for writing a container as NetCDF and reading it back
#![cfg(feature = "netcdf")]

use binarray::{ArrayError, ArrayReader, MemArrays, NcArrays};

fn shore_like() -> MemArrays {
    let mut mem = MemArrays::new();
    mem.set_attribute("version", "2.3.7")
        .set_attribute("title", "binned shoreline test")
        .put("Bin_size_in_minutes", vec![60i32])
        .put("N_bins_in_360_longitude_range", vec![360i32])
        .put("Id_of_first_segment_in_a_bin", vec![0i32, 2, 2])
        .put("N_segments_in_a_bin", vec![2i16, 0, 1])
        .put("Relative_longitude_from_SW_corner_of_bin", (0..500i16).collect::<Vec<_>>())
        .put("Area_of_polygons", vec![12.5f64, -3.0])
        .set_var_attribute("Area_of_polygons", "units", "km^2");
    mem
}

fn write_to_disk(mem: &MemArrays, compress: bool) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    binarray::write(mem, dir.path().join("test.nc"), compress).unwrap();
    dir
}

#[test]
fn disk_reads_match_memory() {
    for compress in [false, true] {
        let mut mem = shore_like();
        let dir = write_to_disk(&mem, compress);
        let mut disk = NcArrays::open(dir.path().join("test.nc")).unwrap();

        for name in ["Id_of_first_segment_in_a_bin", "N_segments_in_a_bin", "Area_of_polygons"] {
            let len = mem.len(name).unwrap();
            assert_eq!(disk.len(name).unwrap(), len);
            assert_eq!(disk.read_array(name, 0, len).unwrap(), mem.read_array(name, 0, len).unwrap());
        }
        assert_eq!(
            disk.read_i16("Relative_longitude_from_SW_corner_of_bin", 250, 3).unwrap(),
            vec![250, 251, 252],
        );
    }
}

#[test]
fn attributes_survive_disk() {
    let dir = write_to_disk(&shore_like(), false);
    let mut disk = NcArrays::open(dir.path().join("test.nc")).unwrap();
    assert_eq!(disk.attribute(None, "version").unwrap(), "2.3.7");
    assert_eq!(disk.attribute(Some("Area_of_polygons"), "units").unwrap(), "km^2");
    assert!(matches!(disk.attribute(None, "absent"), Err(ArrayError::UnknownAttribute(_))));
    assert_eq!(disk.read_scalar("Bin_size_in_minutes").unwrap(), 60);
}

#[test]
fn opening_a_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(NcArrays::open(dir.path().join("absent.nc")), Err(ArrayError::NetCdf(_))));
}

#[test]
fn truncated_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let full = dir.path().join("full.nc");
    binarray::write(&shore_like(), &full, false).unwrap();
    let bytes = std::fs::read(&full).unwrap();

    let short = dir.path().join("short.nc");
    std::fs::write(&short, &bytes[..10]).unwrap();
    assert!(NcArrays::open(&short).is_err());
}

#[test]
fn foreign_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foreign.nc");
    std::fs::write(&path, b"PK\x03\x04 a zip archive").unwrap();
    assert!(NcArrays::open(&path).is_err());
}
