// Integration tests for locating databases on disk

mod common;

use std::{fs, path::Path};

use common::*;
use shorebin::{
    adjust_resolution, available_resolutions, build::DbBuilder, database_version, find_database, DbKind,
    Direction, LineCatalog, LineKind, Resolution, ShoreCatalog, ShoreConfig, ShoreError, ShoreSelect,
};

fn write_all_kinds(dir: &Path, res: Resolution) {
    builder().write(dir.join(DbKind::Shore.file_name(res)), true).unwrap();
    for kind in [DbKind::River, DbKind::Border] {
        DbBuilder::lines(BIN_SIZE).unwrap().write(dir.join(kind.file_name(res)), false).unwrap();
    }
}

#[test]
fn compressed_database_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = builder().with_source("fixture source");
    let land = db.add_polygon(None, 5000.0);
    db.set_corner_levels(BIN, [0, 0, 1, 1]).unwrap();
    db.add_segment(BIN, land, 1, Some(shorebin::shore::Side::West), Some(shorebin::shore::Side::East),
        &[(0, 65435), (30000, 32000), (65535, 40000)]).unwrap();
    db.write(dir.path().join(DbKind::Shore.file_name(Resolution::Crude)), true).unwrap();

    let config = ShoreConfig::default().with_gshhg_dir(dir.path());
    let mut catalog =
        ShoreCatalog::open(&config, Resolution::Crude, &bin_region(), &ShoreSelect::default()).unwrap();
    assert_eq!(catalog.info().title, "fixture");
    assert_eq!(catalog.info().source, "fixture source");
    assert_eq!(catalog.info().n_seg, 1);

    let bin = catalog.get_bin(0).unwrap();
    let rings = bin.assemble(Direction::Land, true, 0.0, 20.0).unwrap();
    assert_eq!(rings.len(), 1);
    assert_eq!(rings[0].len(), 3 + 2 + 1);
    catalog.close().unwrap();
}

#[test]
fn coastline_conf_lists_extra_directories() {
    let share = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_all_kinds(data.path(), Resolution::Low);

    fs::create_dir(share.path().join("conf")).unwrap();
    fs::write(
        share.path().join("conf").join("coastline.conf"),
        format!("# database directories\n\n{}\n", data.path().display()),
    ).unwrap();

    let config = ShoreConfig::default().with_share_dir(share.path());
    let found = find_database(&config, DbKind::Border, Resolution::Low).unwrap();
    assert_eq!(found, data.path().join(DbKind::Border.file_name(Resolution::Low)));
    assert_eq!(found.file_name().unwrap(), "binned_border_l.nc");

    let rivers = LineCatalog::open(&config, LineKind::River, Resolution::Low, &bin_region()).unwrap();
    assert_eq!(rivers.n_bins(), 1);
}

#[test]
fn share_coast_directory_is_searched_last() {
    let share = tempfile::tempdir().unwrap();
    fs::create_dir(share.path().join("coast")).unwrap();
    write_all_kinds(&share.path().join("coast"), Resolution::High);

    let config = ShoreConfig::default().with_share_dir(share.path());
    assert!(find_database(&config, DbKind::Shore, Resolution::High).is_ok());
}

#[test]
fn missing_resolution_falls_back_to_a_coarser_one() {
    let dir = tempfile::tempdir().unwrap();
    write_all_kinds(dir.path(), Resolution::Crude);
    write_all_kinds(dir.path(), Resolution::Intermediate);
    // a lone shoreline file does not make a resolution available
    builder().write(dir.path().join(DbKind::Shore.file_name(Resolution::High)), false).unwrap();

    let config = ShoreConfig::default().with_gshhg_dir(dir.path());
    assert_eq!(available_resolutions(&config), [true, false, true, false, false]);
    assert_eq!(adjust_resolution(&config, Resolution::Full), Resolution::Intermediate);
    assert_eq!(adjust_resolution(&config, Resolution::Low), Resolution::Crude);
    assert_eq!(adjust_resolution(&config, Resolution::Intermediate), Resolution::Intermediate);
}

#[test]
fn nothing_available_keeps_the_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = ShoreConfig::default().with_gshhg_dir(dir.path());
    assert_eq!(adjust_resolution(&config, Resolution::High), Resolution::High);
}

#[test]
fn old_database_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DbKind::Shore.file_name(Resolution::Crude));
    builder().with_version("2.0.0").write(&path, false).unwrap();
    assert_eq!(database_version(&path).unwrap().to_string(), "2.0.0");

    let config = ShoreConfig::default().with_gshhg_dir(dir.path());
    let err = ShoreCatalog::open(&config, Resolution::Crude, &bin_region(), &ShoreSelect::default())
        .err()
        .unwrap();
    match err {
        ShoreError::BadVersion { found, required, .. } => {
            assert_eq!(found, "2.0.0");
            assert_eq!(required, "2.2.0");
        }
        other => panic!("expected BadVersion, got {other}"),
    }
}

#[test]
fn missing_database_names_its_stem() {
    let dir = tempfile::tempdir().unwrap();
    let config = ShoreConfig::default().with_gshhg_dir(dir.path());
    let err = ShoreCatalog::open(&config, Resolution::Full, &bin_region(), &ShoreSelect::default())
        .err()
        .unwrap();
    assert!(matches!(err, ShoreError::FileNotFound { ref stem } if stem == "binned_GSHHS_f"));
    assert!(err.to_string().contains("binned_GSHHS_f"));
}
