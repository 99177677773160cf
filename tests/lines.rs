// Integration tests for river and border databases

mod common;

use common::*;
use shorebin::{build::DbBuilder, LineCatalog, LineKind, Region, Resolution};

fn rivers() -> DbBuilder {
    let mut db = DbBuilder::lines(BIN_SIZE).unwrap().with_title("rivers");
    db.add_line(BIN, 1, &[(0, 30000), (30000, 32000), (65535, 31000)]).unwrap();
    db.add_line(BIN, 2, &[(10000, 0), (12000, 20000)]).unwrap();
    db.add_line(BIN, 2, &[(40000, 0), (41000, 9000), (43000, 18000)]).unwrap();
    db.add_line(DATELINE_BIN, 1, &[(30000, 100), (65535, 200)]).unwrap();
    db
}

fn open(db: &DbBuilder, region: &Region) -> LineCatalog<binarray::MemArrays> {
    LineCatalog::init(db.build().unwrap(), LineKind::River, Resolution::Crude, region).unwrap()
}

#[test]
fn empty_level_list_keeps_everything() {
    let db = rivers();
    let mut catalog = open(&db, &bin_region());
    assert_eq!(catalog.n_bins(), 1);
    let bin = catalog.get_bin(0, &[]).unwrap();
    assert_eq!(bin.segments().len(), 3);
    assert_eq!(bin.segments()[2].dx, vec![40000, 41000, 43000]);
}

#[test]
fn levels_are_filtered() {
    let db = rivers();
    let mut catalog = open(&db, &bin_region());

    let minor = catalog.get_bin(0, &[2]).unwrap();
    assert_eq!(minor.segments().len(), 2);
    assert!(minor.segments().iter().all(|s| s.level == 2));

    let none = catalog.get_bin(0, &[7]).unwrap();
    assert!(none.is_empty());
}

#[test]
fn lines_carry_their_level_as_fid() {
    let db = rivers();
    let mut catalog = open(&db, &bin_region());
    let bin = catalog.get_bin(0, &[]).unwrap();

    let lines = bin.assemble(false, 0.0);
    assert_eq!(lines.iter().map(|l| (l.level, l.fid)).collect::<Vec<_>>(), vec![(1, 1), (2, 2), (2, 2)]);
    let first = &lines[0].ring.0;
    assert_eq!(first.len(), 3);
    assert_eq!(first[0].x, 0.0);
    assert!((first[0].y - (10.0 + 30000.0 * 20.0 / 65535.0)).abs() < 1e-9);
    assert!(!lines[0].is_closed());
}

#[test]
fn seam_bin_is_shifted_back() {
    let db = rivers();
    let mut catalog = open(&db, &Region::new(-10.0, 350.0, -90.0, 90.0));
    assert!(catalog.is_world());
    let index = catalog.bins_index(DATELINE_BIN);

    let bin = catalog.get_bin(index, &[]).unwrap();
    assert!(bin.straddles(170.0));
    let lines = bin.assemble(true, 350.0);
    let line = &lines[0].ring.0;
    assert!((line[0].x - (340.0 + 30000.0 * 20.0 / 65535.0)).abs() < 1e-9);
    assert!(line[1].x.abs() < 1e-9);
}

#[test]
fn out_of_range_bin_is_an_error() {
    let db = rivers();
    let mut catalog = open(&db, &bin_region());
    assert!(catalog.get_bin(3, &[]).is_err());
    catalog.close().unwrap();
}

#[test]
fn region_outside_coverage_is_rejected() {
    let mut arrays = rivers().build().unwrap();
    arrays.put("N_bins_in_file", vec![18i32]);
    let err = LineCatalog::init(arrays, LineKind::River, Resolution::Crude, &bin_region()).err().unwrap();
    assert!(matches!(err, shorebin::ShoreError::InvalidRegion(_)), "{err}");
}

trait BinsIndex {
    fn bins_index(&self, bin: usize) -> usize;
}

impl<R: binarray::ArrayReader> BinsIndex for LineCatalog<R> {
    fn bins_index(&self, bin: usize) -> usize {
        (0..self.n_bins()).find(|&i| self.bin_id(i) == Some(bin)).unwrap()
    }
}
