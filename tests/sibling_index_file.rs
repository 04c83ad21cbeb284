//! A `<name>.tdms_index` sibling file next to the data file is consulted
//! for metadata instead of re-scanning the (potentially huge) data file,
//! per spec §6.
mod common;

use common::{build_file, build_index_segment, build_segment, f64_samples, ObjDecl, TY_F64};
use std::io::Write;
use tdms_reader::open_path;
use tempfile::tempdir;

#[test]
fn index_file_is_used_when_present() {
    let dir = tempdir().unwrap();
    let data_path = dir.path().join("recording.tdms");
    let index_path = dir.path().join("recording.tdms_index");

    let objects = vec![ObjDecl::fresh("/'G'/'C'", TY_F64, 4)];
    let raw = f64_samples(&[1.0, 2.0, 3.0, 4.0]);
    let data_segment = build_segment(&objects, true, false, false, &raw, false);
    std::fs::File::create(&data_path).unwrap().write_all(&build_file(vec![data_segment])).unwrap();

    let index_segment = build_index_segment(&objects, true, false, raw.len() as u64);
    std::fs::File::create(&index_path).unwrap().write_all(&build_file(vec![index_segment])).unwrap();

    let file = open_path(&data_path, None).unwrap();
    let channel = file.group("G").unwrap().channel("C").unwrap();
    assert_eq!(channel.iter().unwrap().as_f64_vec().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn falls_back_to_scanning_the_data_file_without_a_sibling_index() {
    let dir = tempdir().unwrap();
    let data_path = dir.path().join("standalone.tdms");

    let objects = vec![ObjDecl::fresh("/'G'/'C'", TY_F64, 2)];
    let raw = f64_samples(&[9.0, 10.0]);
    let segment = build_segment(&objects, true, false, false, &raw, false);
    std::fs::File::create(&data_path).unwrap().write_all(&build_file(vec![segment])).unwrap();

    let file = open_path(&data_path, None).unwrap();
    let channel = file.group("G").unwrap().channel("C").unwrap();
    assert_eq!(channel.iter().unwrap().as_f64_vec().unwrap(), vec![9.0, 10.0]);
}
