//! Whole-file conversions of the deck fixtures.

use std::fs;
use std::path::PathBuf;

use abq2ops_io::{
    ConvertOptions, FileStatus, batch_convert, convert, convert_file, summary_json,
};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../tests/fixtures");
    path.push(name);
    path
}

#[test]
fn shell_plate_converts_to_expected_script() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("shell_plate.inp");
    fs::copy(fixture_path("shell_plate.inp"), &input).expect("copy fixture");

    let converted = convert_file(&input, &ConvertOptions::default()).expect("convert");
    let script = fs::read_to_string(&converted.output).expect("read script");

    assert!(script.contains("\nmodel('basic', '-ndm', 3, '-ndf', 6)\n"));
    assert!(script.contains("\nelement('ShellMITC4', 1, 1, 2, 3, 4, 1)\n"));
    assert!(script.contains("\nload(4, 0.0, 0.0, -1000.0, 0.0, 0.0, 0.0)\n"));
    assert_eq!(converted.summary.fixed_dofs, 12);
    assert_eq!(converted.stats.element_groups, 1);
}

#[test]
fn included_deck_converts_from_its_own_directory() {
    let script = convert(fixture_path("mixed_solid.inp")).expect("convert mixed_solid");
    assert_eq!(script.matches("\nnode(").count(), 9);
    assert!(script.contains("\nelement('stdBrick', 1, 1, 2, 3, 4, 5, 6, 7, 8, 1)\n"));
}

#[test]
fn info_json_lists_element_types() {
    let model = abq2ops_io::parse_file(fixture_path("mixed_solid.inp")).expect("parse");
    let summary = abq2ops_model::ModelSummary::from_model(&model);
    let json: serde_json::Value =
        serde_json::from_str(&summary_json(&summary).expect("json")).expect("valid json");

    assert_eq!(json["nodes"], 9);
    assert_eq!(json["elements"], 2);
    assert_eq!(json["element_types"]["C3D8R"], 1);
    assert_eq!(json["element_types"]["T3D2"], 1);
    assert_eq!(json["material_names"][0], "Concrete");
}

#[test]
fn batch_over_fixture_copies() {
    let dir = tempfile::tempdir().expect("temp dir");
    for name in ["shell_plate.inp", "mixed_solid.inp", "mixed_solid_nodes.inc"] {
        fs::copy(fixture_path(name), dir.path().join(name)).expect("copy fixture");
    }
    let out = dir.path().join("py");

    let report = batch_convert(dir.path(), Some(&out), false).expect("batch");
    assert_eq!(report.outcomes.len(), 2, "the .inc file is not a deck");
    assert!(report.outcomes.iter().all(|o| o.status == FileStatus::Converted));
    assert!(out.join("mixed_solid.py").is_file());
    assert!(out.join("shell_plate.py").is_file());
}
