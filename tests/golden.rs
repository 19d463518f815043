//! Golden report tests
//!
//! Every directory under `tests/golden/` is a Go package with an
//! `expected.txt` holding its exact report.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

fn run_golden_test(name: &str) {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("golden")
        .join(name);
    let expected = fs::read_to_string(dir.join("expected.txt")).unwrap();

    let report = errdoc::load_err_codes(&dir)
        .unwrap_or_else(|err| panic!("loading {}: {err}", dir.display()));
    assert_eq!(report, expected, "report of {name}");
}

#[test]
fn golden_grouped_iota() {
    run_golden_test("account");
}

#[test]
fn golden_multiple_files() {
    run_golden_test("billing");
}

#[test]
fn golden_no_codes() {
    run_golden_test("plain");
}

#[test]
fn golden_directories_all_covered() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("golden");
    let mut cases: Vec<String> = fs::read_dir(&root)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().join("expected.txt").is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    cases.sort();
    assert_eq!(cases, vec!["account", "billing", "plain"]);
}
