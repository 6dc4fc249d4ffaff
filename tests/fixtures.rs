//! Fixture-driven tests. Every `tests/fixtures/*.luco` document must
//! parse, survive a luco round trip, and match the `.json` expectation
//! stored next to it when one exists. Every `*.nuco` document must be
//! rejected with a parsing error.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use luco::{try_parse, Indent};

fn fixture_files(extension: &str) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/tests/fixtures/*.{}",
        env!("CARGO_MANIFEST_DIR"),
        extension
    );
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .expect("fixture glob pattern is well formed")
        .flatten()
        .collect();
    files.sort();
    assert!(!files.is_empty(), "no fixtures matched {pattern}");
    files
}

fn run_accept_fixture(path: &Path) -> Result<(), String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
    let document = try_parse(&text).map_err(|e| format!("parse failed:\n{e}"))?;

    let dumped = document.dump_to_string(Indent::default());
    let reparsed = try_parse(&dumped).map_err(|e| format!("round trip parse failed:\n{e}"))?;
    if reparsed != document {
        return Err(format!("round trip drifted, dumped text was:\n{dumped}"));
    }

    let expectation = path.with_extension("json");
    if expectation.exists() {
        let expected =
            fs::read_to_string(&expectation).map_err(|e| format!("read failed: {e}"))?;
        let actual = document.dump_to_json_string(Indent::default());
        if actual != expected {
            return Err(format!("json mismatch, got:\n{actual}\nwanted:\n{expected}"));
        }
    }
    Ok(())
}

fn run_reject_fixture(path: &Path) -> Result<(), String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
    match try_parse(&text) {
        Ok(document) => Err(format!(
            "parsed but should not have, document was:\n{document}"
        )),
        Err(error) if error.is_parsing() => Ok(()),
        Err(error) => Err(format!("rejected with the wrong error kind: {error}")),
    }
}

#[test]
fn accept_fixtures() {
    let mut failed = 0;
    for path in fixture_files("luco") {
        match run_accept_fixture(&path) {
            Ok(()) => println!("PASS {}", path.display()),
            Err(reason) => {
                failed += 1;
                println!("FAIL {}\n{reason}", path.display());
            }
        }
    }
    assert_eq!(failed, 0, "{failed} accept fixture(s) failed");
}

#[test]
fn reject_fixtures() {
    let mut failed = 0;
    for path in fixture_files("nuco") {
        match run_reject_fixture(&path) {
            Ok(()) => println!("PASS {}", path.display()),
            Err(reason) => {
                failed += 1;
                println!("FAIL {}\n{reason}", path.display());
            }
        }
    }
    assert_eq!(failed, 0, "{failed} reject fixture(s) failed");
}

#[test]
fn fixture_errors_carry_locations() {
    let text = fs::read_to_string(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/unbalanced.nuco"),
    )
    .unwrap();
    let error = try_parse(&text).unwrap_err();
    assert!(error.to_string().contains("2:1"), "{error}");
}

#[test]
fn fixture_dump_is_stable() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/nested.luco");
    let document = try_parse(&fs::read_to_string(path).unwrap()).unwrap();
    let once = document.dump_to_string(Indent::default());
    let twice = try_parse(&once).unwrap().dump_to_string(Indent::default());
    assert_eq!(once, twice);
}
