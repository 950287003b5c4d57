//! Integration tests for `ice import` and `ice validate`.

mod common;

use common::{TestEnv, parse_json};
use predicates::prelude::*;

const BATCH: &str = "\
title,impact,confidence,effort,tags
,2,0.8,0,
Ship onboarding,2,0.8,1,\"growth;ux\"
";

#[test]
fn test_import_rejects_bad_row_keeps_good_one() {
    let env = TestEnv::new();
    let input = env.write_input("batch.csv", BATCH);

    let output = env
        .ice()
        .args(["import", input.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = parse_json(&output);
    let accepted = json["accepted"].as_array().unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0]["title"], "Ship onboarding");
    assert_eq!(accepted[0]["tags"], serde_json::json!(["growth", "ux"]));
    assert_eq!(accepted[0]["provenance"]["effort"], "user");

    let rejected = json["rejected"].as_array().unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0]["row"], 0);
    let reasons = rejected[0]["reasons"].as_array().unwrap();
    assert_eq!(reasons.len(), 2);
    assert!(reasons[0].as_str().unwrap().contains("title"));
    assert!(reasons[1].as_str().unwrap().contains("effort"));
}

#[test]
fn test_import_human() {
    let env = TestEnv::new();

    env.ice()
        .args(["import", "-H"])
        .write_stdin(BATCH)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Imported 1 idea(s), rejected 1 row(s) (ice)",
        ))
        .stdout(predicate::str::contains("row 0: title is required"));
}

#[test]
fn test_import_reports_dropped_cells() {
    let env = TestEnv::new();
    let input = env.write_input("batch.csv", "title,impact,effort\nA,7,soon\n");

    env.ice()
        .args(["import", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"field\":\"impact\""))
        .stdout(predicate::str::contains("\"value\":\"soon\""));
}

#[test]
fn test_import_malformed_table_fails() {
    let env = TestEnv::new();

    env.ice()
        .arg("import")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed table"));

    env.ice()
        .arg("import")
        .write_stdin("foo,bar\n1,2\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no recognized columns"));
}

#[test]
fn test_import_rice_requires_positive_reach() {
    let env = TestEnv::new();
    let input = env.write_input("batch.csv", "title,reach,effort\nA,0,1\nB,50,1\n");

    let output = env
        .ice()
        .args(["import", input.to_str().unwrap(), "--model", "rice"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = parse_json(&output);
    assert_eq!(json["model"], "rice");
    assert_eq!(json["accepted"].as_array().unwrap().len(), 1);
    assert!(
        json["rejected"][0]["reasons"][0]
            .as_str()
            .unwrap()
            .contains("reach")
    );
}

#[test]
fn test_validate_lists_every_violation() {
    let env = TestEnv::new();
    let input = env.write_input("batch.csv", "title,effort,confidence\n,-1,2\nFine,1,0.5\n");

    let output = env
        .ice()
        .args(["validate", input.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = parse_json(&output);
    assert_eq!(json["valid"], 1);
    assert_eq!(json["invalid"], 1);
    assert_eq!(json["records"][0]["violations"].as_array().unwrap().len(), 3);
    assert_eq!(json["records"][0]["status"], "invalid");
    assert_eq!(json["records"][1]["status"], "incomplete");
}

#[test]
fn test_validate_text_with_explicit_format() {
    let env = TestEnv::new();
    // Text parsing drops out-of-range values, so the only violation left is the title
    let input = env.write_input("ideas.csv", "| I:2 | E:0\nGood | I:1 | C:1 | E:1\n");

    env.ice()
        .args(["validate", input.to_str().unwrap(), "--format", "text", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 valid, 1 with violations (ice)"))
        .stdout(predicate::str::contains("- title is required"))
        .stdout(predicate::str::contains("Good [valid]"));
}

#[test]
fn test_import_skips_rows_of_empty_cells() {
    let env = TestEnv::new();

    let output = env
        .ice()
        .arg("import")
        .write_stdin("title,effort\nA,1\n,\n,,\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = parse_json(&output);
    assert_eq!(json["accepted"].as_array().unwrap().len(), 1);
    assert!(json["rejected"].as_array().unwrap().is_empty());
}
