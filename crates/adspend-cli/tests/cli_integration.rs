//! CLI integration tests for adspend.
//!
//! Runs the real binary against temporary CSV files.

#![allow(deprecated)] // cargo_bin still works, just deprecated for custom build-dir

use assert_cmd::Command;
use predicates::prelude::*;
use std::fmt::Write as _;
use tempfile::TempDir;

fn adspend() -> Command {
    let mut cmd = Command::cargo_bin("adspend").expect("Failed to find adspend binary");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Writes a 40-row advertising dataset into a fresh temp dir.
fn dataset() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("advertising.csv");
    let mut csv = String::from("TV,Radio,Newspaper,Sales\n");
    for i in 0..40 {
        let tv = ((i * 37) % 97) as f32 * 3.0;
        let radio = ((i * 13) % 47) as f32;
        let paper = ((i * 7) % 61) as f32;
        writeln!(csv, "{tv},{radio},{paper},{}", 0.05 * tv + 0.2 * radio + 2.5).expect("write");
    }
    std::fs::write(&path, csv).expect("write dataset");
    (dir, path)
}

#[test]
fn test_help_lists_subcommands() {
    adspend()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("eda"));
}

#[test]
fn test_missing_input_exits_with_file_not_found() {
    adspend()
        .args(["eda", "--input", "/nonexistent/advertising.csv"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_eda_prints_summary() {
    let (_dir, input) = dataset();
    adspend()
        .args(["eda", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Data Cleaning"))
        .stdout(predicate::str::contains("Correlation Matrix"))
        .stdout(predicate::str::contains("Channel Trends"));
}

#[test]
fn test_run_writes_labeled_csv_and_json_report() {
    let (dir, input) = dataset();
    let output = dir.path().join("cleaned.csv");
    adspend()
        .args(["run", "--quick-grid", "--folds", "2", "--json", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"best_params\""))
        .stdout(predicate::str::contains("\"predicted_sales\""));

    let written = std::fs::read_to_string(&output).expect("output written");
    assert!(written.starts_with(
        "TV,Radio,Newspaper,Sales,TV_Test_Group,Radio_Test_Group,Newspaper_Test_Group"
    ));
    assert_eq!(written.lines().count(), 41);
}

#[test]
fn test_invalid_override_exits_with_config_error() {
    let (dir, input) = dataset();
    adspend()
        .args(["run", "--test-size", "1.5", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("out.csv"))
        .assert()
        .code(5)
        .stderr(predicate::str::contains("test_size"));
}

#[test]
fn test_missing_column_exits_with_data_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("partial.csv");
    std::fs::write(&input, "TV,Sales\n1,2\n3,4\n5,6\n").expect("write");
    adspend()
        .args(["eda", "--input"])
        .arg(&input)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Radio"));
}
