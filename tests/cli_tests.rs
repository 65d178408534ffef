//! CLI binary tests
//!
//! Runs the `rollbook` binary through assert_cmd against rosters written
//! into temporary directories.

#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use std::path::PathBuf;
use tempfile::TempDir;

fn rollbook() -> Command {
    Command::cargo_bin("rollbook").unwrap()
}

fn write_roster(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("roster.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    let header = ["ที่", "รหัสนักศึกษา", "ชื่อ - นามสกุล"];
    for (col, text) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *text).unwrap();
    }
    sheet.write_string(0, 9, "MATH101").unwrap();
    sheet.write_string(0, 10, "SCI201").unwrap();

    let students = [("S001", "Somchai Jaidee", true, false), ("S002", "Suda Rakdee", true, true)];
    for (idx, (id, name, math, sci)) in students.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_number(row, 0, (idx + 1) as f64).unwrap();
        sheet.write_string(row, 1, *id).unwrap();
        sheet.write_string(row, 2, *name).unwrap();
        for col in 3..9u16 {
            sheet.write_number(row, col, 50.0).unwrap();
        }
        if *math {
            sheet.write_string(row, 9, "*").unwrap();
        }
        if *sci {
            sheet.write_string(row, 10, "*").unwrap();
        }
    }

    workbook.save(&path).unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    rollbook()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rollbook"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    rollbook()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rollbook"));
}

#[test]
fn test_split_help() {
    rollbook()
        .args(["split", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--semester"))
        .stdout(predicate::str::contains("--group"));
}

// ═══════════════════════════════════════════════════════════════════════════
// CHECK
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_check_valid_roster() {
    let dir = TempDir::new().unwrap();
    let path = write_roster(&dir);
    rollbook()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("File can be imported"));
}

#[test]
fn test_check_unsupported_extension_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roster.csv");
    std::fs::write(&path, "a,b,c").unwrap();
    rollbook()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ประเภทไฟล์ไม่ถูกต้อง"));
}

// ═══════════════════════════════════════════════════════════════════════════
// INSPECT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_inspect_lists_subjects() {
    let dir = TempDir::new().unwrap();
    let path = write_roster(&dir);
    rollbook()
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("MATH101"))
        .stdout(predicate::str::contains("SCI201"))
        .stdout(predicate::str::contains("Somchai Jaidee"));
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    let path = write_roster(&dir);
    let output = rollbook()
        .args(["inspect", "--json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["students"].as_array().unwrap().len(), 2);
    assert_eq!(value["subjects"][0]["subject_code"], "MATH101");
    assert_eq!(value["header"]["kind"], "detected");
}

#[test]
fn test_inspect_malformed_roster_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tiny.xlsx");
    let mut workbook = Workbook::new();
    workbook
        .add_worksheet()
        .write_string(0, 0, "only one row")
        .unwrap();
    workbook.save(&path).unwrap();

    rollbook()
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ไม่มีข้อมูลหรือรูปแบบไม่ถูกต้อง"));
}

// ═══════════════════════════════════════════════════════════════════════════
// SPLIT AND SUBJECT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_split_writes_zip() {
    let dir = TempDir::new().unwrap();
    let path = write_roster(&dir);
    let out = dir.path().join("out");

    rollbook()
        .arg("split")
        .arg(&path)
        .arg("-o")
        .arg(&out)
        .args(["--semester", "1", "--year", "2568", "--group", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Split Complete"))
        .stdout(predicate::str::contains("100%"));

    assert!(out.join("แบบบันทึกคะแนนทุกวิชา.zip").is_file());
}

#[test]
fn test_split_rejects_invalid_semester() {
    let dir = TempDir::new().unwrap();
    let path = write_roster(&dir);
    rollbook()
        .arg("split")
        .arg(&path)
        .arg("-o")
        .arg(dir.path())
        .args(["--semester", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ภาคเรียน"));
}

#[test]
fn test_subject_writes_named_sheet() {
    let dir = TempDir::new().unwrap();
    let path = write_roster(&dir);
    let out = dir.path().join("out");

    rollbook()
        .arg("subject")
        .arg(&path)
        .arg("SCI201")
        .arg("-o")
        .arg(&out)
        .args(["--term", "ปลายภาค"])
        .assert()
        .success();

    assert!(out.join("แบบบันทึกคะแนนปลายภาค-SCI201.xlsx").is_file());
}

#[test]
fn test_subject_unknown_code_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_roster(&dir);
    rollbook()
        .arg("subject")
        .arg(&path)
        .arg("ART999")
        .arg("-o")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("ART999"));
}
