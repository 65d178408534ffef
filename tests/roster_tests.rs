//! Roster parsing tests over in-memory grids
//!
//! Covers header detection, enrollment, score coercion and the structural
//! failures that abort a parse.

use pretty_assertions::assert_eq;
use rollbook::core::score::{process_score_value, ScoreOptions};
use rollbook::core::{parse_grid, RosterParser};
use rollbook::types::{CellValue, HeaderLocation, RawGrid};
use rollbook::RollbookError;

fn row(cells: &[CellValue]) -> Vec<CellValue> {
    cells.to_vec()
}

fn text(s: &str) -> CellValue {
    CellValue::from(s)
}

fn num(n: f64) -> CellValue {
    CellValue::Number(n)
}

fn header(subjects: &[&str]) -> Vec<CellValue> {
    let mut cells = vec![text("ที่"), text("รหัสนักศึกษา"), text("ชื่อ - นามสกุล")];
    cells.extend((0..6).map(|_| CellValue::Empty));
    cells.extend(subjects.iter().map(|s| text(s)));
    cells
}

fn student(rank: f64, id: &str, name: &str, scores: [f64; 6], marks: &[&str]) -> Vec<CellValue> {
    let mut cells = vec![num(rank), text(id), text(name)];
    cells.extend(scores.iter().map(|&s| num(s)));
    cells.extend(marks.iter().map(|m| text(m)));
    cells
}

// ═══════════════════════════════════════════════════════════════════════════
// ROUND-TRIP SCENARIO
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_single_student_round_trip() {
    let grid: RawGrid = vec![
        row(&[text("แบบรายชื่อนักศึกษา")]),
        header(&["MATH101", "SCI201"]),
        student(
            1.0,
            "S001",
            "Somchai Jaidee",
            [80.0, 75.0, 90.0, 60.0, 70.0, 85.0],
            &["*", ""],
        ),
    ];

    let parsed = parse_grid(&grid, &ScoreOptions::default()).unwrap();

    assert_eq!(parsed.header, HeaderLocation::Detected { row: 1 });
    assert_eq!(parsed.students.len(), 1);
    let record = &parsed.students[0];
    assert_eq!(record.rank, 1);
    assert_eq!(record.student_id, "S001");
    assert_eq!(record.full_name, "Somchai Jaidee");
    assert_eq!(record.scores, [80.0, 75.0, 90.0, 60.0, 70.0, 85.0]);
    assert!(record.is_enrolled("MATH101"));
    assert!(!record.is_enrolled("SCI201"));
    assert_eq!(record.subjects.get("SCI201"), Some(&false));

    assert_eq!(parsed.subjects.len(), 1);
    assert_eq!(parsed.subjects[0].subject_code, "MATH101");
    assert_eq!(parsed.subjects[0].students[0].student_id, "S001");
    assert_eq!(parsed.subjects[0].students[0].full_name, "Somchai Jaidee");
    assert_eq!(parsed.subject_columns.len(), 2);
}

#[test]
fn test_parse_is_idempotent() {
    let grid: RawGrid = vec![
        header(&["A", "B"]),
        student(1.0, "S1", "One", [1.0; 6], &["*", "*"]),
        student(2.0, "S2", "Two", [2.0; 6], &["", "*"]),
    ];
    let parser = RosterParser::default();
    assert_eq!(parser.parse(&grid).unwrap(), parser.parse(&grid).unwrap());
}

// ═══════════════════════════════════════════════════════════════════════════
// STRUCTURAL FAILURES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_two_row_grid_fails() {
    let grid: RawGrid = vec![header(&["A"]), student(1.0, "S1", "One", [1.0; 6], &["*"])];
    let err = parse_grid(&grid, &ScoreOptions::default()).unwrap_err();
    assert!(matches!(err, RollbookError::EmptyOrMalformedSheet { rows: 2 }));
    assert!(err.is_format_error());
}

#[test]
fn test_eight_column_header_fails() {
    let mut short_header = header(&[]);
    short_header.truncate(8);
    let grid: RawGrid = vec![
        short_header,
        student(1.0, "S1", "One", [1.0; 6], &[]),
        student(2.0, "S2", "Two", [1.0; 6], &[]),
    ];
    let err = parse_grid(&grid, &ScoreOptions::default()).unwrap_err();
    assert!(matches!(err, RollbookError::InsufficientColumns { found: 8 }));
}

#[test]
fn test_no_enrollment_fails() {
    let grid: RawGrid = vec![
        header(&["A", "B"]),
        student(1.0, "S1", "One", [1.0; 6], &["", ""]),
        student(2.0, "S2", "Two", [1.0; 6], &["x", ""]),
    ];
    let err = parse_grid(&grid, &ScoreOptions::default()).unwrap_err();
    assert!(matches!(err, RollbookError::NoEnrolledSubjectsFound));
}

#[test]
fn test_no_valid_students_fails() {
    let grid: RawGrid = vec![
        header(&["A"]),
        row(&[num(1.0), text("S1")]),
        row(&[num(2.0), CellValue::Empty, text("Nobody")]),
    ];
    let err = parse_grid(&grid, &ScoreOptions::default()).unwrap_err();
    assert!(matches!(err, RollbookError::NoValidStudentsFound));
}

// ═══════════════════════════════════════════════════════════════════════════
// ROW FILTERING AND ORDER
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_rows_missing_id_or_name_contribute_nothing() {
    let grid: RawGrid = vec![
        header(&["A"]),
        student(1.0, "", "No Id", [1.0; 6], &["*"]),
        student(2.0, "S2", "  ", [1.0; 6], &["*"]),
        student(3.0, "S3", "Kept", [1.0; 6], &["*"]),
    ];
    let parsed = parse_grid(&grid, &ScoreOptions::default()).unwrap();

    assert_eq!(parsed.students.len(), 1);
    assert_eq!(parsed.students[0].student_id, "S3");
    assert_eq!(parsed.subjects[0].len(), 1);
}

#[test]
fn test_subjects_follow_header_order() {
    let grid: RawGrid = vec![
        header(&["ZOO", "ART", "MATH"]),
        student(1.0, "S1", "One", [1.0; 6], &["", "", "*"]),
        student(2.0, "S2", "Two", [1.0; 6], &["*", "", ""]),
    ];
    let parsed = parse_grid(&grid, &ScoreOptions::default()).unwrap();
    let codes: Vec<&str> = parsed
        .subjects
        .iter()
        .map(|s| s.subject_code.as_str())
        .collect();
    assert_eq!(codes, vec!["ZOO", "MATH"]);
}

#[test]
fn test_subject_code_whitespace_is_removed() {
    let grid: RawGrid = vec![
        header(&[" MATH 101 "]),
        student(1.0, "S1", "One", [1.0; 6], &[" * "]),
        student(2.0, "S2", "Two", [1.0; 6], &[""]),
    ];
    let parsed = parse_grid(&grid, &ScoreOptions::default()).unwrap();
    assert_eq!(parsed.subjects[0].subject_code, "MATH101");
}

#[test]
fn test_repeated_subject_uses_later_column() {
    let grid: RawGrid = vec![
        header(&["A", "B", "A"]),
        student(1.0, "S1", "One", [1.0; 6], &["", "", "*"]),
        student(2.0, "S2", "Two", [1.0; 6], &["*", "*", ""]),
    ];
    let parsed = parse_grid(&grid, &ScoreOptions::default()).unwrap();

    assert_eq!(parsed.subject_columns.len(), 2);
    assert_eq!(parsed.subject_columns.get("A"), Some(11));
    assert_eq!(parsed.subject_columns.get("B"), Some(10));

    // Enrollment in A is read from column L only
    assert!(parsed.students[0].is_enrolled("A"));
    assert!(!parsed.students[1].is_enrolled("A"));

    let codes: Vec<&str> = parsed
        .subjects
        .iter()
        .map(|s| s.subject_code.as_str())
        .collect();
    assert_eq!(codes, vec!["A", "B"]);
    assert_eq!(parsed.subjects[0].students[0].student_id, "S1");
    assert_eq!(parsed.subjects[0].len(), 1);
}

#[test]
fn test_header_fallback_is_reported() {
    let mut first = vec![text("No."), text("ID"), text("Name")];
    first.extend((0..6).map(|_| CellValue::Empty));
    first.push(text("A"));
    let grid: RawGrid = vec![
        first,
        student(1.0, "S1", "One", [1.0; 6], &["*"]),
        student(2.0, "S2", "Two", [1.0; 6], &["*"]),
    ];
    let parsed = parse_grid(&grid, &ScoreOptions::default()).unwrap();
    assert!(parsed.header.is_fallback());
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.students.len(), 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// SCORE COERCION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_scores_are_coerced_in_rows() {
    let mut data = vec![num(1.0), text("S1"), text("One")];
    data.extend([
        text("-"),
        text("N/A"),
        num(150.0),
        num(-5.0),
        text("80 pts"),
        CellValue::Empty,
    ]);
    data.push(text("*"));
    let grid: RawGrid = vec![
        header(&["A"]),
        data,
        student(2.0, "S2", "Two", [1.0; 6], &[""]),
    ];
    let parsed = parse_grid(&grid, &ScoreOptions::default()).unwrap();
    assert_eq!(parsed.students[0].scores, [0.0, 0.0, 100.0, 0.0, 80.0, 0.0]);
}

#[test]
fn test_scores_stay_in_bounds() {
    let options = ScoreOptions {
        min_value: 10.0,
        max_value: 50.0,
        default_value: 20.0,
        ..ScoreOptions::default()
    };
    let inputs = [
        CellValue::Empty,
        text("-"),
        text("abc"),
        num(-30.0),
        num(5.0),
        num(75.5),
        text("1e9"),
        num(33.333),
    ];
    for input in &inputs {
        let score = process_score_value(input, &options);
        assert!(
            (options.min_value..=options.max_value).contains(&score),
            "{input:?} → {score}"
        );
    }
    assert_eq!(process_score_value(&num(-30.0), &options), 20.0);
    assert_eq!(process_score_value(&text("-"), &options), 20.0);
}
