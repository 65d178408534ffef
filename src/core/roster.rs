//! Roster parser - raw sheet grid → student records and subject rosters
//!
//! Expected sheet shape (one or two title rows may sit above the header):
//!
//! ```text
//! A     B              C                D..I          J..
//! ที่    รหัสนักศึกษา     ชื่อ - นามสกุล      6 score cols  one column per subject code
//! 1     S001           Somchai Jaidee   80 75 ...     "*" marks enrollment
//! ```

use crate::core::reshape::{reshape, SubjectAccumulators};
use crate::core::score::{process_score_value, ScoreOptions};
use crate::error::{RollbookError, RollbookResult};
use crate::types::{
    cell_at, CellValue, HeaderLocation, ParsedRoster, RawGrid, RosterEntry, StudentRecord,
    SubjectColumns, SCORE_COUNT,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Minimum number of grid rows (title/header/data)
pub const MIN_ROWS: usize = 3;
/// Only the first rows are searched for the header
pub const HEADER_SCAN_ROWS: usize = 3;
/// Header must reach column J
pub const MIN_HEADER_COLUMNS: usize = 10;
/// First score column (D)
pub const FIRST_SCORE_COLUMN: usize = 3;
/// First subject column (J)
pub const FIRST_SUBJECT_COLUMN: usize = 9;
/// Marks a student as enrolled in a subject column
pub const ENROLLMENT_MARKER: char = '*';

/// Parser for one roster sheet
#[derive(Debug, Clone, Default)]
pub struct RosterParser {
    options: ScoreOptions,
}

impl RosterParser {
    /// Create a parser with the given score coercion options
    pub fn new(options: ScoreOptions) -> Self {
        Self { options }
    }

    /// Parse a grid into students and per-subject rosters.
    ///
    /// All structural problems are fatal; no partial result is returned.
    pub fn parse(&self, grid: &RawGrid) -> RollbookResult<ParsedRoster> {
        if grid.len() < MIN_ROWS {
            return Err(RollbookError::EmptyOrMalformedSheet { rows: grid.len() });
        }

        let header = detect_header(grid);
        let mut warnings = Vec::new();
        match header {
            HeaderLocation::Detected { row } => {
                info!("Header found at row {}", row + 1);
            }
            HeaderLocation::Fallback => {
                warn!(
                    "No header row matched in the first {} rows, using row 1",
                    HEADER_SCAN_ROWS
                );
                warnings.push(format!(
                    "ไม่พบแถวหัวตาราง (ที่ / รหัส / ชื่อ) ใน {} แถวแรก ใช้แถวที่ 1 เป็นหัวตาราง",
                    HEADER_SCAN_ROWS
                ));
            }
        }

        let header_row = &grid[header.header_row()];
        if header_row.len() < MIN_HEADER_COLUMNS {
            return Err(RollbookError::InsufficientColumns {
                found: header_row.len(),
            });
        }

        let subject_columns = subject_columns(header_row);
        if subject_columns.is_empty() {
            return Err(RollbookError::NoSubjectColumnsFound);
        }
        debug!(
            "Subject columns found: {:?}",
            subject_columns.codes().collect::<Vec<_>>()
        );

        let mut accumulators = SubjectAccumulators::from_columns(&subject_columns);
        let mut students: Vec<StudentRecord> = Vec::new();

        for (idx, row) in grid.iter().enumerate().skip(header.data_start()) {
            if row.len() < 3 {
                debug!("Skipping row {}: insufficient data", idx + 1);
                continue;
            }

            let Some(student) = self.parse_student(row, students.len(), &subject_columns) else {
                debug!("Skipping row {}: missing student ID or name", idx + 1);
                continue;
            };

            for column in subject_columns.iter() {
                if student.is_enrolled(&column.code) {
                    accumulators.push(
                        &column.code,
                        RosterEntry {
                            student_id: student.student_id.clone(),
                            full_name: student.full_name.clone(),
                            scores: student.scores,
                        },
                    );
                }
            }
            students.push(student);
        }

        info!("Processed {} students", students.len());

        if students.is_empty() {
            return Err(RollbookError::NoValidStudentsFound);
        }
        if accumulators.enrolled_subject_count() == 0 {
            return Err(RollbookError::NoEnrolledSubjectsFound);
        }

        let subjects = reshape(accumulators);
        info!("Found {} subjects with enrolled students", subjects.len());

        Ok(ParsedRoster {
            students,
            subject_columns,
            subjects,
            header,
            warnings,
        })
    }

    /// Build a record from a data row, or `None` when id or name is blank.
    /// `accepted` is the number of rows accepted so far.
    fn parse_student(
        &self,
        row: &[CellValue],
        accepted: usize,
        subject_columns: &SubjectColumns,
    ) -> Option<StudentRecord> {
        let student_id = cell_at(row, 1).trimmed();
        let full_name = cell_at(row, 2).trimmed();
        if student_id.is_empty() || full_name.is_empty() {
            return None;
        }

        let rank = parse_rank(cell_at(row, 0)).unwrap_or(accepted as u32 + 1);

        let mut scores = [0.0; SCORE_COUNT];
        for (offset, score) in scores.iter_mut().enumerate() {
            *score = process_score_value(cell_at(row, FIRST_SCORE_COLUMN + offset), &self.options);
        }

        let subjects: BTreeMap<String, bool> = subject_columns
            .iter()
            .map(|column| (column.code.clone(), is_enrollment_mark(cell_at(row, column.column))))
            .collect();

        Some(StudentRecord {
            rank,
            student_id,
            full_name,
            scores,
            subjects,
        })
    }
}

/// Parse with a fresh [`RosterParser`]
pub fn parse_grid(grid: &RawGrid, options: &ScoreOptions) -> RollbookResult<ParsedRoster> {
    RosterParser::new(*options).parse(grid)
}

/// Find the header among the first rows, falling back to row 0
pub fn detect_header(grid: &RawGrid) -> HeaderLocation {
    grid.iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| is_header_row(row))
        .map_or(HeaderLocation::Fallback, |row| HeaderLocation::Detected { row })
}

/// Rank / student id / name columns, in Thai (or "student" for the id)
fn is_header_row(row: &[CellValue]) -> bool {
    if row.len() <= 2 {
        return false;
    }
    let rank = row[0].trimmed();
    let id = row[1].trimmed();
    let name = row[2].trimmed();

    let rank_ok = rank == "ที่" || rank.contains("อันดับ");
    let id_ok = id.contains("รหัส") || id.to_ascii_lowercase().contains("student");
    let name_ok = name.contains("ชื่อ") || name.contains("นาม");

    rank_ok && id_ok && name_ok
}

/// Subject codes from column J onward. Whitespace is removed from codes;
/// a repeated code points at its last column.
fn subject_columns(header: &[CellValue]) -> SubjectColumns {
    let mut columns = SubjectColumns::new();
    for (idx, cell) in header.iter().enumerate().skip(FIRST_SUBJECT_COLUMN) {
        let code = clean_subject_code(&cell.as_text());
        if !code.is_empty() {
            columns.insert(code, idx);
        }
    }
    columns
}

/// Strip all whitespace: " MATH 101 " → "MATH101"
pub fn clean_subject_code(raw: &str) -> String {
    raw.split_whitespace().collect()
}

/// An enrollment cell counts when its trimmed text contains `*`
pub fn is_enrollment_mark(cell: &CellValue) -> bool {
    cell.as_text().trim().contains(ENROLLMENT_MARKER)
}

/// Leading integer of the rank cell; zero, negative or missing → `None`
fn parse_rank(cell: &CellValue) -> Option<u32> {
    let text = cell.trimmed();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(&text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if negative || end == 0 {
        return None;
    }
    digits[..end].parse::<u32>().ok().filter(|&rank| rank > 0)
}
