use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Number of score columns read per student (columns D..I).
pub const SCORE_COUNT: usize = 6;

//==============================================================================
// Raw Grid
//==============================================================================

/// A single spreadsheet cell, converted once at the import boundary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// String form of the cell: Empty → "", numbers in shortest decimal form
    /// (80.0 → "80"), text as is.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Empty => Cow::Borrowed(""),
            CellValue::Number(n) => Cow::Owned(n.to_string()),
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Trimmed string form of the cell
    pub fn trimmed(&self) -> String {
        self.as_text().trim().to_string()
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }
}

/// Rows of cells from the first worksheet. Rows may have different lengths.
pub type RawGrid = Vec<Vec<CellValue>>;

/// Cell at `col`, or `Empty` past the end of a short row.
pub fn cell_at(row: &[CellValue], col: usize) -> &CellValue {
    static EMPTY: CellValue = CellValue::Empty;
    row.get(col).unwrap_or(&EMPTY)
}

//==============================================================================
// Subject Column Map
//==============================================================================

/// A subject header and the column holding its enrollment markers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectColumn {
    pub code: String,
    pub column: usize,
}

/// Subject code → column index, in first-appearance order.
///
/// Inserting an existing code replaces its column but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectColumns(Vec<SubjectColumn>);

impl SubjectColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: String, column: usize) {
        match self.0.iter_mut().find(|entry| entry.code == code) {
            Some(entry) => entry.column = column,
            None => self.0.push(SubjectColumn { code, column }),
        }
    }

    pub fn get(&self, code: &str) -> Option<usize> {
        self.0
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubjectColumn> {
        self.0.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|entry| entry.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//==============================================================================
// Students and Rosters
//==============================================================================

/// One student row from the roster sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// 1-based rank from column A, or the row's position among accepted rows
    pub rank: u32,
    pub student_id: String,
    pub full_name: String,
    pub scores: [f64; SCORE_COUNT],
    /// Enrollment flag for every subject column
    pub subjects: BTreeMap<String, bool>,
}

impl StudentRecord {
    pub fn is_enrolled(&self, subject_code: &str) -> bool {
        self.subjects.get(subject_code).copied().unwrap_or(false)
    }
}

/// A student as listed on a subject's score sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub student_id: String,
    pub full_name: String,
    pub scores: [f64; SCORE_COUNT],
}

/// All students enrolled in one subject, in roster order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRoster {
    pub subject_code: String,
    pub students: Vec<RosterEntry>,
}

impl SubjectRoster {
    pub fn new(subject_code: impl Into<String>) -> Self {
        Self {
            subject_code: subject_code.into(),
            students: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

//==============================================================================
// Parse Result
//==============================================================================

/// Where the header row was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeaderLocation {
    /// Row matched the rank / student id / name heuristic
    Detected { row: usize },
    /// No row matched; row 0 was used as the header
    Fallback,
}

impl HeaderLocation {
    pub fn header_row(&self) -> usize {
        match self {
            HeaderLocation::Detected { row } => *row,
            HeaderLocation::Fallback => 0,
        }
    }

    pub fn data_start(&self) -> usize {
        self.header_row() + 1
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, HeaderLocation::Fallback)
    }
}

/// Everything extracted from one roster sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRoster {
    pub students: Vec<StudentRecord>,
    pub subject_columns: SubjectColumns,
    /// Subjects with at least one enrolled student, in column order
    pub subjects: Vec<SubjectRoster>,
    pub header: HeaderLocation,
    /// Advisory messages (header fallback, etc.)
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_as_text() {
        assert_eq!(CellValue::Empty.as_text(), "");
        assert_eq!(CellValue::Number(80.0).as_text(), "80");
        assert_eq!(CellValue::Number(80.5).as_text(), "80.5");
        assert_eq!(CellValue::text("  S001 ").trimmed(), "S001");
    }

    #[test]
    fn test_cell_from_empty_str_is_empty() {
        assert!(CellValue::from("").is_empty());
        assert_eq!(CellValue::from("*"), CellValue::Text("*".to_string()));
    }

    #[test]
    fn test_cell_at_past_row_end() {
        let row = vec![CellValue::from(1)];
        assert_eq!(cell_at(&row, 0), &CellValue::Number(1.0));
        assert_eq!(cell_at(&row, 5), &CellValue::Empty);
    }

    #[test]
    fn test_subject_columns_duplicate_keeps_position() {
        let mut columns = SubjectColumns::new();
        columns.insert("MATH101".to_string(), 9);
        columns.insert("SCI201".to_string(), 10);
        columns.insert("MATH101".to_string(), 11);

        let codes: Vec<&str> = columns.codes().collect();
        assert_eq!(codes, vec!["MATH101", "SCI201"]);
        assert_eq!(columns.get("MATH101"), Some(11));
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn test_header_location_rows() {
        let detected = HeaderLocation::Detected { row: 1 };
        assert_eq!(detected.header_row(), 1);
        assert_eq!(detected.data_start(), 2);
        assert!(!detected.is_fallback());

        assert_eq!(HeaderLocation::Fallback.header_row(), 0);
        assert_eq!(HeaderLocation::Fallback.data_start(), 1);
    }
}
