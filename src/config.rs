//! Generation settings - semester, academic year, labels and score options
//!
//! Settings come from an optional YAML file; command-line flags override
//! individual fields. Every field has a default, so an empty file is valid:
//!
//! ```yaml
//! semester: 2
//! academic_year: 2567
//! term_label: กลางภาค
//! group_number: "1"
//! display_names:
//!   พค21001: ภาษาไทย
//! scores:
//!   max_value: 100
//! ```

use crate::core::score::ScoreOptions;
use crate::error::{RollbookError, RollbookResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Fixed prefix of document titles and file names ("score record form")
pub const DOCUMENT_LABEL: &str = "แบบบันทึกคะแนน";

/// Default institution line printed on every sheet
pub const DEFAULT_INSTITUTION: &str =
    "ศูนย์การศึกษานอกระบบและการศึกษาตามอัธยาศัยอำเภอเมืองนครสวรรค์";

pub const SEMESTER_RANGE: std::ops::RangeInclusive<u8> = 1..=3;
/// Buddhist calendar sanity range
pub const ACADEMIC_YEAR_RANGE: std::ops::RangeInclusive<u16> = 2500..=2600;

/// Settings that affect generated sheet content and file names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub semester: u8,
    pub academic_year: u16,
    /// Term wording appended to the document label, e.g. "กลางภาค" (midterm)
    pub term_label: String,
    /// Study group embedded in file names; blank leaves it out
    pub group_number: String,
    pub institution: String,
    /// Subject code → title shown on the sheet
    pub display_names: BTreeMap<String, String>,
    pub scores: ScoreOptions,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            semester: 2,
            academic_year: 2567,
            term_label: "กลางภาค".to_string(),
            group_number: String::new(),
            institution: DEFAULT_INSTITUTION.to_string(),
            display_names: BTreeMap::new(),
            scores: ScoreOptions::default(),
        }
    }
}

impl GenerationConfig {
    /// Load settings from a YAML file
    pub fn from_yaml_file(path: &Path) -> RollbookResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> RollbookResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: GenerationConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check semester and academic year ranges
    pub fn validate(&self) -> RollbookResult<()> {
        if !SEMESTER_RANGE.contains(&self.semester) {
            return Err(RollbookError::InvalidConfig(format!(
                "ภาคเรียนต้องอยู่ระหว่าง {} ถึง {} (ได้ {})",
                SEMESTER_RANGE.start(),
                SEMESTER_RANGE.end(),
                self.semester
            )));
        }
        if !ACADEMIC_YEAR_RANGE.contains(&self.academic_year) {
            return Err(RollbookError::InvalidConfig(format!(
                "ปีการศึกษาต้องอยู่ระหว่าง {} ถึง {} (ได้ {})",
                ACADEMIC_YEAR_RANGE.start(),
                ACADEMIC_YEAR_RANGE.end(),
                self.academic_year
            )));
        }
        if self.scores.min_value > self.scores.max_value {
            return Err(RollbookError::InvalidConfig(format!(
                "min_value ({}) มากกว่า max_value ({})",
                self.scores.min_value, self.scores.max_value
            )));
        }
        Ok(())
    }

    /// Title for a subject: the override if set, else the code
    pub fn display_name<'a>(&'a self, subject_code: &'a str) -> &'a str {
        self.display_names
            .get(subject_code)
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(subject_code)
    }

    /// "แบบบันทึกคะแนน" + term label
    pub fn document_title(&self) -> String {
        format!("{}{}", DOCUMENT_LABEL, self.term_label)
    }
}
