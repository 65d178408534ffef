//! Batch generation - every subject roster → sheet, then one zip
//!
//! Subjects are generated one at a time. A failure on one subject is
//! recorded and the rest still run; only a batch where nothing succeeds is
//! an error. Subject codes that map to the same file name ("A/B", "A_B")
//! get a numeric suffix so every sheet lands in the archive.

use crate::config::GenerationConfig;
use crate::core::reshape::find_subject;
use crate::core::roster::clean_subject_code;
use crate::error::{RollbookError, RollbookResult};
use crate::excel::{document_file_name, ArchivePackager, GeneratedDocument, SheetBuilder};
use crate::types::SubjectRoster;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{error, info, warn};

/// Progress event emitted before each unit of work
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub step: String,
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
}

impl Progress {
    fn new(step: String, completed: usize, total: usize, percent: f64) -> Self {
        Self {
            step,
            completed,
            total,
            percent,
        }
    }
}

/// A subject whose sheet could not be generated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectFailure {
    pub subject_code: String,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

/// Outcome of [`generate_all`]
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Successful sheets, in subject order
    pub documents: Vec<GeneratedDocument>,
    pub failures: Vec<SubjectFailure>,
    /// Zip of `documents`
    pub archive: Vec<u8>,
    pub started: DateTime<Local>,
    pub completed: DateTime<Local>,
}

impl BatchReport {
    /// Combined size of all generated sheets
    pub fn total_bytes(&self) -> usize {
        self.documents.iter().map(GeneratedDocument::size).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Build one subject's sheet and name it
pub fn generate_document(
    roster: &SubjectRoster,
    config: &GenerationConfig,
) -> RollbookResult<GeneratedDocument> {
    let bytes = SheetBuilder::new(config).build(roster)?;
    Ok(GeneratedDocument {
        subject_code: roster.subject_code.clone(),
        file_name: document_file_name(config, &roster.subject_code),
        bytes,
    })
}

/// Build the sheet for a single subject code. Whitespace in the code is
/// ignored, as it is for header cells.
pub fn generate_one(
    rosters: &[SubjectRoster],
    subject_code: &str,
    config: &GenerationConfig,
) -> RollbookResult<GeneratedDocument> {
    let roster = find_subject(rosters, &clean_subject_code(subject_code))
        .ok_or_else(|| RollbookError::SubjectNotFound(subject_code.to_string()))?;
    generate_document(roster, config)
}

/// Generate every subject, then bundle the successes into a zip.
///
/// `on_progress` is called before each subject, before packaging (95%) and
/// once at the end (100%). The packaging step counts as one extra step.
pub fn generate_all<F>(
    rosters: &[SubjectRoster],
    config: &GenerationConfig,
    mut on_progress: F,
) -> RollbookResult<BatchReport>
where
    F: FnMut(&Progress),
{
    let started = Local::now();
    let total = rosters.len() + 1;
    let mut documents = Vec::with_capacity(rosters.len());
    let mut failures = Vec::new();
    let mut used_names = HashSet::new();

    for (idx, roster) in rosters.iter().enumerate() {
        on_progress(&Progress::new(
            format!(
                "กำลังสร้างไฟล์สำหรับ {} ({} คน)",
                roster.subject_code,
                roster.len()
            ),
            idx,
            total,
            idx as f64 / total as f64 * 100.0,
        ));

        match generate_document(roster, config) {
            Ok(mut doc) => {
                let unique = unique_file_name(&mut used_names, &doc.file_name);
                if unique != doc.file_name {
                    warn!(
                        subject = %roster.subject_code,
                        "File name {} already used, writing {}",
                        doc.file_name,
                        unique
                    );
                    doc.file_name = unique;
                }
                info!(
                    subject = %roster.subject_code,
                    bytes = doc.size(),
                    "Generated sheet"
                );
                documents.push(doc);
            }
            Err(e) => {
                let failure = SubjectFailure {
                    subject_code: roster.subject_code.clone(),
                    message: e.to_string(),
                    timestamp: Local::now(),
                };
                error!(
                    subject = %failure.subject_code,
                    at = %failure.timestamp.format("%H:%M:%S"),
                    "{}",
                    failure.message
                );
                failures.push(failure);
            }
        }
    }

    if documents.is_empty() {
        return Err(RollbookError::AllGenerationFailed { failures });
    }

    let total_bytes: usize = documents.iter().map(GeneratedDocument::size).sum();
    on_progress(&Progress::new(
        format!("กำลังรวมไฟล์เป็น ZIP ({})", format_file_size(total_bytes)),
        total - 1,
        total,
        95.0,
    ));

    let archive = ArchivePackager::new().package(&documents)?;

    on_progress(&Progress::new(
        format!("เสร็จสิ้น - สร้างไฟล์ {} ไฟล์", documents.len()),
        total,
        total,
        100.0,
    ));

    Ok(BatchReport {
        documents,
        failures,
        archive,
        started,
        completed: Local::now(),
    })
}

/// `name`, or `stem-2.ext`, `stem-3.ext`, ... when already taken
fn unique_file_name(used: &mut HashSet<String>, name: &str) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (name, String::new()),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}{ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// "512.0 KB" below one megabyte, "1.50 MB" above
pub fn format_file_size(bytes: usize) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb < 1.0 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.2} MB", mb)
    }
}
