//! Archive packager - names generated sheets and bundles them into one zip

use crate::config::GenerationConfig;
use crate::error::{RollbookError, RollbookResult};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Bundle name for the all-subjects download ("score records - all subjects")
pub const ARCHIVE_FILE_NAME: &str = "แบบบันทึกคะแนนทุกวิชา.zip";

/// One rendered subject sheet
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDocument {
    pub subject_code: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl GeneratedDocument {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// `{label}{term}-{code}-กลุ่ม-{group}.xlsx`, or `{label}{term}-{code}.xlsx`
/// when no group number is set
pub fn document_file_name(config: &GenerationConfig, subject_code: &str) -> String {
    let code = subject_code.replace(['/', '\\'], "_");
    let group = config.group_number.trim();
    if group.is_empty() {
        format!("{}-{}.xlsx", config.document_title(), code)
    } else {
        format!("{}-{}-กลุ่ม-{}.xlsx", config.document_title(), code, group)
    }
}

/// Packs generated documents into a single zip
#[derive(Debug, Clone, Copy)]
pub struct ArchivePackager {
    compression: CompressionMethod,
}

impl Default for ArchivePackager {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }
}

impl ArchivePackager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write every document under its file name. Duplicate names are rejected.
    pub fn package(&self, documents: &[GeneratedDocument]) -> RollbookResult<Vec<u8>> {
        let mut seen = HashSet::new();
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(self.compression);

        for doc in documents {
            if !seen.insert(doc.file_name.as_str()) {
                return Err(RollbookError::Archive(format!(
                    "duplicate file name {}",
                    doc.file_name
                )));
            }
            zip.start_file(doc.file_name.as_str(), options)
                .map_err(|e| RollbookError::Archive(e.to_string()))?;
            zip.write_all(&doc.bytes)?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| RollbookError::Archive(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}
