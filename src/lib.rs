//! Rollbook - student roster workbook → per-subject score sheets
//!
//! This library reads a roster spreadsheet (one row per student, one column
//! per subject with `*` enrollment marks), groups students by subject, and
//! renders one styled score sheet per subject plus a zip of all of them.
//!
//! # Features
//!
//! - Header detection over the first rows, with a reported fallback
//! - Forgiving score coercion (blank, "-", "80 pts", negatives)
//! - Per-subject rosters in header order
//! - Styled .xlsx sheets and a single zip bundle
//!
//! # Example
//!
//! ```no_run
//! use rollbook::batch::generate_all;
//! use rollbook::config::GenerationConfig;
//! use rollbook::excel::RosterImporter;
//!
//! let parsed = RosterImporter::new("roster.xlsx").import()?;
//! println!("Subjects: {}", parsed.subjects.len());
//!
//! let config = GenerationConfig::default();
//! let report = generate_all(&parsed.subjects, &config, |p| println!("{}", p.step))?;
//! std::fs::write("all.zip", &report.archive)?;
//! # Ok::<(), rollbook::error::RollbookError>(())
//! ```

pub mod batch;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod types;

// Re-export commonly used types
pub use error::{RollbookError, RollbookResult};
pub use types::{CellValue, ParsedRoster, RawGrid, RosterEntry, StudentRecord, SubjectRoster};
