//! Roster importer - spreadsheet file (.xlsx / .xls) → raw grid → parsed roster

use crate::core::roster::parse_grid;
use crate::core::score::ScoreOptions;
use crate::error::{RollbookError, RollbookResult};
use crate::types::{CellValue, ParsedRoster, RawGrid};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde::Serialize;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Files above this size still load, with a warning
pub const LARGE_FILE_BYTES: u64 = 10 * 1024 * 1024;
pub const MAX_FILE_NAME_CHARS: usize = 200;
/// Read-and-parse budget
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
/// Extensions calamine can open
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsm", "ods"];

/// Pre-parse file check. Errors block the import, warnings do not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check that a file exists, has a spreadsheet extension and a sane size
pub fn validate_file(path: &Path) -> FileValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Err(e) = check_extension(path) {
        errors.push(e.to_string());
    }

    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {
            if meta.len() > LARGE_FILE_BYTES {
                warnings.push(
                    "ไฟล์มีขนาดใหญ่ (เกิน 10MB) อาจใช้เวลาในการประมวลผลนาน".to_string(),
                );
            }
        }
        _ => errors.push(RollbookError::FileNotFound(path.display().to_string()).to_string()),
    }

    let name_len = path
        .file_name()
        .map(|name| name.to_string_lossy().chars().count())
        .unwrap_or(0);
    if name_len > MAX_FILE_NAME_CHARS {
        warnings.push("ชื่อไฟล์ยาวเกินไป".to_string());
    }

    FileValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Reject files whose extension calamine cannot open
pub fn check_extension(path: &Path) -> RollbookResult<()> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(RollbookError::FileTypeInvalid(path.display().to_string()))
    }
}

/// Importer for one roster workbook. Only the first worksheet is read.
pub struct RosterImporter {
    path: PathBuf,
    timeout: Duration,
    options: ScoreOptions,
}

impl RosterImporter {
    /// Create a new importer with the default timeout and score options
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            timeout: DEFAULT_READ_TIMEOUT,
            options: ScoreOptions::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_score_options(mut self, options: ScoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Read the first worksheet into a grid (no timeout)
    pub fn read_grid(&self) -> RollbookResult<RawGrid> {
        read_grid(&self.path)
    }

    /// Check the file and read its first worksheet, giving up after the
    /// configured timeout
    pub fn import_grid(&self) -> RollbookResult<RawGrid> {
        self.check_file()?;
        let path = self.path.clone();
        info!("Reading roster {}", path.display());
        run_with_timeout(self.timeout, move || read_grid(&path))
    }

    /// Read and parse the roster, giving up after the configured timeout
    pub fn import(&self) -> RollbookResult<ParsedRoster> {
        self.check_file()?;
        let path = self.path.clone();
        let options = self.options;
        info!("Reading roster {}", path.display());
        run_with_timeout(self.timeout, move || {
            let grid = read_grid(&path)?;
            parse_grid(&grid, &options)
        })
    }

    fn check_file(&self) -> RollbookResult<()> {
        check_extension(&self.path)?;
        if !self.path.is_file() {
            return Err(RollbookError::FileNotFound(self.path.display().to_string()));
        }
        Ok(())
    }
}

/// Run `work` on a worker thread and wait at most `timeout` for it.
///
/// On timeout the worker is abandoned; its result is dropped when it finishes.
pub fn run_with_timeout<T, F>(timeout: Duration, work: F) -> RollbookResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> RollbookResult<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // Receiver may be gone after a timeout
        let _ = tx.send(work());
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(RollbookError::ReadTimeout {
            seconds: timeout.as_secs(),
        }),
        Err(RecvTimeoutError::Disconnected) => Err(RollbookError::WorkbookRead(
            "reader stopped unexpectedly".to_string(),
        )),
    }
}

/// Read the first worksheet of a workbook file
pub fn read_grid(path: &Path) -> RollbookResult<RawGrid> {
    let bytes = std::fs::read(path)?;
    grid_from_bytes(bytes)
}

/// Read the first worksheet of an in-memory workbook (format auto-detected)
pub fn grid_from_bytes(bytes: Vec<u8>) -> RollbookResult<RawGrid> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| RollbookError::WorkbookRead(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    debug!("Available sheets: {:?}", sheet_names);

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(RollbookError::NoWorksheet)?
        .map_err(|e| RollbookError::WorkbookRead(e.to_string()))?;

    let grid = grid_from_range(&range);
    debug!("Parsed {} grid rows", grid.len());
    Ok(grid)
}

/// Convert a calamine range into an A1-anchored grid.
///
/// Leading empty rows/columns outside the used range are materialized and
/// trailing empty cells are trimmed from each row.
pub fn grid_from_range(range: &Range<Data>) -> RawGrid {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut grid: RawGrid = vec![Vec::new(); start_row as usize];
    for cells in range.rows() {
        let mut row: Vec<CellValue> = vec![CellValue::Empty; start_col as usize];
        row.extend(cells.iter().map(convert_cell));
        while matches!(row.last(), Some(CellValue::Empty)) {
            row.pop();
        }
        grid.push(row);
    }
    grid
}

/// Map a calamine cell onto the three-way cell model
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from(s.as_str()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}
