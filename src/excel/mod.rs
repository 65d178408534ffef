//! Spreadsheet I/O for rosters and score sheets
//!
//! - Import: roster workbook (.xlsx / .xls) → grid → parsed roster
//! - Export: subject roster → styled score sheet (.xlsx)
//! - Archive: generated sheets → one zip

mod archive;
mod exporter;
mod importer;

pub use archive::{document_file_name, ArchivePackager, GeneratedDocument, ARCHIVE_FILE_NAME};
pub use exporter::{
    render, CellStyle, LayoutCell, LayoutValue, MergeRegion, SheetBuilder, SheetLayout,
    COLUMN_COUNT, HEADER_ROWS, SCORE_PART_LABELS,
};
pub use importer::{
    check_extension, grid_from_bytes, grid_from_range, read_grid, run_with_timeout, validate_file,
    FileValidation, RosterImporter, DEFAULT_READ_TIMEOUT, SUPPORTED_EXTENSIONS,
};
