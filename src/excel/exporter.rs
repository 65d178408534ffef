//! Sheet builder - one subject roster → styled score record sheet (.xlsx)
//!
//! Layout (columns A..I):
//!
//! ```text
//! row 0   title (merged A:I)
//! row 1   semester / academic year (merged A:I)
//! row 2   institution (merged A:I)
//! row 3   ลำดับที่ | รหัสประจำตัว | ชื่อ - นามสกุล | คะแนนส่วนที่ (merged D:I)
//! row 4   (A..C merged down)            | 1 | 4 | 5 | 6 | 7 | 8
//! row 5+  one row per student
//! ```
//!
//! The layout is computed first as plain data ([`SheetLayout`]) and then
//! rendered with rust_xlsxwriter.

use crate::config::GenerationConfig;
use crate::error::{RollbookError, RollbookResult};
use crate::types::SubjectRoster;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

pub const COLUMN_COUNT: u16 = 9;
/// Title rows plus the two-row header band
pub const HEADER_ROWS: u32 = 5;
pub const COLUMN_WIDTHS: [f64; COLUMN_COUNT as usize] =
    [10.0, 15.0, 25.0, 12.0, 12.0, 12.0, 12.0, 12.0, 12.0];
/// Score part numbers as printed on the institution's form
pub const SCORE_PART_LABELS: [&str; 6] = ["1", "4", "5", "6", "7", "8"];
pub const SHEET_NAME: &str = "Sheet1";

const HEADER_FILL: u32 = 0x00E6_E6FA;
const TITLE_FONT_SIZE: f64 = 14.0;

/// Visual role of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Title,
    Header,
    /// Bordered, left aligned
    Data,
    /// Bordered, centered (sequence column)
    DataCentered,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCell {
    pub row: u32,
    pub col: u16,
    pub value: LayoutValue,
    pub style: CellStyle,
}

/// A merged block; its text sits in the top-left cell
#[derive(Debug, Clone, PartialEq)]
pub struct MergeRegion {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
    pub text: String,
    pub style: CellStyle,
}

/// Logical content of one score sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub merges: Vec<MergeRegion>,
    pub cells: Vec<LayoutCell>,
    pub column_widths: [f64; COLUMN_COUNT as usize],
    /// Total rows used (header rows + one per student)
    pub row_count: u32,
}

impl SheetLayout {
    pub fn data_row_count(&self) -> u32 {
        self.row_count - HEADER_ROWS
    }

    /// Text at a position, looking at merge anchors and plain cells
    pub fn text_at(&self, row: u32, col: u16) -> Option<&str> {
        self.merges
            .iter()
            .find(|m| m.first_row == row && m.first_col == col)
            .map(|m| m.text.as_str())
            .or_else(|| {
                self.cells
                    .iter()
                    .find(|c| c.row == row && c.col == col)
                    .and_then(|c| match &c.value {
                        LayoutValue::Text(s) => Some(s.as_str()),
                        LayoutValue::Number(_) => None,
                    })
            })
    }

    pub fn number_at(&self, row: u32, col: u16) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.row == row && c.col == col)
            .and_then(|c| match c.value {
                LayoutValue::Number(n) => Some(n),
                LayoutValue::Text(_) => None,
            })
    }
}

/// Builds score sheets for one generation run
pub struct SheetBuilder<'a> {
    config: &'a GenerationConfig,
}

impl<'a> SheetBuilder<'a> {
    pub fn new(config: &'a GenerationConfig) -> Self {
        Self { config }
    }

    /// Sheet title: document label + term label + subject display name
    pub fn title(&self, subject_code: &str) -> String {
        format!(
            "{} วิชา {}",
            self.config.document_title(),
            self.config.display_name(subject_code)
        )
    }

    pub fn term_line(&self) -> String {
        format!(
            "ภาคเรียนที่ {} ปีการศึกษา {}",
            self.config.semester, self.config.academic_year
        )
    }

    /// Compute the logical layout for a roster
    pub fn layout(&self, roster: &SubjectRoster) -> SheetLayout {
        let last_col = COLUMN_COUNT - 1;
        let full_width = |row: u32, text: String| MergeRegion {
            first_row: row,
            first_col: 0,
            last_row: row,
            last_col,
            text,
            style: CellStyle::Title,
        };
        let header_down = |col: u16, text: &str| MergeRegion {
            first_row: 3,
            first_col: col,
            last_row: 4,
            last_col: col,
            text: text.to_string(),
            style: CellStyle::Header,
        };

        let merges = vec![
            full_width(0, self.title(&roster.subject_code)),
            full_width(1, self.term_line()),
            full_width(2, self.config.institution.clone()),
            header_down(0, "ลำดับที่"),
            header_down(1, "รหัสประจำตัว"),
            header_down(2, "ชื่อ - นามสกุล"),
            MergeRegion {
                first_row: 3,
                first_col: 3,
                last_row: 3,
                last_col,
                text: "คะแนนส่วนที่".to_string(),
                style: CellStyle::Header,
            },
        ];

        let mut cells: Vec<LayoutCell> = SCORE_PART_LABELS
            .iter()
            .enumerate()
            .map(|(idx, label)| LayoutCell {
                row: 4,
                col: 3 + idx as u16,
                value: LayoutValue::Text(label.to_string()),
                style: CellStyle::Header,
            })
            .collect();

        for (idx, student) in roster.students.iter().enumerate() {
            let row = HEADER_ROWS + idx as u32;
            cells.push(LayoutCell {
                row,
                col: 0,
                value: LayoutValue::Number((idx + 1) as f64),
                style: CellStyle::DataCentered,
            });
            cells.push(LayoutCell {
                row,
                col: 1,
                value: LayoutValue::Text(student.student_id.clone()),
                style: CellStyle::Data,
            });
            cells.push(LayoutCell {
                row,
                col: 2,
                value: LayoutValue::Text(student.full_name.clone()),
                style: CellStyle::Data,
            });
            for (offset, &score) in student.scores.iter().enumerate() {
                cells.push(LayoutCell {
                    row,
                    col: 3 + offset as u16,
                    value: LayoutValue::Number(score),
                    style: CellStyle::Data,
                });
            }
        }

        SheetLayout {
            merges,
            cells,
            column_widths: COLUMN_WIDTHS,
            row_count: HEADER_ROWS + roster.students.len() as u32,
        }
    }

    /// Render a roster to .xlsx bytes. Each call builds an independent workbook.
    pub fn build(&self, roster: &SubjectRoster) -> RollbookResult<Vec<u8>> {
        let layout = self.layout(roster);
        render(&layout).map_err(|e| RollbookError::Generation {
            subject: roster.subject_code.clone(),
            message: e.to_string(),
        })
    }
}

/// Cell formats shared by every sheet
struct SheetFormats {
    title: Format,
    header: Format,
    data: Format,
    data_centered: Format,
}

impl SheetFormats {
    fn new() -> Self {
        let title = Format::new()
            .set_bold()
            .set_font_size(TITLE_FONT_SIZE)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);
        let header = title.clone().set_background_color(Color::RGB(HEADER_FILL));
        let data = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter);
        let data_centered = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        Self {
            title,
            header,
            data,
            data_centered,
        }
    }

    fn get(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::Title => &self.title,
            CellStyle::Header => &self.header,
            CellStyle::Data => &self.data,
            CellStyle::DataCentered => &self.data_centered,
        }
    }
}

/// Write a layout into a fresh single-sheet workbook
pub fn render(layout: &SheetLayout) -> Result<Vec<u8>, XlsxError> {
    let formats = SheetFormats::new();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, &width) in layout.column_widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, width)?;
    }

    for merge in &layout.merges {
        worksheet.merge_range(
            merge.first_row,
            merge.first_col,
            merge.last_row,
            merge.last_col,
            &merge.text,
            formats.get(merge.style),
        )?;
    }

    for cell in &layout.cells {
        write_cell(worksheet, cell, formats.get(cell.style))?;
    }

    workbook.save_to_buffer()
}

fn write_cell(
    worksheet: &mut Worksheet,
    cell: &LayoutCell,
    format: &Format,
) -> Result<(), XlsxError> {
    match &cell.value {
        LayoutValue::Text(text) => {
            worksheet.write_string_with_format(cell.row, cell.col, text, format)?;
        }
        LayoutValue::Number(n) => {
            worksheet.write_number_with_format(cell.row, cell.col, *n, format)?;
        }
    }
    Ok(())
}
