use crate::batch::SubjectFailure;
use thiserror::Error;

pub type RollbookResult<T> = Result<T, RollbookError>;

/// Errors surfaced to the user. Messages are in Thai because they are shown
/// verbatim to school staff.
#[derive(Error, Debug)]
pub enum RollbookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ประเภทไฟล์ไม่ถูกต้อง กรุณาใช้ไฟล์ .xlsx หรือ .xls ({0})")]
    FileTypeInvalid(String),

    #[error("ไม่พบไฟล์: {0}")]
    FileNotFound(String),

    #[error("การประมวลผลไฟล์ใช้เวลานานเกินไป (หมดเวลา {seconds} วินาที)")]
    ReadTimeout { seconds: u64 },

    #[error("เกิดข้อผิดพลาดในการอ่านไฟล์ Excel: {0}")]
    WorkbookRead(String),

    #[error("ไฟล์ Excel ไม่มี worksheet")]
    NoWorksheet,

    #[error("ไฟล์ Excel ไม่มีข้อมูลหรือรูปแบบไม่ถูกต้อง (ต้องมีอย่างน้อย 3 แถว พบ {rows} แถว)")]
    EmptyOrMalformedSheet { rows: usize },

    #[error("รูปแบบไฟล์ไม่ถูกต้อง (ต้องมีอย่างน้อย 10 คอลัมน์ พบ {found} คอลัมน์)")]
    InsufficientColumns { found: usize },

    #[error("ไม่พบคอลัมน์รายวิชา (คอลัมน์ J เป็นต้นไป)")]
    NoSubjectColumnsFound,

    #[error("ไม่พบข้อมูลนักเรียนที่ถูกต้อง")]
    NoValidStudentsFound,

    #[error("ไม่พบรายวิชาที่มีนักเรียนลงทะเบียน")]
    NoEnrolledSubjectsFound,

    #[error("ไม่พบข้อมูลรายวิชา {0}")]
    SubjectNotFound(String),

    #[error("ไม่สามารถสร้างไฟล์สำหรับ {subject}: {message}")]
    Generation { subject: String, message: String },

    #[error("ไม่สามารถสร้างไฟล์ใดๆ ได้ ({} รายวิชาล้มเหลว)", .failures.len())]
    AllGenerationFailed { failures: Vec<SubjectFailure> },

    #[error("ไม่สามารถรวมไฟล์เป็น ZIP: {0}")]
    Archive(String),

    #[error("ค่าการตั้งค่าไม่ถูกต้อง: {0}")]
    InvalidConfig(String),
}

impl RollbookError {
    /// True for the structural roster errors that abort a parse.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            RollbookError::EmptyOrMalformedSheet { .. }
                | RollbookError::InsufficientColumns { .. }
                | RollbookError::NoSubjectColumnsFound
                | RollbookError::NoValidStudentsFound
                | RollbookError::NoEnrolledSubjectsFound
        )
    }
}
