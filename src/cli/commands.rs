use crate::batch::{format_file_size, generate_all, generate_one, Progress};
use crate::config::GenerationConfig;
use crate::core::roster::parse_grid;
use crate::core::score::{
    calculate_score_statistics, format_scores_for_display, validate_score_array, ScoreOptions,
};
use crate::error::{RollbookError, RollbookResult};
use crate::excel::{check_extension, validate_file, RosterImporter, ARCHIVE_FILE_NAME};
use crate::types::{ParsedRoster, RawGrid, SubjectRoster};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Names shown per subject in `inspect`
const PREVIEW_NAMES: usize = 3;

/// Settings shared by the generating commands (`split`, `subject`)
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub out_dir: PathBuf,
    /// YAML settings file; flags below override its fields
    pub config: Option<PathBuf>,
    pub semester: Option<u8>,
    pub academic_year: Option<u16>,
    pub term_label: Option<String>,
    pub group_number: Option<String>,
    pub timeout_secs: u64,
    pub verbose: bool,
}

impl GenerateOptions {
    /// Load the YAML file (if any), apply flag overrides, then validate
    pub fn resolve_config(&self) -> RollbookResult<GenerationConfig> {
        let mut config = match &self.config {
            Some(path) => GenerationConfig::from_yaml_file(path)?,
            None => GenerationConfig::default(),
        };

        if let Some(semester) = self.semester {
            config.semester = semester;
        }
        if let Some(year) = self.academic_year {
            config.academic_year = year;
        }
        if let Some(ref term) = self.term_label {
            config.term_label = term.clone();
        }
        if let Some(ref group) = self.group_number {
            config.group_number = group.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Execute the check command - file-level validation only, no parsing
pub fn check(file: PathBuf) -> RollbookResult<()> {
    println!("{}", "🔎 Rollbook - File Check".bold().green());
    println!("   File: {}\n", file.display());

    let report = validate_file(&file);

    for warning in &report.warnings {
        println!("   {}", format!("⚠️  {warning}").yellow());
    }
    for error in &report.errors {
        println!("   {}", format!("❌ {error}").red());
    }

    if report.is_valid {
        println!("{}", "✅ File can be imported".bold().green());
        return Ok(());
    }

    println!(
        "\n{}",
        format!("❌ Found {} problem(s)", report.errors.len())
            .bold()
            .red()
    );
    check_extension(&file)?;
    Err(RollbookError::FileNotFound(file.display().to_string()))
}

/// Execute the inspect command - parse and summarize without writing anything
pub fn inspect(file: PathBuf, json: bool, timeout_secs: u64) -> RollbookResult<()> {
    let grid = RosterImporter::new(&file)
        .with_timeout(Duration::from_secs(timeout_secs))
        .import_grid()?;
    let options = ScoreOptions::default();
    let parsed = parse_grid(&grid, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }

    println!("{}", "📋 Rollbook - Roster Summary".bold().green());
    println!("   File: {}\n", file.display());
    print_roster_summary(&parsed);

    let diagnostics = score_diagnostics(&grid, &options)?;
    for line in &diagnostics {
        println!("   {}", format!("⚠️  {line}").yellow());
    }
    if diagnostics.is_empty() {
        println!("{}", "✅ All scores are within range".bold().green());
    }
    Ok(())
}

/// Out-of-range scores as typed in the sheet, before clamping.
///
/// The grid is re-parsed with unbounded options so values such as 150 or -5
/// survive, then each student's scores are checked against `range`.
fn score_diagnostics(grid: &RawGrid, range: &ScoreOptions) -> RollbookResult<Vec<String>> {
    let unbounded = ScoreOptions {
        min_value: f64::NEG_INFINITY,
        max_value: f64::INFINITY,
        allow_negative: true,
        ..*range
    };
    let raw = parse_grid(grid, &unbounded)?;

    let mut lines = Vec::new();
    for student in &raw.students {
        let validation = validate_score_array(&student.scores, range.min_value, range.max_value);
        for error in validation.errors {
            lines.push(format!(
                "{} {}: {}",
                student.student_id, student.full_name, error
            ));
        }
    }
    Ok(lines)
}

fn print_roster_summary(parsed: &ParsedRoster) {
    if parsed.header.is_fallback() {
        println!("   Header: {}", "not detected, using row 1".yellow());
    } else {
        println!("   Header: row {}", parsed.header.header_row() + 1);
    }
    println!(
        "   Found {} students, {} subject columns, {} subjects with enrollment",
        parsed.students.len(),
        parsed.subject_columns.len(),
        parsed.subjects.len()
    );

    for warning in &parsed.warnings {
        println!("   {}", format!("⚠️  {warning}").yellow());
    }
    println!();

    for roster in &parsed.subjects {
        print_subject_summary(roster);
    }
}

fn print_subject_summary(roster: &SubjectRoster) {
    println!(
        "   📚 {} ({} students)",
        roster.subject_code.bright_blue().bold(),
        roster.len()
    );

    let preview: Vec<&str> = roster
        .students
        .iter()
        .take(PREVIEW_NAMES)
        .map(|s| s.full_name.as_str())
        .collect();
    let more = roster.len().saturating_sub(PREVIEW_NAMES);
    if more > 0 {
        println!("      {} ... (+{more})", preview.join(", "));
    } else {
        println!("      {}", preview.join(", "));
    }

    let totals: Vec<f64> = roster
        .students
        .iter()
        .map(|s| s.scores.iter().sum())
        .collect();
    let stats = calculate_score_statistics(&totals);
    let shown = format_scores_for_display(&[stats.min, stats.average, stats.max], 2);
    println!(
        "      Total score min {} / avg {} / max {}",
        shown[0].cyan(),
        shown[1].cyan(),
        shown[2].cyan()
    );
}

/// Execute the split command - one sheet per subject, bundled into a zip
pub fn split(file: PathBuf, options: GenerateOptions) -> RollbookResult<()> {
    println!("{}", "📦 Rollbook - Split by Subject".bold().green());
    println!("   Input:  {}", file.display());
    println!("   Output: {}\n", options.out_dir.display());

    let config = options.resolve_config()?;
    let parsed = import_roster(&file, &config, &options)?;

    let report = generate_all(&parsed.subjects, &config, |progress: &Progress| {
        println!(
            "   [{:>3.0}%] {}",
            progress.percent,
            progress.step.as_str().cyan()
        );
    })?;

    fs::create_dir_all(&options.out_dir)?;
    let archive_path = options.out_dir.join(ARCHIVE_FILE_NAME);
    fs::write(&archive_path, &report.archive)?;

    println!();
    if !report.failures.is_empty() {
        println!(
            "{}",
            format!("⚠️  {} subject(s) failed:", report.failures.len())
                .bold()
                .yellow()
        );
        for failure in &report.failures {
            println!(
                "   {} {}: {}",
                failure.timestamp.format("%H:%M:%S"),
                failure.subject_code.bright_blue(),
                failure.message.red()
            );
        }
        println!();
    }

    if options.verbose {
        for doc in &report.documents {
            println!(
                "   📄 {} ({})",
                doc.file_name,
                format_file_size(doc.size())
            );
        }
        println!();
    }

    let elapsed = report.completed - report.started;
    println!("{}", "✅ Split Complete!".bold().green());
    println!(
        "   {} of {} subjects generated ({}) in {} ms",
        report.documents.len(),
        parsed.subjects.len(),
        format_file_size(report.total_bytes()),
        elapsed.num_milliseconds()
    );
    println!("   Archive: {}\n", archive_path.display());

    Ok(())
}

/// Execute the subject command - a single subject's sheet
pub fn subject(
    file: PathBuf,
    subject_code: String,
    options: GenerateOptions,
) -> RollbookResult<()> {
    println!("{}", "📄 Rollbook - Single Subject".bold().green());
    println!("   Input:   {}", file.display());
    println!("   Subject: {}\n", subject_code.bright_blue().bold());

    let config = options.resolve_config()?;
    let parsed = import_roster(&file, &config, &options)?;

    let doc = generate_one(&parsed.subjects, &subject_code, &config)?;

    fs::create_dir_all(&options.out_dir)?;
    let path = options.out_dir.join(&doc.file_name);
    fs::write(&path, &doc.bytes)?;

    println!("{}", "✅ Sheet Generated!".bold().green());
    println!("   File: {} ({})\n", path.display(), format_file_size(doc.size()));

    Ok(())
}

fn import_roster(
    file: &Path,
    config: &GenerationConfig,
    options: &GenerateOptions,
) -> RollbookResult<ParsedRoster> {
    if options.verbose {
        println!("{}", "📖 Reading roster...".cyan());
    }

    let parsed = RosterImporter::new(file)
        .with_timeout(Duration::from_secs(options.timeout_secs))
        .with_score_options(config.scores)
        .import()?;

    for warning in &parsed.warnings {
        println!("   {}", format!("⚠️  {warning}").yellow());
    }
    if options.verbose {
        println!(
            "   Found {} students in {} subjects\n",
            parsed.students.len(),
            parsed.subjects.len()
        );
    }

    Ok(parsed)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
