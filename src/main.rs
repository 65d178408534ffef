use clap::{Args, Parser, Subcommand};
use rollbook::cli::{self, GenerateOptions};
use rollbook::excel::DEFAULT_READ_TIMEOUT;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rollbook")]
#[command(about = "Split a student roster workbook into one score sheet per subject.")]
#[command(long_about = "Rollbook - roster workbook → per-subject score sheets

Reads the first worksheet of a roster (.xlsx / .xls), finds the header row
(ที่ / รหัสนักศึกษา / ชื่อ - นามสกุล), and builds one styled score sheet for
every subject column (J onward) that has at least one '*' enrollment mark.

COMMANDS:
  check    - Check that a file can be imported
  inspect  - Parse a roster and summarize subjects and scores
  split    - Generate every subject sheet, bundled into one zip
  subject  - Generate the sheet for a single subject

EXAMPLES:
  rollbook check roster.xlsx
  rollbook inspect roster.xlsx --json
  rollbook split roster.xlsx -o out --semester 1 --year 2568 --group 3
  rollbook subject roster.xlsx MATH101 -o out --config settings.yaml

LOGGING:
  -v/--verbose enables info-level logs; otherwise RUST_LOG is honoured
  (default: rollbook=warn).")]
#[command(version)]
struct Cli {
    /// Enable info-level logging and verbose command output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a roster file exists and has a supported extension
    Check {
        /// Path to roster workbook
        file: PathBuf,
    },

    #[command(long_about = "Parse a roster and print what was found.

Shows the header row (or that the first row was used as a fallback),
parser warnings, every subject with its student count, the first three
names and total-score statistics. Scores typed outside 0-100 are listed
as they appear in the sheet, before clamping.

Use --json to print the full parse result instead.")]
    /// Parse a roster and summarize it
    Inspect {
        /// Path to roster workbook
        file: PathBuf,

        /// Print the parsed roster as JSON
        #[arg(long)]
        json: bool,

        /// Read timeout in seconds
        #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT.as_secs())]
        timeout: u64,
    },

    #[command(long_about = "Generate a score sheet for every enrolled subject.

A subject that fails to generate is reported and skipped; the rest are
still written. The successful sheets are bundled into one zip:

  <out_dir>/แบบบันทึกคะแนนทุกวิชา.zip

SETTINGS:
  --config reads a YAML file (semester, academic_year, term_label,
  group_number, institution, display_names, scores). The other flags
  override individual fields from that file.")]
    /// Generate every subject sheet as one zip
    Split {
        /// Path to roster workbook
        file: PathBuf,

        #[command(flatten)]
        generate: GenerateArgs,
    },

    /// Generate the sheet for a single subject
    Subject {
        /// Path to roster workbook
        file: PathBuf,

        /// Subject code as it appears in the header (whitespace ignored)
        code: String,

        #[command(flatten)]
        generate: GenerateArgs,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// YAML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Semester (1-3)
    #[arg(long)]
    semester: Option<u8>,

    /// Academic year, Buddhist calendar (e.g. 2567)
    #[arg(long)]
    year: Option<u16>,

    /// Term label, e.g. กลางภาค or ปลายภาค
    #[arg(long)]
    term: Option<String>,

    /// Study group number used in file names
    #[arg(long)]
    group: Option<String>,

    /// Read timeout in seconds
    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT.as_secs())]
    timeout: u64,
}

impl GenerateArgs {
    fn into_options(self, verbose: bool) -> GenerateOptions {
        GenerateOptions {
            out_dir: self.output,
            config: self.config,
            semester: self.semester,
            academic_year: self.year,
            term_label: self.term,
            group_number: self.group,
            timeout_secs: self.timeout,
            verbose,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rollbook=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "rollbook=warn".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { file } => cli::check(file)?,

        Commands::Inspect {
            file,
            json,
            timeout,
        } => cli::inspect(file, json, timeout)?,

        Commands::Split { file, generate } => {
            cli::split(file, generate.into_options(cli.verbose))?
        }

        Commands::Subject {
            file,
            code,
            generate,
        } => cli::subject(file, code, generate.into_options(cli.verbose))?,
    }

    Ok(())
}
