// brdiff CLI - normalize and compare monthly billing reports

mod exit_codes;

use brdiff_cli::report::{self, Envelope};

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use brdiff_config::{ConfigError, Settings};
use brdiff_core::ReportDocument;
use brdiff_engine::{align_cst, EngineError, Normalizer, ReportParser};
use brdiff_io::{ExportFormat, IoError, LoadedReport, ReadOptions};

use exit_codes::{
    EXIT_CONFIG, EXIT_DIFFS, EXIT_INPUT, EXIT_OUTPUT, EXIT_SUCCESS, EXIT_UNRECOGNIZED, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "brdiff")]
#[command(about = "Normalize and compare monthly billing reports")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file [default: <config dir>/brdiff/settings.toml]
    #[arg(long, global = true, env = "BRDIFF_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log progress to stderr (-v info, -vv debug); overrides RUST_LOG
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Worksheet to read from Excel inputs (default: first sheet)
    #[arg(long, global = true)]
    sheet: Option<String>,

    /// Rows above the data in each input (title, period, column headings)
    #[arg(long, global = true, value_name = "N")]
    header_rows: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two billing reports field by field
    #[command(after_help = "\
Examples:
  brdiff compare february.xlsx march.xlsx
  brdiff compare february.xlsx march.xlsx --name 'Q1 close' --json -o diff.json
  brdiff compare february.json march.xlsx --changes-only --json
  brdiff compare old.csv new.csv --include-cst

Exit status is 0 when the reports match, 1 when they differ.")]
    Compare {
        /// First (reference) report: .xlsx/.xls/.xlsm/.ods, .csv/.tsv, or saved .json
        file1: PathBuf,

        /// Second report
        file2: PathBuf,

        /// Treat CST as a required sub-type
        #[arg(long)]
        include_cst: bool,

        /// Comparison name recorded in the output
        #[arg(long)]
        name: Option<String>,

        /// Emit the full comparison tree as JSON
        #[arg(long)]
        json: bool,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Omit fields and sections that match exactly
        #[arg(long)]
        changes_only: bool,
    },

    /// Parse a report and print its normalized tree as JSON
    #[command(after_help = "\
Examples:
  brdiff parse march.xlsx
  brdiff parse march.xlsx --sheet Report -o march.json
  brdiff parse export.csv --header-rows 4")]
    Parse {
        /// Report to parse
        file: PathBuf,

        /// Treat CST as a required sub-type
        #[arg(long)]
        include_cst: bool,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Rewrite a report in the canonical layout
    #[command(after_help = "\
Examples:
  brdiff normalize march.xlsx -o march-normalized.xlsx
  brdiff normalize march.csv -o march-normalized.csv --include-cst")]
    Normalize {
        /// Report to normalize
        file: PathBuf,

        /// Output file (.xlsx or .csv)
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Treat CST as a required sub-type
        #[arg(long)]
        include_cst: bool,
    },

    /// Inspect or create the settings file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the settings file location
    Path,
    /// Print the effective settings as TOML
    Show,
    /// Write a commented settings file with the defaults
    Init,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let globals = Globals {
        config: cli.config,
        sheet: cli.sheet,
        header_rows: cli.header_rows,
    };

    let result = match cli.command {
        Commands::Compare {
            file1,
            file2,
            include_cst,
            name,
            json,
            output,
            changes_only,
        } => cmd_compare(&globals, &file1, &file2, include_cst, name, json, output, changes_only),
        Commands::Parse { file, include_cst, output } => {
            cmd_parse(&globals, &file, include_cst, output)
        }
        Commands::Normalize { file, output, include_cst } => {
            cmd_normalize(&globals, &file, &output, include_cst)
        }
        Commands::Config(command) => match command {
            ConfigCommands::Path => cmd_config_path(&globals),
            ConfigCommands::Show => cmd_config_show(&globals),
            ConfigCommands::Init => cmd_config_init(&globals),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Library crates log through `log`; the fmt subscriber picks those records up.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_OUTPUT, message: msg.into(), hint: None }
    }

    /// Exit 1 with nothing on stderr: the report already said it.
    pub fn differences() -> Self {
        Self { code: EXIT_DIFFS, message: String::new(), hint: None }
    }

    pub fn engine(path: &Path, err: EngineError) -> Self {
        Self {
            code: EXIT_UNRECOGNIZED,
            message: format!("{}: {}", path.display(), err),
            hint: Some("check --header-rows and --sheet, or add label spellings under [aliases] in the settings file".to_string()),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let code = if err.is_write() { EXIT_OUTPUT } else { EXIT_INPUT };
        let hint = match &err {
            IoError::UnsupportedFormat { .. } => {
                Some("inputs must be .xlsx, .xls, .xlsm, .ods, .csv, .tsv or a saved .json report".to_string())
            }
            IoError::SheetNotFound { .. } => Some("pick a sheet with --sheet".to_string()),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self {
            code: EXIT_CONFIG,
            message: err.to_string(),
            hint: Some("run `brdiff config path` to locate the settings file".to_string()),
        }
    }
}

// ============================================================================
// Shared: settings and report loading
// ============================================================================

/// Flags that apply to every command.
struct Globals {
    config: Option<PathBuf>,
    sheet: Option<String>,
    header_rows: Option<usize>,
}

impl Globals {
    /// Settings file, with command-line flags applied on top.
    fn settings(&self) -> Result<Settings, CliError> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(sheet) = &self.sheet {
            settings.sheet = Some(sheet.clone());
        }
        if let Some(rows) = self.header_rows {
            settings.header_rows = rows;
        }
        Ok(settings)
    }

    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Settings::config_path)
    }
}

struct LoadedDocument {
    doc: ReportDocument,
    /// Rows above the data, kept for the normalized export.
    header: Vec<Vec<String>>,
}

fn load_report(path: &Path, settings: &Settings, include_cst: bool) -> Result<LoadedDocument, CliError> {
    let options = ReadOptions {
        sheet: settings.sheet.clone(),
        header_rows: settings.header_rows,
    };
    let schema = settings.schema()?;
    let include_cst = include_cst || settings.include_cst;

    match brdiff_io::load(path, &options)? {
        LoadedReport::Document(doc) => {
            // Saved JSON may be hand-edited: rebuild the canonical tree.
            let include_cst = include_cst || doc.include_cst;
            let doc = Normalizer::new(include_cst, schema.service_level_prefix()).renormalize(&doc);
            Ok(LoadedDocument { doc, header: Vec::new() })
        }
        LoadedReport::Sheet(sheet) => {
            let parser = ReportParser::new(schema, include_cst);
            let mut doc = parser
                .parse(&sheet.rows)
                .map_err(|e| CliError::engine(path, e))?;
            doc.report_title = sheet.title;
            log::info!(
                "{}: {} cost center(s), CST {}",
                path.display(),
                doc.cost_centers.len(),
                if doc.include_cst { "on" } else { "off" }
            );
            Ok(LoadedDocument { doc, header: sheet.header })
        }
    }
}

fn write_output(output: Option<&Path>, contents: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, contents)
            .map_err(|e| CliError::output(format!("cannot write {}: {}", path.display(), e))),
        None => io::stdout()
            .write_all(contents.as_bytes())
            .map_err(|e| CliError::output(e.to_string())),
    }
}

// ============================================================================
// compare
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn cmd_compare(
    globals: &Globals,
    file1: &Path,
    file2: &Path,
    include_cst: bool,
    name: Option<String>,
    json: bool,
    output: Option<PathBuf>,
    changes_only: bool,
) -> Result<(), CliError> {
    let settings = globals.settings()?;
    let doc1 = load_report(file1, &settings, include_cst)?.doc;
    let doc2 = load_report(file2, &settings, include_cst)?.doc;
    let (doc1, doc2) = align_cst(doc1, doc2);

    let mut result = brdiff_recon::compare(&doc1, &doc2);
    if let Some(name) = name {
        result = result.with_name(name);
    }
    let differs = result.has_differences();
    if changes_only {
        result.retain_changes();
    }

    let rendered = if json {
        let mut json = Envelope::new(&result, chrono::Utc::now())
            .to_json()
            .map_err(|e| CliError::output(e.to_string()))?;
        json.push('\n');
        json
    } else {
        report::render_text(&result, &file1.display().to_string(), &file2.display().to_string())
    };
    write_output(output.as_deref(), &rendered)?;

    if differs {
        return Err(CliError::differences());
    }
    Ok(())
}

// ============================================================================
// parse
// ============================================================================

fn cmd_parse(
    globals: &Globals,
    file: &Path,
    include_cst: bool,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = globals.settings()?;
    let loaded = load_report(file, &settings, include_cst)?;

    // A saved file is the plain document so it loads back as an input.
    if let Some(path) = &output {
        brdiff_io::json::save_document(&loaded.doc, path)?;
        eprintln!("parsed report written to {}", path.display());
        return Ok(());
    }

    let mut json = Envelope::new(&loaded.doc, chrono::Utc::now())
        .to_json()
        .map_err(|e| CliError::output(e.to_string()))?;
    json.push('\n');
    write_output(None, &json)
}

// ============================================================================
// normalize
// ============================================================================

fn cmd_normalize(
    globals: &Globals,
    file: &Path,
    output: &Path,
    include_cst: bool,
) -> Result<(), CliError> {
    ExportFormat::from_path(output).map_err(|_| {
        CliError::args(format!("{}: unsupported output type", output.display()))
            .with_hint("use an .xlsx or .csv output file")
    })?;

    let settings = globals.settings()?;
    let loaded = load_report(file, &settings, include_cst)?;
    let rows = brdiff_io::export_normalized(&loaded.doc, &loaded.header, settings.header_rows, output)?;
    eprintln!("normalized report written to {} ({} rows)", output.display(), rows);
    Ok(())
}

// ============================================================================
// config
// ============================================================================

fn cmd_config_path(globals: &Globals) -> Result<(), CliError> {
    let path = globals.config_path();
    let note = if path.exists() { "" } else { " (not created; defaults in use)" };
    write_output(None, &format!("{}{}\n", path.display(), note))
}

fn cmd_config_show(globals: &Globals) -> Result<(), CliError> {
    let settings = globals.settings()?;
    write_output(None, &settings.to_toml()?)
}

fn cmd_config_init(globals: &Globals) -> Result<(), CliError> {
    let path = globals.config_path();
    Settings::write_default_file(&path).map_err(|e| {
        CliError::from(e).with_hint("edit the existing file, or pass --config with a new path")
    })?;
    eprintln!("settings written to {}", path.display());
    Ok(())
}
