// simrecon CLI - reference table extraction and simulation validation

mod check;
mod config;
mod exit_codes;
mod extract;
mod input;
mod logger;
mod validate;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use simrecon_extract::ExtractError;
use simrecon_recon::ReconError;

use exit_codes::{
    extract_exit_code, recon_exit_code, EXIT_CANNOT_COMPARE, EXIT_FAILED, EXIT_IO_WRITE, EXIT_MISSING_INPUT,
    EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE,
};
use input::CompareArgs;

#[derive(Parser)]
#[command(name = "simrecon")]
#[command(about = "Recover reference tables from documents and validate simulation output against them")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Only log errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Log every skipped row and alignment decision
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract time-series and spatial tables from a reference document
    #[command(after_help = "\
Examples:
  simrecon extract --document geneve10.tex --out-dir reference/
  simrecon extract --document scan.txt --config ocr.toml --json")]
    Extract {
        /// Reference document (typeset markup or OCR text)
        #[arg(long)]
        document: PathBuf,

        /// TOML config with an [extract] section
        #[arg(long, env = "SIMRECON_CONFIG")]
        config: Option<PathBuf>,

        /// Write canonical CSVs and extract_meta.json here
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Output extraction metadata JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Compare simulation output with a reference and judge each quantity
    #[command(after_help = "\
Examples:
  simrecon validate --reference geneve10.tex --simulation run/time_series.csv
  simrecon validate --reference reference/spatial_snapshot_2.csv --simulation run/t200.csv --schema spatial
  simrecon validate --reference geneve10.tex --simulation run.csv --json --output report.json")]
    Validate {
        #[command(flatten)]
        compare: CompareArgs,

        /// Write the JSON report to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Quick regression check: nearest-match rows within per-quantity tolerances
    #[command(after_help = "\
Examples:
  simrecon check --reference geneve10.tex --simulation run.csv
  simrecon check --reference geneve10.tex --simulation run.csv --upper-bound 300 --tolerances 0.05,0.05,0.1,0.1")]
    Check {
        #[command(flatten)]
        compare: CompareArgs,

        /// Largest reference key compared (default: 72 for time series, none for spatial)
        #[arg(long)]
        upper_bound: Option<f64>,

        /// Four fractional tolerances, in regression quantity order
        #[arg(long, value_delimiter = ',')]
        tolerances: Option<Vec<f64>>,

        /// Maximum key distance for a simulation row to count as a match
        #[arg(long)]
        match_distance: Option<f64>,
    },
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
    logger::init(cli.quiet, cli.verbose);

    let result = match cli.command {
        Commands::Extract { document, config, out_dir, json } => {
            extract::cmd_extract(document, config, out_dir, json)
        }
        Commands::Validate { compare, output } => validate::cmd_validate(compare, output),
        Commands::Check { compare, upper_bound, tolerances, match_distance } => check::cmd_check(
            compare,
            check::CheckOverrides { upper_bound, tolerances, match_distance },
        ),
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

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn io_write(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO_WRITE, message: msg.into(), hint: None }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self { code: EXIT_FAILED, message: msg.into(), hint: None }
    }

    pub fn cannot_compare(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CANNOT_COMPARE, message: format!("cannot compare: {}", msg.into()), hint: None }
    }

    pub fn missing_input(path: &Path) -> Self {
        Self {
            code: EXIT_MISSING_INPUT,
            message: format!("input file not found: {}", path.display()),
            hint: None,
        }
    }

    /// Create error from a library error with its registry exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::MissingColumn { column, .. } => {
                Some(format!("map the header with [validation.columns] {column} = \"<header>\""))
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn extract(err: ExtractError) -> Self {
        Self { code: extract_exit_code(&err), message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
