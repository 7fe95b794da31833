use std::fmt;
use std::path::PathBuf;

use simrecon_core::CoreError;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (unknown quantity, bad threshold, etc.).
    ConfigValidation(String),
    /// Reference or simulation input does not exist. Fatal.
    MissingInputFile(PathBuf),
    /// The key column of a schema is absent from a CSV header.
    MissingColumn { file: String, column: String },
    /// CSV read/write error.
    Csv(String),
    /// IO error (file read, output write).
    Io(String),
    /// Key ranges do not intersect. `None` for an empty dataset.
    EmptyOverlap {
        reference: Option<(f64, f64)>,
        simulation: Option<(f64, f64)>,
    },
    /// A dataset could not be assembled.
    Dataset(CoreError),
}

fn fmt_range(range: &Option<(f64, f64)>) -> String {
    match range {
        Some((lo, hi)) => format!("[{lo}, {hi}]"),
        None => "(empty)".to_string(),
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingInputFile(path) => write!(f, "input file not found: {}", path.display()),
            Self::MissingColumn { file, column } => {
                write!(f, "{file}: missing column '{column}'")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::EmptyOverlap { reference, simulation } => write!(
                f,
                "reference range {} and simulation range {} do not overlap",
                fmt_range(reference),
                fmt_range(simulation)
            ),
            Self::Dataset(e) => write!(f, "dataset error: {e}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<CoreError> for ReconError {
    fn from(e: CoreError) -> Self {
        Self::Dataset(e)
    }
}
