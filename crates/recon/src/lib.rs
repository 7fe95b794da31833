//! `simrecon-recon`: compares simulation output against reference data.
//!
//! Loads datasets from CSV, aligns them on a common grid or by nearest key,
//! computes per-quantity error metrics and judges them against named
//! tolerances. Exit codes and presentation belong to the caller.

pub mod align;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod regression;
pub mod tolerances;
pub mod verdict;

pub use align::{common_grid, nearest_match, nearest_pair, AlignedPair, NearestMatch};
pub use config::{Alignment, ValidationConfig};
pub use engine::run;
pub use error::ReconError;
pub use loader::{load_dataset_csv, parse_dataset_csv, write_dataset_csv, CsvLayout};
pub use metrics::{error_metric, ErrorMetric};
pub use model::{Outcome, ValidationInput, ValidationReport};
pub use regression::{CheckStatus, RegressionCheck, RegressionOutcome};
pub use verdict::{Grade, QuantityVerdict, ValidationVerdict};
