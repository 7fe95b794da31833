//! Reference and simulation inputs shared by `validate` and `check`.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use simrecon_core::{Dataset, Schema};
use simrecon_extract::extract_document;
use simrecon_recon::loader::{load_dataset_csv, CsvLayout};
use simrecon_recon::ValidationInput;

use crate::config::RunConfig;
use crate::CliError;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaArg {
    #[value(name = "time_series")]
    TimeSeries,
    #[value(name = "spatial")]
    Spatial,
}

impl From<SchemaArg> for Schema {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::TimeSeries => Schema::TimeSeries,
            SchemaArg::Spatial => Schema::Spatial,
        }
    }
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Reference document, or a canonical CSV written by `simrecon extract`
    #[arg(long)]
    pub reference: PathBuf,

    /// Simulation output CSV
    #[arg(long)]
    pub simulation: PathBuf,

    /// TOML config with [extract] and [validation] sections
    #[arg(long, env = "SIMRECON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Dataset schema (overrides [validation].schema)
    #[arg(long, value_enum)]
    pub schema: Option<SchemaArg>,

    /// Spatial snapshot of a reference document, 1-based (default: most zones)
    #[arg(long)]
    pub snapshot: Option<usize>,

    /// Output JSON to stdout instead of human summary
    #[arg(long)]
    pub json: bool,
}

impl CompareArgs {
    pub fn run_config(&self) -> Result<RunConfig, CliError> {
        RunConfig::load(self.config.as_deref())?.with_schema(self.schema.map(Schema::from))
    }

    pub fn load(&self, config: &RunConfig) -> Result<ValidationInput, CliError> {
        let reference = load_reference(&self.reference, self.snapshot, config)?;
        let simulation = load_dataset_csv(&self.simulation, &CsvLayout::simulation(&config.validation))
            .map_err(CliError::recon)?;
        Ok(ValidationInput { reference, simulation })
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// A `.csv` reference is read as canonical CSV; anything else is a document
/// and is extracted on the fly.
pub fn load_reference(path: &Path, snapshot: Option<usize>, config: &RunConfig) -> Result<Dataset, CliError> {
    let schema = config.validation.schema;
    if !path.exists() {
        return Err(CliError::missing_input(path));
    }
    if is_csv(path) {
        if snapshot.is_some() {
            log::warn!("--snapshot ignored for CSV reference {}", path.display());
        }
        return load_dataset_csv(path, &CsvLayout::reference(&config.validation)).map_err(CliError::recon);
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::parse(format!("cannot read {}: {e}", path.display())))?;
    let document = extract_document(&text, &config.extract);

    let index = match (schema, snapshot) {
        (_, Some(0)) => return Err(CliError::usage("--snapshot is 1-based")),
        (Schema::TimeSeries, Some(_)) => {
            log::warn!("--snapshot only applies to spatial references");
            None
        }
        (Schema::Spatial, Some(n)) if n > document.snapshots.len() => {
            return Err(CliError::usage(format!(
                "snapshot {n} requested, {} has {}",
                path.display(),
                document.snapshots.len()
            ))
            .with_hint("run `simrecon extract` to list the snapshots"));
        }
        (_, n) => n.map(|n| n - 1),
    };

    let dataset = document
        .dataset(schema, index)
        .cloned()
        .unwrap_or_else(|| Dataset::empty(schema));
    log::info!("reference {}: {} {} records", path.display(), dataset.len(), schema);
    Ok(dataset)
}
