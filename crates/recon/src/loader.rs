//! CSV loading of simulation output and canonical reference tables, and
//! canonical CSV writing.

use std::collections::BTreeMap;
use std::path::Path;

use simrecon_core::{Dataset, DatasetBuilder, Schema};

use crate::config::ValidationConfig;
use crate::error::ReconError;
use crate::tolerances;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Header names accepted for a field besides its canonical name.
pub fn header_aliases(field: &str) -> &'static [&'static str] {
    match field {
        "time" => &["time_microsec"],
        "total_energy" => &["QP_1e12_erg"],
        "relative_power" => &["power_relative"],
        "alpha" => &["alpha_1_microsec"],
        "time_step" => &["delt_microsec"],
        "stability_w" => &["W_dimensionless"],
        "density" => &["density_g_cm3"],
        "radius" => &["radius_cm"],
        "velocity" => &["velocity_cm_microsec"],
        "pressure" => &["pressure_megabars"],
        "internal_energy" => &["internal_energy_1e12_erg_g"],
        "temperature" => &["temperature_keV"],
        _ => &[],
    }
}

/// How a CSV file maps onto a schema.
#[derive(Debug, Clone)]
pub struct CsvLayout {
    pub schema: Schema,
    /// Field → header, tried before the canonical name and aliases.
    pub columns: BTreeMap<String, String>,
    /// Field → multiplier applied to every loaded value.
    pub scale: BTreeMap<String, f64>,
    pub significant_digits: u32,
}

impl CsvLayout {
    /// Canonical names and aliases only, no scaling.
    pub fn canonical(schema: Schema) -> Self {
        Self {
            schema,
            columns: BTreeMap::new(),
            scale: BTreeMap::new(),
            significant_digits: tolerances::DEDUP_SIGNIFICANT_DIGITS,
        }
    }

    /// Layout for simulation output: configured headers and unit scales.
    pub fn simulation(config: &ValidationConfig) -> Self {
        Self {
            schema: config.schema,
            columns: config.columns.clone(),
            scale: config.scale.clone(),
            significant_digits: config.significant_digits,
        }
    }

    /// Layout for a canonical reference CSV: configured headers, no scaling.
    pub fn reference(config: &ValidationConfig) -> Self {
        Self { scale: BTreeMap::new(), ..Self::simulation(config) }
    }

    fn column_index(&self, field: &str, headers: &[String]) -> Option<usize> {
        let position = |name: &str| headers.iter().position(|h| h == name);
        self.columns
            .get(field)
            .and_then(|name| position(name.as_str()))
            .or_else(|| position(field))
            .or_else(|| header_aliases(field).iter().find_map(|alias| position(*alias)))
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

fn parse_cell(cell: Option<&str>) -> f64 {
    match cell.map(str::trim).map(str::parse::<f64>) {
        Some(Ok(v)) if v.is_finite() => v,
        _ => f64::NAN,
    }
}

/// Parse CSV text into a dataset. `source` names the input in errors.
///
/// `#` lines are comments. Cells that are empty or not numbers become NaN.
/// A schema column missing from the header is all NaN, except the key
/// column, which is required.
pub fn parse_dataset_csv(source: &str, csv_data: &str, layout: &CsvLayout) -> Result<Dataset, ReconError> {
    let schema = layout.schema;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Csv(format!("{source}: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let indices: Vec<Option<usize>> = schema
        .fields()
        .iter()
        .map(|field| layout.column_index(field, &headers))
        .collect();

    if indices[schema.key_index()].is_none() {
        return Err(ReconError::MissingColumn {
            file: source.to_string(),
            column: schema.key_field().to_string(),
        });
    }
    for (field, index) in schema.fields().iter().zip(&indices) {
        if index.is_none() {
            log::warn!("{source}: no column for '{field}', treating it as absent");
        }
    }

    let scales: Vec<f64> = schema
        .fields()
        .iter()
        .map(|field| layout.scale.get(*field).copied().unwrap_or(1.0))
        .collect();

    let mut builder = DatasetBuilder::new(schema).significant_digits(layout.significant_digits);
    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Csv(format!("{source}: {e}")))?;
        let values = indices
            .iter()
            .zip(&scales)
            .map(|(index, scale)| parse_cell(index.and_then(|i| record.get(i))) * scale)
            .collect();
        builder.push_values(values)?;
    }

    if builder.dropped() > 0 {
        log::warn!("{source}: dropped {} rows without a numeric {}", builder.dropped(), schema.key_field());
    }
    let dataset = builder.build();
    log::info!("{source}: loaded {} {} records", dataset.len(), schema);
    Ok(dataset)
}

/// Read and parse a CSV file. A missing file is `MissingInputFile`.
pub fn load_dataset_csv(path: &Path, layout: &CsvLayout) -> Result<Dataset, ReconError> {
    if !path.exists() {
        return Err(ReconError::MissingInputFile(path.to_path_buf()));
    }
    let data = std::fs::read_to_string(path)
        .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
    parse_dataset_csv(&path.display().to_string(), &data, layout)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Render a dataset as canonical CSV: a title and a source comment line,
/// the canonical header, then one row per record.
pub fn dataset_to_csv(dataset: &Dataset, title: &str, source: &str) -> Result<String, ReconError> {
    let schema = dataset.schema();
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(schema.fields())
        .map_err(|e| ReconError::Csv(e.to_string()))?;

    for record in dataset.records() {
        let row: Vec<String> = schema
            .fields()
            .iter()
            .zip(record.values())
            .map(|(field, v)| {
                if *field == "zone_index" && v.is_finite() {
                    format!("{}", v.round() as i64)
                } else if v.is_nan() {
                    "NaN".to_string()
                } else {
                    format!("{v:.6e}")
                }
            })
            .collect();
        writer.write_record(&row).map_err(|e| ReconError::Csv(e.to_string()))?;
    }

    let body = writer.into_inner().map_err(|e| ReconError::Csv(e.to_string()))?;
    let body = String::from_utf8(body).map_err(|e| ReconError::Csv(e.to_string()))?;
    Ok(format!("# {title}\n# source: {source}\n{body}"))
}

pub fn write_dataset_csv(path: &Path, dataset: &Dataset, title: &str, source: &str) -> Result<(), ReconError> {
    let text = dataset_to_csv(dataset, title, source)?;
    std::fs::write(path, text).map_err(|e| ReconError::Io(format!("cannot write {}: {e}", path.display())))
}
