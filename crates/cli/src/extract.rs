//! `simrecon extract`: recover reference tables from a document.

use std::path::{Path, PathBuf};

use serde::Serialize;
use simrecon_core::Dataset;
use simrecon_extract::{extract_document, ExtractReport, ExtractedDocument};
use simrecon_recon::loader::write_dataset_csv;

use crate::config::RunConfig;
use crate::CliError;

#[derive(Serialize)]
struct SnapshotMeta {
    label: String,
    records: usize,
    file: Option<String>,
}

#[derive(Serialize)]
struct ExtractMeta<'a> {
    source: String,
    engine_version: &'static str,
    run_at: String,
    time_series_records: usize,
    time_series_file: Option<String>,
    snapshots: Vec<SnapshotMeta>,
    report: &'a ExtractReport,
}

pub fn cmd_extract(
    document: PathBuf,
    config: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let config = RunConfig::load(config.as_deref())?;
    if !document.exists() {
        return Err(CliError::missing_input(&document));
    }
    let text = std::fs::read_to_string(&document)
        .map_err(|e| CliError::parse(format!("cannot read {}: {e}", document.display())))?;

    let extracted = extract_document(&text, &config.extract);
    let source = document.display().to_string();

    let written = match out_dir {
        Some(ref dir) => write_outputs(dir, &extracted, &source)?,
        None => Written::default(),
    };

    let meta = ExtractMeta {
        source,
        engine_version: env!("CARGO_PKG_VERSION"),
        run_at: chrono::Utc::now().to_rfc3339(),
        time_series_records: extracted.time_series.len(),
        time_series_file: written.time_series,
        snapshots: extracted
            .snapshots
            .iter()
            .enumerate()
            .map(|(i, s)| SnapshotMeta {
                label: s.label.clone(),
                records: s.dataset.len(),
                file: written.snapshots.get(i).cloned(),
            })
            .collect(),
        report: &extracted.report,
    };
    let json_str = serde_json::to_string_pretty(&meta)
        .map_err(|e| CliError::io_write(format!("JSON serialization error: {e}")))?;

    if let Some(ref dir) = out_dir {
        let path = dir.join("extract_meta.json");
        std::fs::write(&path, &json_str)
            .map_err(|e| CliError::io_write(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", dir.display());
    }

    if json {
        println!("{json_str}");
    }

    let r = &extracted.report;
    eprintln!(
        "{} blocks: {} time-series records, {} snapshots, {} skipped lines, {} duplicates",
        r.blocks.len(),
        extracted.time_series.len(),
        extracted.snapshots.len(),
        r.skipped_lines,
        r.duplicates,
    );
    for s in &extracted.snapshots {
        eprintln!("  {}: {} zones", s.label, s.dataset.len());
    }
    for kind in &r.missing_kinds {
        eprintln!("  no {kind} table found");
    }

    Ok(())
}

#[derive(Default)]
struct Written {
    time_series: Option<String>,
    snapshots: Vec<String>,
}

fn write_outputs(dir: &Path, extracted: &ExtractedDocument, source: &str) -> Result<Written, CliError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| CliError::io_write(format!("cannot create {}: {e}", dir.display())))?;
    let write = |name: &str, dataset: &Dataset, title: &str| -> Result<String, CliError> {
        write_dataset_csv(&dir.join(name), dataset, title, source)
            .map_err(|e| CliError::io_write(e.to_string()))?;
        Ok(name.to_string())
    };

    let mut written = Written::default();
    if !extracted.time_series.is_empty() {
        written.time_series = Some(write("time_series.csv", &extracted.time_series, "time series")?);
    }
    for (i, snapshot) in extracted.snapshots.iter().enumerate() {
        let name = format!("spatial_snapshot_{}.csv", i + 1);
        let title = format!("spatial snapshot {} ({})", i + 1, snapshot.label);
        written.snapshots.push(write(&name, &snapshot.dataset, &title)?);
    }
    Ok(written)
}
