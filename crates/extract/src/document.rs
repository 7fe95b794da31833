//! Document pipeline: locate blocks, tokenize their lines, fold rows into
//! canonical datasets.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Serialize;
use simrecon_core::{Dataset, DatasetBuilder, Schema, TableKind};

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::locator::TableBlock;
use crate::tokenizer::tokenize_line;

/// One spatial profile, taken from a single block.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub label: String,
    pub block: TableBlock,
    pub dataset: Dataset,
}

/// Diagnostics of one extraction run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractReport {
    pub blocks: Vec<TableBlock>,
    /// Rows kept per kind after tokenization, before dedup.
    pub rows_by_kind: BTreeMap<TableKind, usize>,
    /// Block body lines that did not yield a row.
    pub skipped_lines: usize,
    pub duplicates: usize,
    pub missing_kinds: Vec<TableKind>,
}

#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// All time-series blocks merged.
    pub time_series: Dataset,
    /// One per spatial block, in document order.
    pub snapshots: Vec<Snapshot>,
    pub report: ExtractReport,
}

impl ExtractedDocument {
    /// The snapshot with the most zones; the earliest one on ties.
    pub fn largest_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots
            .iter()
            .enumerate()
            .max_by_key(|(i, s)| (s.dataset.len(), Reverse(*i)))
            .map(|(_, s)| s)
    }

    /// Dataset for a schema: the merged time series, or a spatial snapshot
    /// (`index` into `snapshots`, defaulting to the largest).
    pub fn dataset(&self, schema: Schema, index: Option<usize>) -> Option<&Dataset> {
        match schema {
            Schema::TimeSeries => Some(&self.time_series),
            Schema::Spatial => match index {
                Some(i) => self.snapshots.get(i).map(|s| &s.dataset),
                None => self.largest_snapshot().map(|s| &s.dataset),
            },
        }
    }
}

/// Extract every recognized table from `text`.
///
/// Never fails: malformed rows are skipped and a missing table kind yields
/// an empty dataset plus an entry in `report.missing_kinds`.
pub fn extract_document(text: &str, config: &ExtractConfig) -> ExtractedDocument {
    let lines: Vec<&str> = text.lines().collect();
    let blocks = config.locator().locate(text);

    let builder = |schema: Schema| {
        DatasetBuilder::new(schema)
            .significant_digits(config.significant_digits)
            .first_zone_index(config.first_zone_index)
    };

    let mut report = ExtractReport { blocks: blocks.clone(), ..ExtractReport::default() };
    let mut time_series = builder(Schema::TimeSeries);
    let mut snapshots = Vec::new();

    for block in &blocks {
        let Some(schema) = block.kind.schema() else {
            log::debug!("skipping unrecognized block {}", block.label());
            continue;
        };
        let options = config.row_options(block.kind);
        let mut spatial = builder(Schema::Spatial);

        for idx in block.body() {
            let Some(row) = tokenize_line(lines[idx], idx + 1, block.kind, schema.raw_arity(), &options) else {
                report.skipped_lines += 1;
                continue;
            };
            let target = match schema {
                Schema::TimeSeries => &mut time_series,
                Schema::Spatial => &mut spatial,
            };
            match target.push_row(&row) {
                Ok(_) => *report.rows_by_kind.entry(block.kind).or_insert(0) += 1,
                Err(e) => {
                    log::debug!("line {}: {e}", idx + 1);
                    report.skipped_lines += 1;
                }
            }
        }

        if schema == Schema::Spatial {
            report.duplicates += spatial.duplicates();
            let dataset = spatial.build();
            log::info!("spatial snapshot {}: {} zones", block.label(), dataset.len());
            snapshots.push(Snapshot { label: block.label(), block: block.clone(), dataset });
        }
    }

    report.duplicates += time_series.duplicates();
    let time_series = time_series.build();
    log::info!("time series: {} records from {} blocks", time_series.len(), blocks.len());

    for kind in [TableKind::TimeSeries, TableKind::SpatialProfile] {
        if !blocks.iter().any(|b| b.kind == kind) {
            log::warn!("{}", ExtractError::NoMatchingBlock(kind));
            report.missing_kinds.push(kind);
        }
    }

    ExtractedDocument { time_series, snapshots, report }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r"\section{GENEVE 10 transient}
TIME & QP & POWER & ALPHA & DELT & W \\
\begin{tabular}{|c|c|c|c|c|c|}
\hline
0 & .000000E & 00 & 3.484515E & 03 & 1.000000E & 00 & 1.300000E-02 & 2.000000E-01 & 5.000000E-01 \\
2 & .400000E & 02 & 5.194141E & 03 & 1.100000E & 00 & 1.200000E-02 & 2.000000E-01 & 4.000000E-01 \\
\end{tabular}
";

    #[test]
    fn missing_spatial_is_reported_not_fatal() {
        let doc = extract_document(DOC, &ExtractConfig::default());
        assert_eq!(doc.time_series.len(), 2);
        assert!(doc.snapshots.is_empty());
        assert_eq!(doc.report.missing_kinds, vec![TableKind::SpatialProfile]);
        assert_eq!(doc.dataset(Schema::Spatial, None), None);
    }

    #[test]
    fn largest_snapshot_prefers_first_on_tie() {
        let doc = format!(
            "{DOC}DENSITY & RADIUS & VELOCITY\n\\begin{{tabular}}\n1.0 & 1.0 & 0.0 & 1.0 & 1.0 & 1.0\n\\end{{tabular}}\n\
             DENSITY & RADIUS & VELOCITY\n\\begin{{tabular}}\n2.0 & 1.0 & 0.0 & 1.0 & 1.0 & 1.0\n\\end{{tabular}}\n"
        );
        let config = ExtractConfig { lookback_lines: 1, ..ExtractConfig::default() };
        let doc = extract_document(&doc, &config);
        assert_eq!(doc.snapshots.len(), 2);
        let first = doc.largest_snapshot().unwrap();
        assert_eq!(first.label, doc.snapshots[0].label);
        assert_eq!(first.dataset.records()[0].get("density"), Some(1.0));
    }

    #[test]
    fn largest_snapshot_picks_most_zones() {
        let doc = format!(
            "{DOC}\\begin{{tabular}}\nDENSITY & RADIUS & VELOCITY\n1.0 & 1.0 & 0.0 & 1.0 & 1.0 & 1.0\n\\end{{tabular}}\n\
             \\begin{{tabular}}\nDENSITY & RADIUS & VELOCITY\n2.0 & 1.0 & 0.0 & 1.0 & 1.0 & 1.0\n2.0 & 2.0 & 0.0 & 1.0 & 1.0 & 1.0\n\\end{{tabular}}\n"
        );
        let doc = extract_document(&doc, &ExtractConfig::default());
        assert_eq!(doc.snapshots.len(), 2);
        assert_eq!(doc.largest_snapshot().unwrap().label, doc.snapshots[1].label);
    }
}
