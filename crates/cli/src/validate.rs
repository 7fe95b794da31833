//! `simrecon validate`: align, measure and judge into a full report.

use std::path::PathBuf;

use simrecon_recon::{Outcome, ValidationReport};

use crate::input::CompareArgs;
use crate::CliError;

pub fn cmd_validate(args: CompareArgs, output: Option<PathBuf>) -> Result<(), CliError> {
    let config = args.run_config()?;
    let input = args.load(&config)?;
    let report = simrecon_recon::run(&config.validation, &input).map_err(CliError::recon)?;

    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::io_write(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io_write(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    }

    print_summary(&report);

    match &report.outcome {
        Outcome::CannotCompare { reason } => Err(CliError::cannot_compare(reason.clone())),
        Outcome::Compared { verdict } if !verdict.passed => Err(CliError::failed(format!(
            "validation failed: {}",
            verdict.failed().join(", ")
        ))),
        Outcome::Compared { .. } => Ok(()),
    }
}

fn print_summary(report: &ValidationReport) {
    let meta = &report.meta;
    eprintln!(
        "{} ({} schema, {} alignment, {} samples)",
        meta.config_name,
        meta.schema,
        meta.alignment,
        report.reference.len()
    );
    let Some(verdict) = report.verdict() else {
        return;
    };
    for q in &verdict.quantities {
        let status = if q.passed { "ok" } else { "FAIL" };
        if q.metric.has_samples() {
            eprintln!(
                "  {:<16} {:<4} max {:.4}% mean {:.4}% (threshold {}%, {})",
                q.quantity,
                status,
                q.metric.max_relative_error * 100.0,
                q.metric.mean_relative_error * 100.0,
                q.threshold * 100.0,
                q.grade,
            );
        } else {
            eprintln!("  {:<16} {:<4} no comparable samples", q.quantity, status);
        }
    }
    eprintln!("{}/{} quantities passed", verdict.summary.passing, verdict.summary.total);
}
