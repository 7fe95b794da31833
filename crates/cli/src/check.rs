//! `simrecon check`: quick regression check against a reference.

use simrecon_recon::{CheckStatus, RegressionOutcome};

use crate::input::CompareArgs;
use crate::CliError;

pub struct CheckOverrides {
    pub upper_bound: Option<f64>,
    pub tolerances: Option<Vec<f64>>,
    pub match_distance: Option<f64>,
}

pub fn cmd_check(args: CompareArgs, overrides: CheckOverrides) -> Result<(), CliError> {
    let config = args.run_config()?;
    let mut check = config.validation.regression_check();

    if let Some(bound) = overrides.upper_bound {
        if bound.is_nan() {
            return Err(CliError::usage("--upper-bound must be a number"));
        }
        check.upper_bound = bound;
    }
    if let Some(tolerances) = overrides.tolerances {
        check.tolerances = <[f64; 4]>::try_from(tolerances.as_slice())
            .map_err(|_| {
                CliError::usage(format!("--tolerances takes 4 values, got {}", tolerances.len()))
                    .with_hint(format!("one per quantity: {}", check.schema.regression_quantities().join(",")))
            })?;
        if check.tolerances.iter().any(|t| !(t.is_finite() && *t >= 0.0)) {
            return Err(CliError::usage("--tolerances must be non-negative numbers"));
        }
    }
    if let Some(distance) = overrides.match_distance {
        if !(distance.is_finite() && distance > 0.0) {
            return Err(CliError::usage("--match-distance must be a positive number"));
        }
        check.match_distance = distance;
    }

    let input = args.load(&config)?;
    let outcome = check.run(&input.reference, &input.simulation);

    if args.json {
        let json_str = serde_json::to_string_pretty(&outcome)
            .map_err(|e| CliError::io_write(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    print_table(&outcome);

    match outcome.status {
        CheckStatus::Passed => Ok(()),
        CheckStatus::Failed => Err(CliError::failed(format!(
            "regression check failed: {} of {} rows out of tolerance",
            outcome.failed_rows,
            outcome.rows.len()
        ))),
        CheckStatus::CannotCompare => Err(CliError::cannot_compare(format!(
            "no reference row up to {} has a simulation match",
            outcome.upper_bound
        ))),
    }
}

fn print_table(outcome: &RegressionOutcome) {
    let quantities = outcome.schema.regression_quantities();
    let mut header = format!("{:>12} {:>12}", outcome.schema.key_field(), "simulation");
    for q in quantities {
        header.push_str(&format!(" {q:>16}"));
    }
    eprintln!("{header}");

    for row in &outcome.rows {
        let mut line = format!("{:>12.6} {:>12.6}", row.key, row.simulation_key);
        for cell in &row.cells {
            let text = match cell.relative_error {
                Some(e) if cell.within_tolerance => format!("{:.3}%", e * 100.0),
                Some(e) => format!("{:.3}% !", e * 100.0),
                None => "n/a".to_string(),
            };
            line.push_str(&format!(" {text:>16}"));
        }
        eprintln!("{line}");
    }

    if !outcome.excluded.is_empty() {
        eprintln!("{} reference rows had no simulation match", outcome.excluded.len());
    }
    let verdict = match outcome.status {
        CheckStatus::Passed => "PASS",
        CheckStatus::Failed => "FAIL",
        CheckStatus::CannotCompare => "CANNOT COMPARE",
    };
    eprintln!("{verdict}: {} rows, {} failed", outcome.rows.len(), outcome.failed_rows);
}
