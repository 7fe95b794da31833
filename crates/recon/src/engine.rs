use simrecon_core::Dataset;

use crate::align::{common_grid, nearest_pair, AlignedPair};
use crate::config::{Alignment, ValidationConfig};
use crate::error::ReconError;
use crate::metrics::error_metric;
use crate::model::{Outcome, ReportMeta, ValidationInput, ValidationReport};
use crate::verdict::ValidationVerdict;

/// Align, measure and judge. Returns `Err` only for unusable input (schema
/// mismatch, a broken dataset); an empty overlap or missing data is a
/// `CannotCompare` outcome.
pub fn run(config: &ValidationConfig, input: &ValidationInput) -> Result<ValidationReport, ReconError> {
    let schema = config.schema;
    for (role, dataset) in [("reference", &input.reference), ("simulation", &input.simulation)] {
        if dataset.schema() != schema {
            return Err(ReconError::ConfigValidation(format!(
                "{role} dataset is {}, config expects {schema}",
                dataset.schema()
            )));
        }
    }

    let quantities: Vec<String> = config.quantities().into_iter().map(str::to_string).collect();
    let meta = ReportMeta {
        config_name: config.name.clone(),
        schema,
        alignment: config.alignment,
        quantities: quantities.clone(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at: chrono::Utc::now().to_rfc3339(),
    };
    let cannot_compare = |reason: String, pair: AlignedPair| {
        log::warn!("cannot compare: {reason}");
        ValidationReport {
            meta: meta.clone(),
            outcome: Outcome::CannotCompare { reason },
            reference: pair.reference,
            simulation: pair.simulation,
        }
    };

    if input.reference.is_empty() {
        return Ok(cannot_compare("reference dataset is empty".into(), AlignedPair::empty(schema)));
    }
    if input.simulation.is_empty() {
        return Ok(cannot_compare("simulation dataset is empty".into(), AlignedPair::empty(schema)));
    }

    let pair = match align(config, &input.reference, &input.simulation) {
        Ok(pair) => pair,
        Err(e @ ReconError::EmptyOverlap { .. }) => {
            return Ok(cannot_compare(e.to_string(), AlignedPair::empty(schema)));
        }
        Err(e) => return Err(e),
    };
    if pair.is_empty() {
        let reason = match config.alignment {
            Alignment::CommonGrid => "key ranges overlap in a single point".to_string(),
            Alignment::Nearest => format!(
                "no reference {} has a simulation sample within {}",
                schema.key_field(),
                config.match_distance
            ),
        };
        return Ok(cannot_compare(reason, pair));
    }
    log::info!("aligned {} {} samples ({})", pair.len(), schema, config.alignment);

    let metrics: Vec<(String, _)> = quantities
        .iter()
        .map(|q| {
            for (role, dataset) in [("reference", &input.reference), ("simulation", &input.simulation)] {
                if !dataset.has_quantity(q) {
                    log::warn!("{role} has no values for '{q}'");
                }
            }
            let reference = pair.reference.column(q).unwrap_or_default();
            let simulation = pair.simulation.column(q).unwrap_or_default();
            (q.clone(), error_metric(&reference, &simulation, config.near_zero_floor))
        })
        .collect();

    if metrics.iter().all(|(_, m)| !m.has_samples()) {
        return Ok(cannot_compare(
            "no quantity has comparable samples in both datasets".into(),
            pair,
        ));
    }

    let verdict = ValidationVerdict::judge(metrics, |q| config.threshold(q));
    if verdict.passed {
        log::info!("validation passed: {}/{} quantities", verdict.summary.passing, verdict.summary.total);
    } else {
        log::info!("validation failed: {}", verdict.failed().join(", "));
    }

    Ok(ValidationReport {
        meta,
        outcome: Outcome::Compared { verdict },
        reference: pair.reference,
        simulation: pair.simulation,
    })
}

fn align(config: &ValidationConfig, reference: &Dataset, simulation: &Dataset) -> Result<AlignedPair, ReconError> {
    match config.alignment {
        Alignment::CommonGrid => common_grid(reference, simulation, config.grid_point_cap),
        Alignment::Nearest => nearest_pair(reference, simulation, config.match_distance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simrecon_core::{DatasetBuilder, Schema};

    fn series(rows: &[(f64, f64, f64)]) -> Dataset {
        let mut b = DatasetBuilder::new(Schema::TimeSeries);
        for (t, e, p) in rows {
            b.push_values(vec![*t, *e, *p, f64::NAN, 0.2, f64::NAN]).unwrap();
        }
        b.build()
    }

    fn config(toml: &str) -> ValidationConfig {
        ValidationConfig::from_toml(toml).unwrap()
    }

    #[test]
    fn schema_mismatch_is_an_error() {
        let input = ValidationInput {
            reference: series(&[(0.0, 1.0, 1.0)]),
            simulation: Dataset::empty(Schema::Spatial),
        };
        assert!(matches!(run(&config(""), &input), Err(ReconError::ConfigValidation(_))));
    }

    #[test]
    fn empty_reference_cannot_compare() {
        let input = ValidationInput {
            reference: Dataset::empty(Schema::TimeSeries),
            simulation: series(&[(0.0, 1.0, 1.0)]),
        };
        let report = run(&config(""), &input).unwrap();
        assert!(!report.is_comparable());
        assert!(!report.passed());
    }

    #[test]
    fn disjoint_ranges_cannot_compare() {
        let input = ValidationInput {
            reference: series(&[(0.0, 1.0, 1.0), (1.0, 1.0, 1.0)]),
            simulation: series(&[(5.0, 1.0, 1.0), (6.0, 1.0, 1.0)]),
        };
        let report = run(&config(""), &input).unwrap();
        match report.outcome {
            Outcome::CannotCompare { reason } => assert!(reason.contains("do not overlap")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn absent_quantities_are_no_data_and_present_ones_judged() {
        let reference = series(&[(0.0, 100.0, 1.0), (10.0, 200.0, 2.0)]);
        let simulation = series(&[(0.0, 100.5, 1.0), (10.0, 201.0, 2.0)]);
        let report = run(&config(""), &ValidationInput { reference, simulation }).unwrap();
        let verdict = report.verdict().unwrap();
        assert!(verdict.passed);
        assert_eq!(verdict.quantities.len(), 4);
        assert!(!verdict.quantity("alpha").unwrap().metric.has_samples());
        assert_eq!(report.reference.len(), 2);
    }

    #[test]
    fn failing_quantity_is_named() {
        let reference = series(&[(0.0, 100.0, 1.0), (10.0, 200.0, 2.0)]);
        let simulation = series(&[(0.0, 100.0, 1.0), (10.0, 200.0, 3.0)]);
        let report = run(&config(""), &ValidationInput { reference, simulation }).unwrap();
        assert!(report.is_comparable());
        assert!(!report.passed());
        assert_eq!(report.verdict().unwrap().failed(), ["relative_power".to_string()]);
    }

    #[test]
    fn nothing_comparable_cannot_compare() {
        let reference = series(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)]);
        let simulation = series(&[(0.0, 1.0, 1.0), (10.0, 1.0, 1.0)]);
        let report = run(&config(""), &ValidationInput { reference, simulation }).unwrap();
        assert!(!report.is_comparable());
    }

    #[test]
    fn nearest_mode_uses_reference_keys() {
        let reference = series(&[(0.0, 100.0, 1.0), (240.0, 5194.141, 2.0), (300.0, 1.0, 1.0)]);
        let simulation = series(&[(0.02, 100.0, 1.0), (240.05, 5200.0, 2.0)]);
        let report = run(&config("alignment = \"nearest\""), &ValidationInput { reference, simulation }).unwrap();
        assert_eq!(report.simulation.keys(), vec![0.0, 240.0]);
        let energy = &report.verdict().unwrap().quantity("total_energy").unwrap().metric;
        assert_eq!(energy.sample_count, 2);
    }

    #[test]
    fn report_serializes_with_status_tag() {
        let reference = series(&[(0.0, 100.0, 1.0), (10.0, 200.0, 2.0)]);
        let report = run(&config("name = \"smoke\""), &ValidationInput { simulation: reference.clone(), reference })
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["status"], "compared");
        assert_eq!(json["meta"]["config_name"], "smoke");
        assert_eq!(json["meta"]["alignment"], "common_grid");
        assert_eq!(json["reference"]["key"], "time");
    }
}
