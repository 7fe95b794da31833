//! Quick regression check: nearest-match comparison of four quantity groups
//! up to a key bound, with one fractional tolerance per group.

use serde::Serialize;
use simrecon_core::{Dataset, Schema};

use crate::align::nearest_match;
use crate::metrics::relative_error;
use crate::tolerances;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed,
    /// No reference row had a simulation counterpart.
    CannotCompare,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionCell {
    pub quantity: String,
    pub reference: f64,
    pub simulation: f64,
    /// `None` when the reference is near zero or either value is missing.
    pub relative_error: Option<f64>,
    pub tolerance: f64,
    pub within_tolerance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionRow {
    pub key: f64,
    pub simulation_key: f64,
    pub cells: Vec<RegressionCell>,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionOutcome {
    pub status: CheckStatus,
    pub schema: Schema,
    pub upper_bound: f64,
    pub rows: Vec<RegressionRow>,
    /// Reference keys within the bound that had no simulation key close enough.
    pub excluded: Vec<f64>,
    pub failed_rows: usize,
}

impl RegressionOutcome {
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionCheck {
    pub schema: Schema,
    pub upper_bound: f64,
    /// In `schema.regression_quantities()` order.
    pub tolerances: [f64; 4],
    pub match_distance: f64,
    pub near_zero_floor: f64,
}

impl RegressionCheck {
    pub fn new(schema: Schema, upper_bound: f64, tolerances: [f64; 4]) -> Self {
        Self {
            schema,
            upper_bound,
            tolerances,
            match_distance: tolerances::NEAREST_MATCH_DISTANCE,
            near_zero_floor: tolerances::NEAR_ZERO_FLOOR,
        }
    }

    pub fn for_schema(schema: Schema) -> Self {
        Self::new(
            schema,
            tolerances::regression_upper_bound(schema),
            tolerances::regression_tolerances(schema),
        )
    }

    pub fn match_distance(mut self, distance: f64) -> Self {
        self.match_distance = distance;
        self
    }

    pub fn near_zero_floor(mut self, floor: f64) -> Self {
        self.near_zero_floor = floor;
        self
    }

    /// A row fails when any relative error exceeds its tolerance; cells
    /// without a relative error never fail.
    pub fn run(&self, reference: &Dataset, simulation: &Dataset) -> RegressionOutcome {
        let reference = reference.up_to(self.upper_bound);
        let matches = nearest_match(&reference, simulation, self.match_distance);
        let quantities = self.schema.regression_quantities();

        let rows: Vec<RegressionRow> = matches
            .iter()
            .map(|m| {
                let r = &reference.records()[m.reference_index];
                let s = &simulation.records()[m.simulation_index];
                let cells: Vec<RegressionCell> = quantities
                    .iter()
                    .zip(self.tolerances)
                    .map(|(q, tolerance)| {
                        let rv = r.get(q).unwrap_or(f64::NAN);
                        let sv = s.get(q).unwrap_or(f64::NAN);
                        let err = relative_error(rv, sv, self.near_zero_floor);
                        RegressionCell {
                            quantity: q.to_string(),
                            reference: rv,
                            simulation: sv,
                            relative_error: err,
                            tolerance,
                            within_tolerance: err.map_or(true, |e| e <= tolerance),
                        }
                    })
                    .collect();
                RegressionRow {
                    key: r.key(),
                    simulation_key: s.key(),
                    passed: cells.iter().all(|c| c.within_tolerance),
                    cells,
                }
            })
            .collect();

        let matched: Vec<usize> = matches.iter().map(|m| m.reference_index).collect();
        let excluded: Vec<f64> = reference
            .keys()
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !matched.contains(i))
            .map(|(_, k)| k)
            .collect();

        let failed_rows = rows.iter().filter(|r| !r.passed).count();
        let status = if rows.is_empty() {
            CheckStatus::CannotCompare
        } else if failed_rows > 0 {
            CheckStatus::Failed
        } else {
            CheckStatus::Passed
        };
        log::info!(
            "regression: {} rows compared, {} failed, {} excluded",
            rows.len(),
            failed_rows,
            excluded.len()
        );

        RegressionOutcome {
            status,
            schema: self.schema,
            upper_bound: self.upper_bound,
            rows,
            excluded,
            failed_rows,
        }
    }
}
