use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use simrecon_core::Schema;

use crate::error::ReconError;
use crate::regression::RegressionCheck;
use crate::tolerances;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Validation settings. Every field has a default, so an empty TOML
/// document validates a time series with the named tolerances.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub name: String,
    pub schema: Schema,
    pub alignment: Alignment,
    /// Quantities to compare. Empty means the schema defaults.
    pub quantities: Vec<String>,
    /// Per-quantity max relative error overrides.
    pub thresholds: BTreeMap<String, f64>,
    /// Field name → CSV header, checked before the built-in aliases.
    pub columns: BTreeMap<String, String>,
    /// Field name → multiplier applied to simulation values at load time.
    pub scale: BTreeMap<String, f64>,
    pub near_zero_floor: f64,
    pub grid_point_cap: usize,
    pub match_distance: f64,
    pub significant_digits: u32,
    pub regression: RegressionConfig,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            name: "validation".to_string(),
            schema: Schema::TimeSeries,
            alignment: Alignment::CommonGrid,
            quantities: Vec::new(),
            thresholds: BTreeMap::new(),
            columns: BTreeMap::new(),
            scale: BTreeMap::new(),
            near_zero_floor: tolerances::NEAR_ZERO_FLOOR,
            grid_point_cap: tolerances::GRID_POINT_CAP,
            match_distance: tolerances::NEAREST_MATCH_DISTANCE,
            significant_digits: tolerances::DEDUP_SIGNIFICANT_DIGITS,
            regression: RegressionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Interpolate both datasets onto a shared grid over the key overlap.
    #[default]
    CommonGrid,
    /// Pair each reference record with the closest simulation record.
    Nearest,
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CommonGrid => write!(f, "common_grid"),
            Self::Nearest => write!(f, "nearest"),
        }
    }
}

// ---------------------------------------------------------------------------
// Regression
// ---------------------------------------------------------------------------

/// Regression check overrides; unset values fall back to the schema's
/// named defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegressionConfig {
    #[serde(default)]
    pub upper_bound: Option<f64>,
    #[serde(default)]
    pub tolerances: Option<[f64; 4]>,
}

// ---------------------------------------------------------------------------
// Loading + validation
// ---------------------------------------------------------------------------

impl ValidationConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ValidationConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults for one schema.
    pub fn for_schema(schema: Schema) -> Self {
        Self { schema, ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let schema = self.schema;
        let known = |name: &str| schema.field_index(name).is_some();

        for q in &self.quantities {
            if !known(q) {
                return Err(ReconError::ConfigValidation(format!(
                    "quantity '{q}' is not a {schema} field"
                )));
            }
            if q == schema.key_field() {
                return Err(ReconError::ConfigValidation(format!(
                    "'{q}' is the {schema} key and cannot be compared"
                )));
            }
        }

        for (q, t) in &self.thresholds {
            if !known(q) {
                return Err(ReconError::ConfigValidation(format!(
                    "threshold for unknown {schema} field '{q}'"
                )));
            }
            if !(t.is_finite() && *t > 0.0) {
                return Err(ReconError::ConfigValidation(format!(
                    "threshold for '{q}' must be a positive number, got {t}"
                )));
            }
        }

        for field in self.columns.keys().chain(self.scale.keys()) {
            if !known(field) {
                return Err(ReconError::ConfigValidation(format!(
                    "column mapping for unknown {schema} field '{field}'"
                )));
            }
        }

        if let Some((field, factor)) = self.scale.iter().find(|(_, f)| !f.is_finite() || **f == 0.0) {
            return Err(ReconError::ConfigValidation(format!(
                "scale for '{field}' must be finite and non-zero, got {factor}"
            )));
        }

        if !(self.near_zero_floor.is_finite() && self.near_zero_floor >= 0.0) {
            return Err(ReconError::ConfigValidation(
                "near_zero_floor must be a non-negative number".into(),
            ));
        }

        if self.grid_point_cap < 2 {
            return Err(ReconError::ConfigValidation(format!(
                "grid_point_cap must be at least 2, got {}",
                self.grid_point_cap
            )));
        }

        if !(self.match_distance.is_finite() && self.match_distance > 0.0) {
            return Err(ReconError::ConfigValidation(
                "match_distance must be a positive number".into(),
            ));
        }

        if !(1..=15).contains(&self.significant_digits) {
            return Err(ReconError::ConfigValidation(format!(
                "significant_digits must be in 1..=15, got {}",
                self.significant_digits
            )));
        }

        if let Some(tol) = self.regression.tolerances {
            if tol.iter().any(|t| !(t.is_finite() && *t >= 0.0)) {
                return Err(ReconError::ConfigValidation(
                    "regression tolerances must be non-negative numbers".into(),
                ));
            }
        }

        Ok(())
    }

    /// Quantities to compare, in configured (or schema default) order.
    pub fn quantities(&self) -> Vec<&str> {
        if self.quantities.is_empty() {
            self.schema.default_quantities().to_vec()
        } else {
            self.quantities.iter().map(String::as_str).collect()
        }
    }

    pub fn threshold(&self, quantity: &str) -> f64 {
        self.thresholds
            .get(quantity)
            .copied()
            .unwrap_or_else(|| tolerances::relative_threshold(self.schema, quantity))
    }

    /// Regression check with this config's overrides applied.
    pub fn regression_check(&self) -> RegressionCheck {
        let upper_bound = self
            .regression
            .upper_bound
            .unwrap_or_else(|| tolerances::regression_upper_bound(self.schema));
        let tolerances = self
            .regression
            .tolerances
            .unwrap_or_else(|| tolerances::regression_tolerances(self.schema));
        RegressionCheck::new(self.schema, upper_bound, tolerances)
            .match_distance(self.match_distance)
            .near_zero_floor(self.near_zero_floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let c = ValidationConfig::from_toml("").unwrap();
        assert_eq!(c.schema, Schema::TimeSeries);
        assert_eq!(c.alignment, Alignment::CommonGrid);
        assert_eq!(c.quantities(), vec!["total_energy", "relative_power", "alpha", "stability_w"]);
        assert_eq!(c.threshold("total_energy"), 0.01);
        assert_eq!(c.threshold("stability_w"), 0.10);
        assert_eq!(c.grid_point_cap, 100);
    }

    #[test]
    fn spatial_with_overrides() {
        let c = ValidationConfig::from_toml(
            r#"
name = "t=200 profile"
schema = "spatial"
alignment = "nearest"
quantities = ["density", "velocity"]

[thresholds]
velocity = 0.2

[columns]
radius = "r_cm"

[scale]
pressure = 100.0
"#,
        )
        .unwrap();
        assert_eq!(c.alignment, Alignment::Nearest);
        assert_eq!(c.quantities(), vec!["density", "velocity"]);
        assert_eq!(c.threshold("velocity"), 0.2);
        assert_eq!(c.threshold("density"), 0.01);
        assert_eq!(c.columns["radius"], "r_cm");
    }

    #[test]
    fn rejects_quantity_from_other_schema() {
        let err = ValidationConfig::from_toml("quantities = [\"density\"]").unwrap_err();
        assert!(err.to_string().contains("density"));
    }

    #[test]
    fn rejects_key_as_quantity() {
        let err = ValidationConfig::from_toml("quantities = [\"time\"]").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_zero_threshold() {
        let err = ValidationConfig::from_toml("[thresholds]\nalpha = 0.0\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_zero_scale() {
        let err = ValidationConfig::from_toml("[scale]\ntotal_energy = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("total_energy"));
    }

    #[test]
    fn parse_error_is_distinct() {
        let err = ValidationConfig::from_toml("schema = \"radial\"").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn regression_defaults_and_override() {
        let c = ValidationConfig::default();
        let check = c.regression_check();
        assert_eq!(check.upper_bound, 72.0);
        assert_eq!(check.tolerances, [0.05, 0.05, 0.10, 0.10]);

        let c = ValidationConfig::from_toml("[regression]\nupper_bound = 50.0\ntolerances = [0.1, 0.1, 0.2, 0.2]\n")
            .unwrap();
        let check = c.regression_check();
        assert_eq!(check.upper_bound, 50.0);
        assert_eq!(check.tolerances, [0.1, 0.1, 0.2, 0.2]);

        let spatial = ValidationConfig::for_schema(Schema::Spatial).regression_check();
        assert!(spatial.upper_bound.is_infinite());
    }
}
