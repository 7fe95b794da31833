//! Named tolerances. Every default threshold, cap and distance used by the
//! validation and regression paths is defined here and nowhere else.

use simrecon_core::Schema;

/// Reference magnitudes at or below this are excluded from relative errors.
pub const NEAR_ZERO_FLOOR: f64 = 1e-10;

/// Upper limit on common-grid size.
pub const GRID_POINT_CAP: usize = 100;

/// Significant digits at which two keys count as the same sample.
pub const DEDUP_SIGNIFICANT_DIGITS: u32 = simrecon_core::builder::DEFAULT_SIGNIFICANT_DIGITS;

/// Default maximum key distance for nearest-match alignment.
pub const NEAREST_MATCH_DISTANCE: f64 = 0.1;

/// Verdict threshold for quantities without their own entry below.
pub const DEFAULT_RELATIVE_THRESHOLD: f64 = 0.01;

/// Regression window for time series (microseconds). Spatial checks are unbounded.
pub const REGRESSION_TIME_UPPER_BOUND: f64 = 72.0;

/// Maximum relative error still counted as a pass, per quantity.
///
/// Energy is held tightest; the stability indicator and velocity are noisy
/// and get the loosest bound.
pub fn relative_threshold(schema: Schema, quantity: &str) -> f64 {
    match (schema, quantity) {
        (Schema::TimeSeries, "total_energy") => 0.01,
        (Schema::TimeSeries, "relative_power") => 0.05,
        (Schema::TimeSeries, "alpha") => 0.05,
        (Schema::TimeSeries, "time_step") => 0.05,
        (Schema::TimeSeries, "stability_w") => 0.10,
        (Schema::Spatial, "density") => 0.01,
        (Schema::Spatial, "pressure") => 0.05,
        (Schema::Spatial, "internal_energy") => 0.05,
        (Schema::Spatial, "temperature") => 0.05,
        (Schema::Spatial, "velocity") => 0.10,
        _ => DEFAULT_RELATIVE_THRESHOLD,
    }
}

/// Regression tolerances in `Schema::regression_quantities()` order.
pub fn regression_tolerances(schema: Schema) -> [f64; 4] {
    match schema {
        Schema::TimeSeries => [0.05, 0.05, 0.10, 0.10],
        Schema::Spatial => [0.05, 0.05, 0.10, 0.10],
    }
}

pub fn regression_upper_bound(schema: Schema) -> f64 {
    match schema {
        Schema::TimeSeries => REGRESSION_TIME_UPPER_BOUND,
        Schema::Spatial => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_tighter_than_stability() {
        assert!(
            relative_threshold(Schema::TimeSeries, "total_energy")
                < relative_threshold(Schema::TimeSeries, "stability_w")
        );
    }

    #[test]
    fn unknown_quantity_gets_default() {
        assert_eq!(relative_threshold(Schema::Spatial, "zone_index"), DEFAULT_RELATIVE_THRESHOLD);
    }
}
