use serde::Serialize;

/// Agreement statistics for one quantity over aligned samples.
///
/// Only samples where both values are finite and `|reference| > floor`
/// contribute. With no such samples every statistic is NaN (`null` in JSON)
/// and `sample_count` is 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorMetric {
    pub mean_relative_error: f64,
    pub max_relative_error: f64,
    pub rms_absolute_error: f64,
    pub max_absolute_error: f64,
    pub mean_reference_value: f64,
    pub mean_simulation_value: f64,
    pub sample_count: usize,
}

impl ErrorMetric {
    fn no_data() -> Self {
        Self {
            mean_relative_error: f64::NAN,
            max_relative_error: f64::NAN,
            rms_absolute_error: f64::NAN,
            max_absolute_error: f64::NAN,
            mean_reference_value: f64::NAN,
            mean_simulation_value: f64::NAN,
            sample_count: 0,
        }
    }

    pub fn has_samples(&self) -> bool {
        self.sample_count > 0
    }
}

/// Relative error `|sim − ref| / |ref|`, or `None` when the reference is
/// within `floor` of zero or either value is not finite.
pub fn relative_error(reference: f64, simulation: f64, floor: f64) -> Option<f64> {
    if !reference.is_finite() || !simulation.is_finite() || reference.abs() <= floor {
        return None;
    }
    Some((simulation - reference).abs() / reference.abs())
}

/// Compare two equal-length, already aligned series.
pub fn error_metric(reference: &[f64], simulation: &[f64], floor: f64) -> ErrorMetric {
    let samples: Vec<(f64, f64)> = reference
        .iter()
        .zip(simulation)
        .map(|(r, s)| (*r, *s))
        .filter(|(r, s)| relative_error(*r, *s, floor).is_some())
        .collect();

    if samples.is_empty() {
        return ErrorMetric::no_data();
    }

    let n = samples.len() as f64;
    let mut sum_rel = 0.0;
    let mut max_rel = 0.0f64;
    let mut sum_sq = 0.0;
    let mut max_abs = 0.0f64;
    let mut sum_ref = 0.0;
    let mut sum_sim = 0.0;

    for (r, s) in &samples {
        let abs = (s - r).abs();
        let rel = abs / r.abs();
        sum_rel += rel;
        max_rel = max_rel.max(rel);
        sum_sq += abs * abs;
        max_abs = max_abs.max(abs);
        sum_ref += r;
        sum_sim += s;
    }

    ErrorMetric {
        mean_relative_error: sum_rel / n,
        max_relative_error: max_rel,
        rms_absolute_error: (sum_sq / n).sqrt(),
        max_absolute_error: max_abs,
        mean_reference_value: sum_ref / n,
        mean_simulation_value: sum_sim / n,
        sample_count: samples.len(),
    }
}
