use serde::Serialize;

use crate::metrics::ErrorMetric;

// ---------------------------------------------------------------------------
// Grade
// ---------------------------------------------------------------------------

/// Graded assessment next to the binary pass flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// Below the threshold.
    Excellent,
    /// Below twice the threshold.
    Good,
    /// Below five times the threshold.
    Acceptable,
    Poor,
    NoData,
}

impl Grade {
    pub fn assess(metric: &ErrorMetric, threshold: f64) -> Self {
        if !metric.has_samples() {
            return Self::NoData;
        }
        let e = metric.max_relative_error;
        if e < threshold {
            Self::Excellent
        } else if e < 2.0 * threshold {
            Self::Good
        } else if e < 5.0 * threshold {
            Self::Acceptable
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::Good => write!(f, "good"),
            Self::Acceptable => write!(f, "acceptable"),
            Self::Poor => write!(f, "poor"),
            Self::NoData => write!(f, "no_data"),
        }
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityVerdict {
    pub quantity: String,
    pub metric: ErrorMetric,
    pub threshold: f64,
    /// False iff the max relative error meets or exceeds the threshold.
    pub passed: bool,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictSummary {
    pub passing: usize,
    pub total: usize,
    /// Failing quantities, in comparison order.
    pub failed: Vec<String>,
}

/// Final judgment over all compared quantities. Built once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationVerdict {
    pub passed: bool,
    pub quantities: Vec<QuantityVerdict>,
    pub summary: VerdictSummary,
}

impl ValidationVerdict {
    /// Apply per-quantity thresholds. A quantity without comparable samples
    /// is graded `no_data` and does not fail the verdict.
    pub fn judge<F>(metrics: Vec<(String, ErrorMetric)>, threshold: F) -> Self
    where
        F: Fn(&str) -> f64,
    {
        let quantities: Vec<QuantityVerdict> = metrics
            .into_iter()
            .map(|(quantity, metric)| {
                let threshold = threshold(&quantity);
                let passed = !metric.has_samples() || metric.max_relative_error < threshold;
                let grade = Grade::assess(&metric, threshold);
                QuantityVerdict { quantity, metric, threshold, passed, grade }
            })
            .collect();

        let failed: Vec<String> = quantities
            .iter()
            .filter(|q| !q.passed)
            .map(|q| q.quantity.clone())
            .collect();

        ValidationVerdict {
            passed: failed.is_empty(),
            summary: VerdictSummary {
                passing: quantities.len() - failed.len(),
                total: quantities.len(),
                failed,
            },
            quantities,
        }
    }

    pub fn quantity(&self, name: &str) -> Option<&QuantityVerdict> {
        self.quantities.iter().find(|q| q.quantity == name)
    }

    pub fn failed(&self) -> &[String] {
        &self.summary.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::error_metric;

    fn metric(max_rel: f64) -> ErrorMetric {
        error_metric(&[100.0], &[100.0 * (1.0 + max_rel)], 1e-10)
    }

    #[test]
    fn threshold_is_exclusive() {
        let v = ValidationVerdict::judge(
            vec![("a".into(), metric(0.5)), ("b".into(), metric(0.25))],
            |_| 0.5,
        );
        assert!(!v.passed);
        assert_eq!(v.failed(), ["a".to_string()]);
        assert!(v.quantity("b").unwrap().passed);
        assert_eq!(v.summary.passing, 1);
        assert_eq!(v.summary.total, 2);
    }

    #[test]
    fn all_pass() {
        let v = ValidationVerdict::judge(vec![("total_energy".into(), metric(0.001))], |_| 0.01);
        assert!(v.passed);
        assert_eq!(v.quantities[0].grade, Grade::Excellent);
    }

    #[test]
    fn grades() {
        assert_eq!(Grade::assess(&metric(0.015), 0.01), Grade::Good);
        assert_eq!(Grade::assess(&metric(0.04), 0.01), Grade::Acceptable);
        assert_eq!(Grade::assess(&metric(0.5), 0.01), Grade::Poor);
        assert_eq!(Grade::assess(&error_metric(&[0.0], &[1.0], 1e-10), 0.01), Grade::NoData);
    }

    #[test]
    fn no_data_does_not_fail() {
        let v = ValidationVerdict::judge(
            vec![("alpha".into(), error_metric(&[0.0], &[1.0], 1e-10)), ("w".into(), metric(0.0))],
            |_| 0.1,
        );
        assert!(v.passed);
        assert_eq!(v.quantity("alpha").unwrap().grade, Grade::NoData);
    }
}
