use serde::Serialize;
use simrecon_core::{Dataset, Schema};

use crate::config::Alignment;
use crate::verdict::ValidationVerdict;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Pre-loaded datasets to compare. Both must use the configured schema.
#[derive(Debug, Clone)]
pub struct ValidationInput {
    pub reference: Dataset,
    pub simulation: Dataset,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub config_name: String,
    pub schema: Schema,
    pub alignment: Alignment,
    pub quantities: Vec<String>,
    pub engine_version: String,
    pub run_at: String,
}

/// Either a verdict, or the reason no comparison was possible. A failing
/// verdict is a normal outcome; `CannotCompare` is not a failure of any
/// quantity.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Compared { verdict: ValidationVerdict },
    CannotCompare { reason: String },
}

/// Payload handed to report renderers: the verdict plus both aligned datasets.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub meta: ReportMeta,
    pub outcome: Outcome,
    /// Reference after alignment; empty when nothing could be compared.
    pub reference: Dataset,
    pub simulation: Dataset,
}

impl ValidationReport {
    pub fn verdict(&self) -> Option<&ValidationVerdict> {
        match &self.outcome {
            Outcome::Compared { verdict } => Some(verdict),
            Outcome::CannotCompare { .. } => None,
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict().is_some_and(|v| v.passed)
    }

    pub fn is_comparable(&self) -> bool {
        self.verdict().is_some()
    }
}
