use serde::Deserialize;
use simrecon_core::builder::{DEFAULT_FIRST_ZONE_INDEX, DEFAULT_SIGNIFICANT_DIGITS};
use simrecon_core::TableKind;

use crate::error::ExtractError;
use crate::locator::{BlockLocator, KeywordMatcher};
use crate::tokenizer::{Delimiter, RowOptions};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Document extraction settings. Every field has a default, so an empty
/// TOML document is a complete configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub delimiter: Delimiter,
    pub start_marker: String,
    pub end_marker: String,
    /// Lines before the start marker searched for header keywords.
    pub lookback_lines: usize,
    /// Lines after the start marker searched for header keywords.
    pub lookahead_lines: usize,
    /// Must all occur in the window for any kind to match (e.g. a problem id).
    pub anchor_keywords: Vec<String>,
    pub significant_digits: u32,
    pub first_zone_index: u32,
    pub time_series: KindConfig,
    pub spatial: KindConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Ampersand,
            start_marker: r"\begin{tabular}".to_string(),
            end_marker: r"\end{tabular}".to_string(),
            lookback_lines: 10,
            lookahead_lines: 5,
            anchor_keywords: Vec::new(),
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
            first_zone_index: DEFAULT_FIRST_ZONE_INDEX,
            time_series: KindConfig::with_keywords(&["TIME", "QP", "POWER"]),
            spatial: KindConfig::with_keywords(&["DENSITY", "RADIUS", "VELOCITY"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KindConfig {
    /// Header keywords that must co-occur near the block start.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Digit to prepend to fragments that lost their leading digit.
    #[serde(default)]
    pub infer_leading_digit: Option<u8>,
}

impl KindConfig {
    fn with_keywords(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            infer_leading_digit: None,
        }
    }
}

impl ExtractConfig {
    pub fn from_toml(input: &str) -> Result<Self, ExtractError> {
        let config: ExtractConfig =
            toml::from_str(input).map_err(|e| ExtractError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.start_marker.trim().is_empty() || self.end_marker.trim().is_empty() {
            return Err(ExtractError::ConfigValidation(
                "start_marker and end_marker must not be empty".into(),
            ));
        }

        if !(1..=15).contains(&self.significant_digits) {
            return Err(ExtractError::ConfigValidation(format!(
                "significant_digits must be in 1..=15, got {}",
                self.significant_digits
            )));
        }

        for (name, kind) in [("time_series", &self.time_series), ("spatial", &self.spatial)] {
            if kind.keywords.is_empty() {
                return Err(ExtractError::ConfigValidation(format!(
                    "[{name}] needs at least one keyword"
                )));
            }
            // A blank keyword is contained in every window
            if kind.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ExtractError::ConfigValidation(format!(
                    "[{name}] keywords must not be blank"
                )));
            }
            if let Some(d) = kind.infer_leading_digit {
                if d > 9 {
                    return Err(ExtractError::ConfigValidation(format!(
                        "[{name}] infer_leading_digit must be 0-9, got {d}"
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn kind(&self, kind: TableKind) -> Option<&KindConfig> {
        match kind {
            TableKind::TimeSeries => Some(&self.time_series),
            TableKind::SpatialProfile => Some(&self.spatial),
            TableKind::Unknown => None,
        }
    }

    pub fn row_options(&self, kind: TableKind) -> RowOptions {
        RowOptions {
            delimiter: self.delimiter,
            leading_digit: self.kind(kind).and_then(|k| k.infer_leading_digit),
        }
    }

    /// Locator with one keyword matcher per kind, time-series first.
    pub fn locator(&self) -> BlockLocator {
        BlockLocator::new(self.start_marker.as_str(), self.end_marker.as_str())
            .window(self.lookback_lines, self.lookahead_lines)
            .anchors(&self.anchor_keywords)
            .with_matcher(KeywordMatcher::new(TableKind::TimeSeries, &self.time_series.keywords))
            .with_matcher(KeywordMatcher::new(TableKind::SpatialProfile, &self.spatial.keywords))
    }
}
