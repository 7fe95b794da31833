//! `--config` file: an `[extract]` and a `[validation]` section, both optional.

use std::path::Path;

use serde::Deserialize;
use simrecon_core::Schema;
use simrecon_extract::ExtractConfig;
use simrecon_recon::ValidationConfig;

use crate::CliError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub extract: ExtractConfig,
    pub validation: ValidationConfig,
}

impl RunConfig {
    pub fn from_toml(input: &str) -> Result<Self, CliError> {
        let config: RunConfig =
            toml::from_str(input).map_err(|e| CliError::parse(format!("config parse error: {e}")))?;
        config.extract.validate().map_err(CliError::extract)?;
        config.validation.validate().map_err(CliError::recon)?;
        Ok(config)
    }

    /// Defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(CliError::missing_input(path));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::parse(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&text).map_err(|e| e.with_hint(format!("in {}", path.display())))
    }

    /// Apply a `--schema` override. Validation settings are re-checked since
    /// configured quantities may not exist in the new schema.
    pub fn with_schema(mut self, schema: Option<Schema>) -> Result<Self, CliError> {
        if let Some(schema) = schema {
            self.validation.schema = schema;
            self.validation
                .validate()
                .map_err(|e| CliError::recon(e).with_hint("--schema conflicts with the [validation] section"))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::{EXIT_MISSING_INPUT, EXIT_PARSE};

    #[test]
    fn empty_is_default() {
        let c = RunConfig::from_toml("").unwrap();
        assert_eq!(c.validation.schema, Schema::TimeSeries);
        assert_eq!(c.extract.lookback_lines, 10);
    }

    #[test]
    fn both_sections() {
        let c = RunConfig::from_toml(
            r#"
[extract]
delimiter = "whitespace"
anchor_keywords = ["GENEVE 10"]

[validation]
schema = "spatial"
alignment = "nearest"
"#,
        )
        .unwrap();
        assert_eq!(c.extract.anchor_keywords, vec!["GENEVE 10".to_string()]);
        assert_eq!(c.validation.schema, Schema::Spatial);
    }

    #[test]
    fn invalid_validation_section_is_parse_error() {
        let err = RunConfig::from_toml("[validation]\ngrid_point_cap = 1\n").unwrap_err();
        assert_eq!(err.code, EXIT_PARSE);
    }

    #[test]
    fn schema_override_rechecks_quantities() {
        let c = RunConfig::from_toml("[validation]\nquantities = [\"alpha\"]\n").unwrap();
        let err = c.with_schema(Some(Schema::Spatial)).unwrap_err();
        assert_eq!(err.code, EXIT_PARSE);
    }

    #[test]
    fn missing_file() {
        let err = RunConfig::load(Some(Path::new("/nonexistent/simrecon.toml"))).unwrap_err();
        assert_eq!(err.code, EXIT_MISSING_INPUT);
    }
}
