use serde::Serialize;

use crate::schema::TableKind;

/// Classification of a reconstructed text fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenClass {
    /// Bare 1–2 digit integer standing on its own (row label).
    IntegerPrefix,
    /// Mantissa still waiting for its exponent group.
    MantissaFragment,
    /// Signed or signless 1–2 digit exponent group.
    ExponentSuffix,
    CompleteNumber,
    Unrecognized,
}

/// One reconstructed token: the normalized text, its class, and the parsed
/// value when the class is `CompleteNumber` or `IntegerPrefix`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericToken {
    pub text: String,
    pub class: TokenClass,
    pub value: Option<f64>,
}

impl NumericToken {
    pub fn complete(text: impl Into<String>, value: f64) -> Self {
        Self { text: text.into(), class: TokenClass::CompleteNumber, value: Some(value) }
    }

    pub fn integer_prefix(text: impl Into<String>, value: u32) -> Self {
        Self { text: text.into(), class: TokenClass::IntegerPrefix, value: Some(f64::from(value)) }
    }

    pub fn is_complete(&self) -> bool {
        self.class == TokenClass::CompleteNumber
    }
}

/// A tokenized source line holding exactly the schema's raw arity of
/// complete numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTableRow {
    /// 1-based line number in the source document.
    pub line: usize,
    pub kind: TableKind,
    /// Leading row label (bare integer before the first value), if any.
    pub label: Option<u32>,
    pub tokens: Vec<NumericToken>,
}

impl RawTableRow {
    /// Parsed values of the complete-number tokens, in order.
    pub fn values(&self) -> Vec<f64> {
        self.tokens
            .iter()
            .filter(|t| t.is_complete())
            .filter_map(|t| t.value)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_skip_non_complete_tokens() {
        let row = RawTableRow {
            line: 7,
            kind: TableKind::TimeSeries,
            label: Some(3),
            tokens: vec![
                NumericToken::integer_prefix("3", 3),
                NumericToken::complete("2.4E+02", 240.0),
                NumericToken::complete("1.0", 1.0),
            ],
        };
        assert_eq!(row.values(), vec![240.0, 1.0]);
    }
}
