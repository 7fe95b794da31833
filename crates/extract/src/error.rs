use std::fmt;

use simrecon_core::TableKind;

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// No valid number could be rebuilt from these fragments. Row-local:
    /// the tokenizer skips the row.
    MalformedNumber { fragments: Vec<String> },
    /// A requested table kind does not occur in the document.
    NoMatchingBlock(TableKind),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty keyword set, bad digit, etc.).
    ConfigValidation(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedNumber { fragments } => {
                write!(f, "malformed number from fragments {fragments:?}")
            }
            Self::NoMatchingBlock(kind) => write!(f, "no {kind} table found in document"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ExtractError {}
