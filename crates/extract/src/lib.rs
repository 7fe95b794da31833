//! `simrecon-extract`: numeric table recovery from reference documents.
//!
//! Pure crate: receives document text, returns canonical datasets plus
//! extraction diagnostics. No file IO.

pub mod config;
pub mod document;
pub mod error;
pub mod locator;
pub mod reconstruct;
pub mod tokenizer;

pub use config::{ExtractConfig, KindConfig};
pub use document::{extract_document, ExtractReport, ExtractedDocument, Snapshot};
pub use error::ExtractError;
pub use locator::{BlockLocator, BlockMatcher, KeywordMatcher, TableBlock};
pub use reconstruct::{reconstruct, NormalizationRule, Reconstruction};
pub use tokenizer::{tokenize_line, Delimiter, RowOptions};
