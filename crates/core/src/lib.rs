//! `simrecon-core`: shared data model.
//!
//! Table kinds, schemas, raw tokenized rows and the canonical dataset
//! they are folded into. No IO.

pub mod builder;
pub mod dataset;
pub mod error;
pub mod schema;
pub mod token;

pub use builder::{round_significant, DatasetBuilder};
pub use dataset::{CanonicalRecord, Dataset};
pub use error::CoreError;
pub use schema::{Schema, TableKind};
pub use token::{NumericToken, RawTableRow, TokenClass};
