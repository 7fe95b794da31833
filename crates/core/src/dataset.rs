use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::error::CoreError;
use crate::schema::Schema;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One schema-conformant row. Values are positional in `schema.fields()`
/// order; a NaN value means "not available" and is excluded from comparisons.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    schema: Schema,
    values: Vec<f64>,
}

impl CanonicalRecord {
    pub fn new(schema: Schema, values: Vec<f64>) -> Result<Self, CoreError> {
        let expected = schema.fields().len();
        if values.len() != expected {
            return Err(CoreError::ArityMismatch { schema, expected, found: values.len() });
        }
        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn key(&self) -> f64 {
        self.values[self.schema.key_index()]
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.schema.field_index(field).map(|i| self.values[i])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl Serialize for CanonicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self.schema.fields();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (name, value) in fields.iter().zip(&self.values) {
            // serde_json writes NaN as null
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Records of one schema, strictly ascending by key with no duplicate keys.
///
/// Built by `DatasetBuilder` (dedup + sort) or `Dataset::from_records`
/// (already ordered input, e.g. a resampling grid). Never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: Schema,
    records: Vec<CanonicalRecord>,
}

impl Dataset {
    pub fn empty(schema: Schema) -> Self {
        Self { schema, records: Vec::new() }
    }

    /// Wrap records that are already strictly ascending by a finite key.
    pub fn from_records(schema: Schema, records: Vec<CanonicalRecord>) -> Result<Self, CoreError> {
        let expected = schema.fields().len();
        let mut prev: Option<f64> = None;
        for (index, record) in records.iter().enumerate() {
            if record.schema != schema {
                return Err(CoreError::ArityMismatch { schema, expected, found: record.values.len() });
            }
            let key = record.key();
            if !key.is_finite() {
                return Err(CoreError::NonFiniteKey { index });
            }
            if prev.is_some_and(|p| key <= p) {
                return Err(CoreError::UnsortedKeys { index });
            }
            prev = Some(key);
        }
        Ok(Self { schema, records })
    }

    pub(crate) fn from_sorted_unique(schema: Schema, records: Vec<CanonicalRecord>) -> Self {
        Self { schema, records }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> Vec<f64> {
        self.records.iter().map(CanonicalRecord::key).collect()
    }

    /// All values of one field, in key order. `None` if the field is not part
    /// of the schema.
    pub fn column(&self, field: &str) -> Option<Vec<f64>> {
        let index = self.schema.field_index(field)?;
        Some(self.records.iter().map(|r| r.values[index]).collect())
    }

    /// A quantity is present when at least one record carries a finite value for it.
    pub fn has_quantity(&self, field: &str) -> bool {
        match self.schema.field_index(field) {
            Some(index) => self.records.iter().any(|r| r.values[index].is_finite()),
            None => false,
        }
    }

    /// `(first_key, last_key)`, or `None` when empty.
    pub fn key_range(&self) -> Option<(f64, f64)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.key(), last.key())),
            _ => None,
        }
    }

    /// New dataset holding only records whose key is `<= bound`.
    pub fn up_to(&self, bound: f64) -> Dataset {
        let records = self.records.iter().filter(|r| r.key() <= bound).cloned().collect();
        Self { schema: self.schema, records }
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Dataset", 4)?;
        s.serialize_field("schema", &self.schema)?;
        s.serialize_field("key", self.schema.key_field())?;
        s.serialize_field("fields", self.schema.fields())?;
        s.serialize_field("records", &self.records)?;
        s.end()
    }
}
