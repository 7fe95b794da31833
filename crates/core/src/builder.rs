use std::collections::HashSet;

use ordered_float::OrderedFloat;

use crate::dataset::{CanonicalRecord, Dataset};
use crate::error::CoreError;
use crate::schema::Schema;
use crate::token::RawTableRow;

/// Significant digits used to decide whether two keys are the same point.
pub const DEFAULT_SIGNIFICANT_DIGITS: u32 = 7;

/// Zone number given to the first unlabeled spatial row.
pub const DEFAULT_FIRST_ZONE_INDEX: u32 = 2;

/// Round `x` to `digits` significant digits. Zero and non-finite values pass through.
pub fn round_significant(x: f64, digits: u32) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let magnitude = x.abs().log10().floor() as i32;
    let factor = 10f64.powi(digits as i32 - 1 - magnitude);
    if !factor.is_finite() || factor == 0.0 {
        return x;
    }
    (x * factor).round() / factor
}

/// Folds rows into a `Dataset`: first occurrence of a key wins, output is
/// sorted ascending by key.
///
/// Keys compare after rounding to `significant_digits`, so `239.99999999`
/// and `240.0` collapse into one record. Rows whose key is NaN or infinite
/// are dropped.
#[derive(Debug)]
pub struct DatasetBuilder {
    schema: Schema,
    significant_digits: u32,
    first_zone_index: u32,
    seen: HashSet<OrderedFloat<f64>>,
    records: Vec<CanonicalRecord>,
    spatial_position: u32,
    duplicates: usize,
    dropped: usize,
}

impl DatasetBuilder {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
            first_zone_index: DEFAULT_FIRST_ZONE_INDEX,
            seen: HashSet::new(),
            records: Vec::new(),
            spatial_position: 0,
            duplicates: 0,
            dropped: 0,
        }
    }

    pub fn significant_digits(mut self, digits: u32) -> Self {
        self.significant_digits = digits.max(1);
        self
    }

    pub fn first_zone_index(mut self, index: u32) -> Self {
        self.first_zone_index = index;
        self
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Rows rejected because their key matched an earlier row.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Rows rejected because their key was not finite.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Push a full record (all schema fields, in order). Returns whether the
    /// record was kept.
    pub fn push_values(&mut self, values: Vec<f64>) -> Result<bool, CoreError> {
        let record = CanonicalRecord::new(self.schema, values)?;
        let key = record.key();
        if !key.is_finite() {
            log::warn!("dropping {} record with non-finite key", self.schema);
            self.dropped += 1;
            return Ok(false);
        }
        let rounded = OrderedFloat(round_significant(key, self.significant_digits));
        if !self.seen.insert(rounded) {
            log::debug!("duplicate {} key {key}, keeping first occurrence", self.schema.key_field());
            self.duplicates += 1;
            return Ok(false);
        }
        self.records.push(record);
        Ok(true)
    }

    /// Push a tokenized source row. Spatial rows get their zone index from
    /// the row label, or positionally starting at `first_zone_index`.
    pub fn push_row(&mut self, row: &RawTableRow) -> Result<bool, CoreError> {
        let values = row.values();
        let expected = self.schema.raw_arity();
        if values.len() != expected {
            return Err(CoreError::ArityMismatch { schema: self.schema, expected, found: values.len() });
        }
        match self.schema {
            Schema::TimeSeries => self.push_values(values),
            Schema::Spatial => {
                let zone = row
                    .label
                    .unwrap_or(self.first_zone_index + self.spatial_position);
                self.spatial_position += 1;
                let mut full = Vec::with_capacity(values.len() + 1);
                full.push(f64::from(zone));
                full.extend(values);
                self.push_values(full)
            }
        }
    }

    pub fn build(mut self) -> Dataset {
        self.records.sort_by(|a, b| a.key().total_cmp(&b.key()));

        if self.schema == Schema::Spatial {
            let zones: Vec<f64> = self.records.iter().filter_map(|r| r.get("zone_index")).collect();
            if zones.windows(2).any(|w| w[1] < w[0]) {
                log::warn!("zone index does not increase with radius; profile may mix snapshots");
            }
        }

        Dataset::from_sorted_unique(self.schema, self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableKind;
    use crate::token::NumericToken;

    fn spatial_row(label: Option<u32>, radius: f64) -> RawTableRow {
        let mut tokens = Vec::new();
        if let Some(l) = label {
            tokens.push(NumericToken::integer_prefix(l.to_string(), l));
        }
        for v in [8.0, radius, 0.0, 0.0, 0.0, 0.0] {
            tokens.push(NumericToken::complete(v.to_string(), v));
        }
        RawTableRow { line: 1, kind: TableKind::SpatialProfile, label, tokens }
    }

    #[test]
    fn rounds_to_significant_digits() {
        assert_eq!(round_significant(239.99999999, 7), 240.0);
        assert_eq!(round_significant(0.0, 7), 0.0);
        assert_eq!(round_significant(-1234.5678, 4), -1235.0);
        assert!(round_significant(f64::NAN, 7).is_nan());
    }

    #[test]
    fn first_occurrence_wins_and_output_sorted() {
        let mut b = DatasetBuilder::new(Schema::TimeSeries);
        assert!(b.push_values(vec![240.0, 5194.141, 1.0, 0.0, 2.0, 0.5]).unwrap());
        assert!(b.push_values(vec![0.0, 3484.515, 1.0, 0.0, 2.0, 0.5]).unwrap());
        assert!(!b.push_values(vec![239.99999999, 9999.0, 1.0, 0.0, 2.0, 0.5]).unwrap());
        assert_eq!(b.duplicates(), 1);

        let ds = b.build();
        assert_eq!(ds.keys(), vec![0.0, 240.0]);
        assert_eq!(ds.records()[1].get("total_energy"), Some(5194.141));
    }

    #[test]
    fn non_finite_keys_are_dropped() {
        let mut b = DatasetBuilder::new(Schema::TimeSeries);
        assert!(!b.push_values(vec![f64::NAN, 1.0, 1.0, 0.0, 2.0, 0.5]).unwrap());
        assert_eq!(b.dropped(), 1);
        assert!(b.build().is_empty());
    }

    #[test]
    fn spatial_zone_index_positional_from_two() {
        let mut b = DatasetBuilder::new(Schema::Spatial);
        b.push_row(&spatial_row(None, 10.0)).unwrap();
        b.push_row(&spatial_row(None, 20.0)).unwrap();
        let ds = b.build();
        assert_eq!(ds.column("zone_index").unwrap(), vec![2.0, 3.0]);
        assert_eq!(ds.keys(), vec![10.0, 20.0]);
    }

    #[test]
    fn spatial_zone_index_prefers_row_label() {
        let mut b = DatasetBuilder::new(Schema::Spatial).first_zone_index(1);
        b.push_row(&spatial_row(Some(7), 10.0)).unwrap();
        b.push_row(&spatial_row(None, 20.0)).unwrap();
        let ds = b.build();
        assert_eq!(ds.column("zone_index").unwrap(), vec![7.0, 2.0]);
    }

    #[test]
    fn push_row_checks_raw_arity() {
        let row = RawTableRow {
            line: 3,
            kind: TableKind::TimeSeries,
            label: None,
            tokens: vec![NumericToken::complete("1.0", 1.0)],
        };
        let err = DatasetBuilder::new(Schema::TimeSeries).push_row(&row).unwrap_err();
        assert_eq!(err, CoreError::ArityMismatch { schema: Schema::TimeSeries, expected: 6, found: 1 });
    }
}
