//! Grid alignment of two datasets sampled at different keys.

use simrecon_core::{CanonicalRecord, Dataset, Schema};

use crate::error::ReconError;

/// Two datasets of the same schema sampled at the same keys.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub reference: Dataset,
    pub simulation: Dataset,
}

impl AlignedPair {
    pub fn empty(schema: Schema) -> Self {
        Self { reference: Dataset::empty(schema), simulation: Dataset::empty(schema) }
    }

    pub fn len(&self) -> usize {
        self.reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Nearest match
// ---------------------------------------------------------------------------

/// A reference record and the simulation record closest to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestMatch {
    pub reference_index: usize,
    pub simulation_index: usize,
    pub distance: f64,
}

/// Index of the key closest to `target` in ascending `keys`. Ties go to the
/// lower key.
pub fn nearest_index(keys: &[f64], target: f64) -> Option<usize> {
    if keys.is_empty() || !target.is_finite() {
        return None;
    }
    let upper = keys.partition_point(|k| *k < target);
    if upper == 0 {
        return Some(0);
    }
    if upper == keys.len() {
        return Some(keys.len() - 1);
    }
    let below = upper - 1;
    if target - keys[below] <= keys[upper] - target {
        Some(below)
    } else {
        Some(upper)
    }
}

/// For each reference record, the nearest simulation record within
/// `max_distance`. Reference records with no close enough counterpart are
/// left out.
pub fn nearest_match(reference: &Dataset, simulation: &Dataset, max_distance: f64) -> Vec<NearestMatch> {
    let sim_keys = simulation.keys();
    reference
        .keys()
        .into_iter()
        .enumerate()
        .filter_map(|(reference_index, key)| {
            let simulation_index = nearest_index(&sim_keys, key)?;
            let distance = (sim_keys[simulation_index] - key).abs();
            if distance > max_distance {
                log::debug!(
                    "reference key {key}: nearest simulation key {} is {distance} away, excluded",
                    sim_keys[simulation_index]
                );
                return None;
            }
            Some(NearestMatch { reference_index, simulation_index, distance })
        })
        .collect()
}

/// Matched reference records and their simulation counterparts, the latter
/// re-keyed to the reference key so both sides share one key column.
pub fn nearest_pair(
    reference: &Dataset,
    simulation: &Dataset,
    max_distance: f64,
) -> Result<AlignedPair, ReconError> {
    let schema = reference.schema();
    let key_index = schema.key_index();
    let matches = nearest_match(reference, simulation, max_distance);

    let mut ref_records = Vec::with_capacity(matches.len());
    let mut sim_records = Vec::with_capacity(matches.len());
    for m in &matches {
        let r = &reference.records()[m.reference_index];
        let mut values = simulation.records()[m.simulation_index].values().to_vec();
        values[key_index] = r.key();
        ref_records.push(r.clone());
        sim_records.push(CanonicalRecord::new(schema, values)?);
    }

    Ok(AlignedPair {
        reference: Dataset::from_records(schema, ref_records)?,
        simulation: Dataset::from_records(schema, sim_records)?,
    })
}

// ---------------------------------------------------------------------------
// Common grid
// ---------------------------------------------------------------------------

/// `n` evenly spaced points from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

/// Piecewise-linear interpolation of `(xs, ys)` at `x`, extrapolating the
/// end segments. Non-finite samples are ignored; fewer than two usable
/// samples give NaN.
pub fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let points: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(px, py)| px.is_finite() && py.is_finite())
        .map(|(px, py)| (*px, *py))
        .collect();
    interpolate_points(&points, x)
}

fn interpolate_points(points: &[(f64, f64)], x: f64) -> f64 {
    if points.len() < 2 {
        return f64::NAN;
    }
    let upper = points.partition_point(|(px, _)| *px <= x).clamp(1, points.len() - 1);
    let (x0, y0) = points[upper - 1];
    let (x1, y1) = points[upper];
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

fn resample(dataset: &Dataset, grid: &[f64]) -> Result<Dataset, ReconError> {
    let schema = dataset.schema();
    let keys = dataset.keys();
    let key_index = schema.key_index();

    let columns: Vec<Vec<(f64, f64)>> = schema
        .fields()
        .iter()
        .map(|field| {
            let ys = dataset.column(field).unwrap_or_default();
            keys.iter()
                .zip(ys)
                .filter(|(k, y)| k.is_finite() && y.is_finite())
                .map(|(k, y)| (*k, y))
                .collect()
        })
        .collect();

    let records = grid
        .iter()
        .map(|&x| {
            let values = columns
                .iter()
                .enumerate()
                .map(|(i, points)| if i == key_index { x } else { interpolate_points(points, x) })
                .collect();
            CanonicalRecord::new(schema, values)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Dataset::from_records(schema, records)?)
}

/// Resample both datasets onto a shared grid over the overlap of their key
/// ranges.
///
/// Grid size is `min(len(reference), len(simulation), cap)`. Disjoint ranges
/// are an `EmptyOverlap` error; an overlap of zero width gives an empty pair.
pub fn common_grid(reference: &Dataset, simulation: &Dataset, cap: usize) -> Result<AlignedPair, ReconError> {
    let schema = reference.schema();
    let overlap = || ReconError::EmptyOverlap {
        reference: reference.key_range(),
        simulation: simulation.key_range(),
    };
    let ((ref_lo, ref_hi), (sim_lo, sim_hi)) = match (reference.key_range(), simulation.key_range()) {
        (Some(r), Some(s)) => (r, s),
        _ => return Err(overlap()),
    };

    let lo = ref_lo.max(sim_lo);
    let hi = ref_hi.min(sim_hi);
    if lo > hi {
        return Err(overlap());
    }
    if lo == hi {
        log::warn!("key overlap has zero width at {lo}");
        return Ok(AlignedPair::empty(schema));
    }

    let n = reference.len().min(simulation.len()).min(cap).max(2);
    let grid = linspace(lo, hi, n);
    log::debug!("common grid: {n} points over [{lo}, {hi}]");

    Ok(AlignedPair {
        reference: resample(reference, &grid)?,
        simulation: resample(simulation, &grid)?,
    })
}
