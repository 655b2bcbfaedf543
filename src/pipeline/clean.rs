//! Sample validation and repair.
//!
//! Corrupted readings reach us as NaN or Infinity. Parsing collapses both to
//! the single NaN sentinel; cleaning then applies one of two policies:
//!
//! 1. Discard (training): a sample with any invalid dimension is dropped.
//!    Training has abundant samples, so the loss is accepted.
//! 2. Repair (test): each invalid dimension is replaced with 0.0 and the
//!    sample is kept, because every test window must produce exactly one
//!    aligned prediction.
//!
//! The asymmetry is policy, not an accident.

use serde::{Deserialize, Serialize};

use crate::types::Matrix;

/// Statistics about sample cleaning across a run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CleanStats {
    /// Total samples seen before cleaning.
    pub total: usize,
    /// Samples remaining after cleaning.
    pub retained: usize,
    /// Samples discarded under the training policy.
    pub dropped: usize,
    /// Samples kept with at least one repaired dimension.
    pub repaired: usize,
}

impl CleanStats {
    /// Fraction of samples that were dropped (0.0 to 1.0).
    pub fn drop_fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.dropped as f64 / self.total as f64
        }
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: &CleanStats) {
        self.total += other.total;
        self.retained += other.retained;
        self.dropped += other.dropped;
        self.repaired += other.repaired;
    }
}

/// Collapse a possibly corrupted reading to the NaN sentinel.
///
/// Any non-finite value (NaN or either Infinity) becomes NaN; finite values
/// pass through unchanged. This is the parse-time normalization that lets
/// every later stage test a single sentinel.
#[inline]
pub fn normalize_value(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::NAN
    }
}

/// Validate and optionally repair one sample.
///
/// Scans all dimensions; the sample is invalid if any is non-finite.
///
/// # Arguments
///
/// * `sample` - One raw sample (any width)
/// * `repair` - `false`: discard invalid samples (training policy);
///   `true`: zero out invalid dimensions and keep the sample (test policy)
///
/// # Returns
///
/// `(cleaned_or_none, valid)`. `valid` is `false` whenever at least one
/// dimension had to be dropped or repaired. Under repair a sample with all
/// dimensions invalid still comes back (as all zeros), since window alignment
/// must be preserved.
pub fn clean_sample(sample: &[f64], repair: bool) -> (Option<Vec<f64>>, bool) {
    let valid = sample.iter().all(|v| v.is_finite());
    if valid {
        return (Some(sample.to_vec()), true);
    }
    if !repair {
        return (None, false);
    }
    let repaired = sample
        .iter()
        .map(|&v| if v.is_finite() { v } else { 0.0 })
        .collect();
    (Some(repaired), false)
}

/// Clean every row of a window's matrix under the given policy.
///
/// Rows are normalized first, then cleaned; `stats` accumulates the
/// per-sample outcomes. Under the discard policy the output may have fewer
/// rows than the input; under repair the row count is preserved exactly.
pub fn clean_matrix(data: &Matrix, repair: bool, stats: &mut CleanStats) -> Matrix {
    let ncols = data.ncols();
    let mut rows: Vec<f64> = Vec::with_capacity(data.len());
    let mut retained = 0;

    for row in data.row_iter() {
        stats.total += 1;
        let sample: Vec<f64> = row.iter().map(|&v| normalize_value(v)).collect();
        let (cleaned, valid) = clean_sample(&sample, repair);
        match cleaned {
            Some(cleaned) => {
                if !valid {
                    stats.repaired += 1;
                }
                stats.retained += 1;
                rows.extend_from_slice(&cleaned);
                retained += 1;
            }
            None => stats.dropped += 1,
        }
    }

    Matrix::from_row_iterator(retained, ncols, rows)
}

/// Drop the first half of a window's rows.
///
/// Consecutive training intervals share their first half with the previous
/// window; discarding it avoids double-counting. Callers skip each
/// session's first interval, which has no predecessor.
pub fn remove_overlap(data: &Matrix) -> Matrix {
    let start = data.nrows() / 2;
    data.rows(start, data.nrows() - start).into_owned()
}
