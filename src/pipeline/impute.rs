//! Per-window missing value imputation.
//!
//! Fit and apply are fused per call: each window's matrix is imputed
//! independently using its own column means over observed values, never
//! statistics from other windows. The same operation is applied to both
//! partitions, so no training information leaks into test windows.

use crate::types::Matrix;

/// Replace every NaN with its column's mean over the observed values.
///
/// A column with no observed values becomes all zeros; column width is a
/// run invariant and is never changed by imputation.
pub fn impute(data: &Matrix) -> Matrix {
    let mut out = data.clone();

    for c in 0..out.ncols() {
        let mut sum = 0.0;
        let mut observed = 0usize;
        for r in 0..out.nrows() {
            let v = out[(r, c)];
            if !v.is_nan() {
                sum += v;
                observed += 1;
            }
        }
        if observed == out.nrows() {
            continue;
        }
        let fill = if observed > 0 { sum / observed as f64 } else { 0.0 };
        for r in 0..out.nrows() {
            if out[(r, c)].is_nan() {
                out[(r, c)] = fill;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impute_fills_column_mean() {
        let data = Matrix::from_row_slice(
            3,
            2,
            &[1.0, 10.0, f64::NAN, 20.0, 3.0, f64::NAN],
        );
        let imputed = impute(&data);

        // Column 0 observed mean is (1 + 3) / 2 = 2.
        assert!((imputed[(1, 0)] - 2.0).abs() < 1e-12);
        // Column 1 observed mean is (10 + 20) / 2 = 15.
        assert!((imputed[(2, 1)] - 15.0).abs() < 1e-12);
        // Observed values are untouched.
        assert_eq!(imputed[(0, 0)], 1.0);
        assert_eq!(imputed[(1, 1)], 20.0);
    }

    #[test]
    fn test_impute_all_missing_column_becomes_zero() {
        let data = Matrix::from_row_slice(2, 2, &[f64::NAN, 1.0, f64::NAN, 2.0]);
        let imputed = impute(&data);
        assert_eq!(imputed[(0, 0)], 0.0);
        assert_eq!(imputed[(1, 0)], 0.0);
        assert_eq!(imputed.ncols(), 2);
    }

    #[test]
    fn test_impute_clean_matrix_is_identity() {
        let data = Matrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(impute(&data), data);
    }
}
