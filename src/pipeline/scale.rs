//! Zero-mean/unit-variance standardization with a strict fit/apply contract.
//!
//! Fit once on the pooled, decomposed training matrix; apply identically to
//! every training and test window. Fitting on a single window instead of
//! the pool leaks window-local statistics into the scaling and is the bug
//! class this module's contract exists to forbid.

use crate::types::{Matrix, Vector};

/// Per-column standardizer.
///
/// Constructed empty; `fit` learns per-column mean and standard deviation
/// once; `transform` applies them unchanged to any matrix of matching
/// width.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    mean: Option<Vector>,
    std: Option<Vector>,
}

impl StandardScaler {
    /// Create an unfitted scaler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn per-column mean and standard deviation from the pooled matrix.
    ///
    /// Columns with zero or non-finite spread get a standard deviation of
    /// 1.0 so constant features pass through centered but unscaled.
    ///
    /// # Panics
    ///
    /// Panics if already fitted or if the pooled matrix is empty.
    pub fn fit(&mut self, pooled: &Matrix) {
        assert!(
            self.mean.is_none(),
            "Scaler already fitted; construct a fresh instance per run"
        );
        assert!(
            pooled.nrows() > 0,
            "Cannot fit scaler on an empty pooled training matrix"
        );

        let n = pooled.nrows() as f64;
        let d = pooled.ncols();
        let mut mean = Vector::zeros(d);
        let mut std = Vector::zeros(d);

        for c in 0..d {
            let m: f64 = pooled.column(c).iter().sum::<f64>() / n;
            let var: f64 = pooled.column(c).iter().map(|v| (v - m) * (v - m)).sum::<f64>() / n;
            let s = var.sqrt();
            mean[c] = m;
            std[c] = if s.is_finite() && s > 1e-9 { s } else { 1.0 };
        }

        self.mean = Some(mean);
        self.std = Some(std);
    }

    /// Standardize a matrix with the fitted statistics.
    ///
    /// # Panics
    ///
    /// Panics if called before `fit` or on a width mismatch.
    pub fn transform(&self, data: &Matrix) -> Matrix {
        let mean = self.mean.as_ref().expect("Scaler transform called before fit");
        let std = self.std.as_ref().expect("Scaler transform called before fit");
        assert_eq!(
            data.ncols(),
            mean.len(),
            "Scaler was fitted on width {}, got {}",
            mean.len(),
            data.ncols()
        );

        let mut out = data.clone();
        for c in 0..out.ncols() {
            let m = mean[c];
            let s = std[c];
            for r in 0..out.nrows() {
                out[(r, c)] = (out[(r, c)] - m) / s;
            }
        }
        out
    }
}
