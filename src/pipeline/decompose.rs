//! Linear dimensionality reduction with a strict fit/apply contract.
//!
//! A decomposer is fit exactly once, on samples pooled across all training
//! windows, and then applied to every training and test window with the
//! single fitted projection. It is never refit on test data; applying
//! before fitting is a programming-contract violation and panics.
//!
//! Two algorithms are available, selected by configuration:
//!
//! - [`TruncatedSvd`]: top-k right singular vectors of the (uncentered)
//!   pooled matrix.
//! - [`FastIca`]: independent component analysis via whitening and a
//!   symmetric fixed-point iteration with the logcosh nonlinearity.

use nalgebra::SymmetricEigen;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::config::{Config, DecomposerKind};
use crate::types::Matrix;

/// Eigenvalue floor guarding the whitening and decorrelation inversions.
const EIG_FLOOR: f64 = 1e-12;

/// Truncated low-rank projection from the singular value decomposition.
///
/// Constructed empty, fit once on the pooled training matrix, then applied
/// any number of times to matrices of matching column width.
#[derive(Debug, Clone)]
pub struct TruncatedSvd {
    n_components: usize,
    /// Projection matrix, features x components. `None` until fitted.
    components: Option<Matrix>,
    singular_values: Vec<f64>,
    explained_variance: Vec<f64>,
    explained_variance_ratio: Vec<f64>,
}

impl TruncatedSvd {
    /// Create an unfitted decomposer producing `n_components` outputs.
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            components: None,
            singular_values: Vec::new(),
            explained_variance: Vec::new(),
            explained_variance_ratio: Vec::new(),
        }
    }

    /// Fit the projection on the pooled training matrix.
    ///
    /// # Panics
    ///
    /// Panics if already fitted, if the pooled matrix is empty, or if
    /// `n_components` exceeds the column width.
    pub fn fit(&mut self, pooled: &Matrix) {
        assert!(
            self.components.is_none(),
            "Decomposer already fitted; construct a fresh instance per run"
        );
        assert!(
            pooled.nrows() > 0,
            "Cannot fit decomposer on an empty pooled training matrix"
        );
        let max_rank = pooled.ncols().min(pooled.nrows());
        assert!(
            self.n_components >= 1 && self.n_components <= max_rank,
            "n_components = {} must be in 1..=min(rows, cols) = {}",
            self.n_components,
            max_rank
        );

        let n = pooled.nrows();
        let svd = pooled.clone().svd(false, true);
        let v_t = svd
            .v_t
            .expect("SVD with compute_v always yields right singular vectors");

        let k = self.n_components;
        let components = v_t.rows(0, k).transpose();
        self.singular_values = svd.singular_values.iter().take(k).copied().collect();

        // Variance diagnostics over the projected columns; reported but
        // never consumed downstream.
        if n > 1 {
            let projected = pooled * &components;
            self.explained_variance = (0..k).map(|c| column_variance(&projected, c)).collect();
            let total_variance: f64 = (0..pooled.ncols())
                .map(|c| column_variance(pooled, c))
                .sum();
            self.explained_variance_ratio = if total_variance > 0.0 {
                self.explained_variance
                    .iter()
                    .map(|v| v / total_variance)
                    .collect()
            } else {
                vec![0.0; k]
            };
        } else {
            self.explained_variance = vec![0.0; k];
            self.explained_variance_ratio = vec![0.0; k];
        }
        self.components = Some(components);
    }

    /// Project a matrix onto the fitted components.
    ///
    /// # Panics
    ///
    /// Panics if called before `fit` or on a width mismatch.
    pub fn transform(&self, data: &Matrix) -> Matrix {
        let components = self
            .components
            .as_ref()
            .expect("Decomposer transform called before fit");
        assert_eq!(
            data.ncols(),
            components.nrows(),
            "Decomposer was fitted on width {}, got {}",
            components.nrows(),
            data.ncols()
        );
        data * components
    }

    /// Singular values of the retained components.
    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    /// Variance captured by each retained component.
    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    /// Fraction of the pooled matrix's total variance per component.
    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }
}

/// Independent component analysis via a symmetric fixed-point iteration.
///
/// Whitens the centered pooled matrix through an eigendecomposition of its
/// covariance, then iterates the logcosh update with symmetric
/// decorrelation until the unmixing matrix stabilizes. Initialization is
/// seeded, so runs are reproducible.
#[derive(Debug, Clone)]
pub struct FastIca {
    n_components: usize,
    max_iter: usize,
    tol: f64,
    seed: u64,
    /// Column means of the fit matrix. `None` until fitted.
    mean: Option<nalgebra::RowDVector<f64>>,
    /// Combined projection, features x components. `None` until fitted.
    projection: Option<Matrix>,
}

impl FastIca {
    /// Create an unfitted decomposer producing `n_components` outputs.
    pub fn new(n_components: usize, seed: u64) -> Self {
        Self {
            n_components,
            max_iter: 200,
            tol: 1e-4,
            seed,
            mean: None,
            projection: None,
        }
    }

    /// Fit the unmixing projection on the pooled training matrix.
    ///
    /// # Panics
    ///
    /// Panics if already fitted, if the pooled matrix has fewer than two
    /// rows, or if `n_components` exceeds the column width.
    pub fn fit(&mut self, pooled: &Matrix) {
        assert!(
            self.projection.is_none(),
            "Decomposer already fitted; construct a fresh instance per run"
        );
        assert!(
            pooled.nrows() > 1,
            "Cannot fit ICA on fewer than two pooled training samples"
        );
        assert!(
            self.n_components >= 1 && self.n_components <= pooled.ncols(),
            "n_components = {} must be in 1..={}",
            self.n_components,
            pooled.ncols()
        );

        let n = pooled.nrows();
        let k = self.n_components;

        // Center per column.
        let mean = pooled.row_mean();
        let mut centered = pooled.clone();
        for r in 0..n {
            let mut row = centered.row_mut(r);
            row -= &mean;
        }

        // Whitening from the covariance eigendecomposition: keep the top-k
        // eigenpairs, scale by 1/sqrt(eigenvalue).
        let cov = centered.transpose() * &centered / (n - 1) as f64;
        let eig = SymmetricEigen::new(cov);
        let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
        order.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));

        let d = pooled.ncols();
        let mut whitening = Matrix::zeros(k, d);
        for (row, &idx) in order.iter().take(k).enumerate() {
            let scale = 1.0 / eig.eigenvalues[idx].max(EIG_FLOOR).sqrt();
            for col in 0..d {
                whitening[(row, col)] = eig.eigenvectors[(col, idx)] * scale;
            }
        }

        let whitened = &centered * whitening.transpose();

        // Symmetric fixed-point iteration with the logcosh nonlinearity.
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        let mut w = Matrix::from_fn(k, k, |_, _| rng.sample::<f64, _>(StandardNormal));
        w = symmetric_decorrelation(&w);

        let mut converged = false;
        for _ in 0..self.max_iter {
            let sources = &whitened * w.transpose();
            let g = sources.map(|v| v.tanh());

            // E[g'(s)] per component, with g'(s) = 1 - tanh(s)^2.
            let mut g_prime_mean = vec![0.0; k];
            for c in 0..k {
                let mut acc = 0.0;
                for r in 0..n {
                    let t = sources[(r, c)].tanh();
                    acc += 1.0 - t * t;
                }
                g_prime_mean[c] = acc / n as f64;
            }

            let mut w_next = g.transpose() * &whitened / n as f64;
            for i in 0..k {
                let scaled = w.row(i) * g_prime_mean[i];
                let mut row = w_next.row_mut(i);
                row -= scaled;
            }
            w_next = symmetric_decorrelation(&w_next);

            let lim = (&w_next * w.transpose())
                .diagonal()
                .iter()
                .map(|v| (v.abs() - 1.0).abs())
                .fold(0.0, f64::max);
            w = w_next;
            if lim < self.tol {
                converged = true;
                break;
            }
        }
        if !converged {
            eprintln!(
                "[motion-oracle] FastICA did not converge within {} iterations; using last iterate",
                self.max_iter
            );
        }

        self.projection = Some(whitening.transpose() * w.transpose());
        self.mean = Some(mean);
    }

    /// Project a matrix through the fitted unmixing.
    ///
    /// # Panics
    ///
    /// Panics if called before `fit` or on a width mismatch.
    pub fn transform(&self, data: &Matrix) -> Matrix {
        let projection = self
            .projection
            .as_ref()
            .expect("Decomposer transform called before fit");
        let mean = self.mean.as_ref().expect("Decomposer transform called before fit");
        assert_eq!(
            data.ncols(),
            projection.nrows(),
            "Decomposer was fitted on width {}, got {}",
            projection.nrows(),
            data.ncols()
        );

        let mut centered = data.clone();
        for r in 0..centered.nrows() {
            let mut row = centered.row_mut(r);
            row -= mean;
        }
        centered * projection
    }
}

/// Symmetric decorrelation: W <- (W W^T)^(-1/2) W.
fn symmetric_decorrelation(w: &Matrix) -> Matrix {
    let eig = SymmetricEigen::new(w * w.transpose());
    let k = eig.eigenvalues.len();
    let mut inv_sqrt = Matrix::zeros(k, k);
    for i in 0..k {
        inv_sqrt[(i, i)] = 1.0 / eig.eigenvalues[i].max(EIG_FLOOR).sqrt();
    }
    &eig.eigenvectors * inv_sqrt * eig.eigenvectors.transpose() * w
}

/// Concrete decomposition algorithm, selected via configuration.
#[derive(Debug, Clone)]
pub enum Decomposer {
    /// Truncated low-rank projection.
    TruncatedSvd(TruncatedSvd),
    /// Independent component variant.
    FastIca(FastIca),
}

impl Decomposer {
    /// Construct the configured decomposer, unfitted.
    pub fn from_config(config: &Config) -> Self {
        match config.decomposer {
            DecomposerKind::TruncatedSvd => {
                Decomposer::TruncatedSvd(TruncatedSvd::new(config.n_components))
            }
            DecomposerKind::FastIca => {
                Decomposer::FastIca(FastIca::new(config.n_components, config.effective_seed()))
            }
        }
    }

    /// Fit once on the pooled training matrix.
    pub fn fit(&mut self, pooled: &Matrix) {
        match self {
            Decomposer::TruncatedSvd(svd) => svd.fit(pooled),
            Decomposer::FastIca(ica) => ica.fit(pooled),
        }
    }

    /// Apply the fitted projection to any matrix of matching width.
    pub fn transform(&self, data: &Matrix) -> Matrix {
        match self {
            Decomposer::TruncatedSvd(svd) => svd.transform(data),
            Decomposer::FastIca(ica) => ica.transform(data),
        }
    }

    /// Algorithm name for reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Decomposer::TruncatedSvd(_) => "truncated-svd",
            Decomposer::FastIca(_) => "fast-ica",
        }
    }

    /// Explained-variance ratios, when the algorithm reports them.
    pub fn explained_variance_ratio(&self) -> Option<Vec<f64>> {
        match self {
            Decomposer::TruncatedSvd(svd) => Some(svd.explained_variance_ratio().to_vec()),
            Decomposer::FastIca(_) => None,
        }
    }
}

/// Unbiased variance of one column.
fn column_variance(data: &Matrix, col: usize) -> f64 {
    let n = data.nrows();
    if n < 2 {
        return 0.0;
    }
    let mean: f64 = data.column(col).iter().sum::<f64>() / n as f64;
    data.column(col)
        .iter()
        .map(|v| (v - mean) * (v - mean))
        .sum::<f64>()
        / (n - 1) as f64
}
