//! Regularized linear multi-class classifier.
//!
//! One-vs-rest ridge regression on +/-1 targets with no intercept term;
//! samples arrive pre-centered by the scaler. The normal equations
//! (X^T X + alpha I) W = X^T Y are solved by Cholesky factorization, and
//! the regularization strength is chosen at fit time by internal k-fold
//! cross-validation over a configurable grid. One sample is one training
//! example; sessions are flattened before fitting.

use nalgebra::Cholesky;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::constants::DEFAULT_ALPHAS;
use crate::data::TrainWindow;
use crate::model::aggregate::SubjectClassifier;
use crate::model::validation::fold_boundaries;
use crate::types::{Matrix, SubjectId, Vector};

/// Flatten labeled windows into parallel training arrays.
///
/// Every (window, sample) pair becomes one training example; session and
/// window boundaries are ignored.
///
/// # Panics
///
/// Panics if two non-empty windows disagree on column width.
pub fn build_sets(windows: &[TrainWindow]) -> (Matrix, Vec<SubjectId>) {
    let width = windows
        .iter()
        .find(|w| w.samples.nrows() > 0)
        .map(|w| w.samples.ncols())
        .unwrap_or(0);

    let mut values: Vec<f64> = Vec::new();
    let mut labels: Vec<SubjectId> = Vec::new();
    let mut rows = 0;

    for window in windows {
        if window.samples.nrows() == 0 {
            continue;
        }
        assert_eq!(
            window.samples.ncols(),
            width,
            "Column width must match across all windows: expected {}, got {}",
            width,
            window.samples.ncols()
        );
        for row in window.samples.row_iter() {
            values.extend(row.iter().copied());
            labels.push(window.subject);
            rows += 1;
        }
    }

    (Matrix::from_row_iterator(rows, width, values), labels)
}

/// Ridge classifier with internal regularization selection.
///
/// Constructed unfitted; `fit` learns the weight matrix once; `predict_*`
/// and `score` apply it any number of times. Each pipeline run constructs
/// a fresh instance.
#[derive(Debug, Clone)]
pub struct RidgeClassifier {
    alphas: Vec<f64>,
    cv_folds: usize,
    seed: u64,
    /// Learned weights, features x classes. `None` until fitted.
    weights: Option<Matrix>,
    /// Distinct labels seen at fit time, ascending.
    classes: Vec<SubjectId>,
    chosen_alpha: Option<f64>,
}

impl Default for RidgeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RidgeClassifier {
    /// Create an unfitted classifier with the default alpha grid.
    pub fn new() -> Self {
        Self {
            alphas: DEFAULT_ALPHAS.to_vec(),
            cv_folds: 5,
            seed: 0,
            weights: None,
            classes: Vec::new(),
            chosen_alpha: None,
        }
    }

    /// Set the regularization grid searched at fit time.
    ///
    /// # Panics
    ///
    /// Panics if the grid is empty or contains a non-positive strength.
    pub fn with_alphas(mut self, alphas: Vec<f64>) -> Self {
        assert!(!alphas.is_empty(), "Regularization grid must not be empty");
        assert!(
            alphas.iter().all(|&a| a > 0.0 && a.is_finite()),
            "Regularization strengths must be positive and finite"
        );
        self.alphas = alphas;
        self
    }

    /// Set the number of internal folds for regularization selection.
    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    /// Set the seed for the shuffled internal folds.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// An unfitted copy with the same hyperparameters.
    ///
    /// Used by the diagnostic cross-validation, which must never reuse a
    /// fitted instance across two training sets.
    pub fn fresh(&self) -> Self {
        Self {
            alphas: self.alphas.clone(),
            cv_folds: self.cv_folds,
            seed: self.seed,
            weights: None,
            classes: Vec::new(),
            chosen_alpha: None,
        }
    }

    /// Fit on pooled (sample, subject-label) pairs.
    ///
    /// Selects the regularization strength by shuffled k-fold
    /// cross-validation over the grid, then refits the winner on the full
    /// pooled set.
    ///
    /// # Panics
    ///
    /// Panics if already fitted, if the pooled set is empty, if the arrays
    /// are not parallel, or if fewer than two classes are present.
    pub fn fit(&mut self, x: &Matrix, y: &[SubjectId]) {
        assert!(
            self.weights.is_none(),
            "Classifier already fitted; construct a fresh instance per run"
        );
        assert!(
            x.nrows() > 0,
            "Cannot fit classifier on an empty pooled training set"
        );
        assert_eq!(
            x.nrows(),
            y.len(),
            "Samples and labels must be parallel arrays"
        );

        let mut classes: Vec<SubjectId> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        assert!(
            classes.len() >= 2,
            "Cannot fit classifier with fewer than two classes"
        );
        self.classes = classes;

        let alpha = self.select_alpha(x, y);
        let targets = encode_targets(y, &self.classes);
        self.weights = Some(solve_ridge(x, &targets, alpha));
        self.chosen_alpha = Some(alpha);
    }

    /// Choose the regularization strength by held-out accuracy.
    fn select_alpha(&self, x: &Matrix, y: &[SubjectId]) -> f64 {
        let n = x.nrows();
        let k = self.cv_folds.min(n);
        if self.alphas.len() == 1 || k < 2 {
            return self.alphas[0];
        }

        // Shuffled index folds: contiguous folds on session-ordered data
        // can starve a fold of an entire class.
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);
        let bounds = fold_boundaries(n, k);

        let mut best_alpha = self.alphas[0];
        let mut best_accuracy = f64::NEG_INFINITY;

        for &alpha in &self.alphas {
            let mut total_correct = 0usize;
            for &(start, end) in &bounds {
                let heldout: Vec<usize> = indices[start..end].to_vec();
                let rest: Vec<usize> = indices[..start]
                    .iter()
                    .chain(indices[end..].iter())
                    .copied()
                    .collect();

                let x_train = x.select_rows(rest.iter());
                let y_train: Vec<SubjectId> = rest.iter().map(|&i| y[i]).collect();
                let targets = encode_targets(&y_train, &self.classes);
                let weights = solve_ridge(&x_train, &targets, alpha);

                let x_heldout = x.select_rows(heldout.iter());
                let scores = &x_heldout * &weights;
                for (row, &i) in heldout.iter().enumerate() {
                    if self.classes[argmax_row(&scores, row)] == y[i] {
                        total_correct += 1;
                    }
                }
            }
            let accuracy = total_correct as f64 / n as f64;
            if accuracy > best_accuracy {
                best_accuracy = accuracy;
                best_alpha = alpha;
            }
        }

        best_alpha
    }

    /// Predict the subject id for a single sample.
    ///
    /// Ties break to the lowest class id.
    ///
    /// # Panics
    ///
    /// Panics if called before `fit` or on a width mismatch.
    pub fn predict_subject(&self, sample: &Vector) -> SubjectId {
        let weights = self
            .weights
            .as_ref()
            .expect("Classifier predict called before fit");
        assert_eq!(
            sample.len(),
            weights.nrows(),
            "Classifier was fitted on width {}, got {}",
            weights.nrows(),
            sample.len()
        );

        let scores = weights.transpose() * sample;
        let mut best = 0;
        for i in 1..scores.len() {
            if scores[i] > scores[best] {
                best = i;
            }
        }
        self.classes[best]
    }

    /// Predict subject ids for every row of a matrix.
    ///
    /// # Panics
    ///
    /// Panics if called before `fit` or on a width mismatch.
    pub fn predict_rows(&self, x: &Matrix) -> Vec<SubjectId> {
        let weights = self
            .weights
            .as_ref()
            .expect("Classifier predict called before fit");
        assert_eq!(
            x.ncols(),
            weights.nrows(),
            "Classifier was fitted on width {}, got {}",
            weights.nrows(),
            x.ncols()
        );

        let scores = x * weights;
        (0..x.nrows())
            .map(|row| self.classes[argmax_row(&scores, row)])
            .collect()
    }

    /// Accuracy on labeled samples.
    pub fn score(&self, x: &Matrix, y: &[SubjectId]) -> f64 {
        assert_eq!(
            x.nrows(),
            y.len(),
            "Samples and labels must be parallel arrays"
        );
        if y.is_empty() {
            return 0.0;
        }
        let predicted = self.predict_rows(x);
        let correct = predicted
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| p == t)
            .count();
        correct as f64 / y.len() as f64
    }

    /// Regularization strength chosen at fit time, if fitted.
    pub fn chosen_alpha(&self) -> Option<f64> {
        self.chosen_alpha
    }

    /// Distinct labels seen at fit time, ascending.
    pub fn classes(&self) -> &[SubjectId] {
        &self.classes
    }
}

impl SubjectClassifier for RidgeClassifier {
    fn predict_subject(&self, sample: &Vector) -> SubjectId {
        RidgeClassifier::predict_subject(self, sample)
    }
}

/// Encode labels as an n x classes matrix of +/-1 targets.
fn encode_targets(y: &[SubjectId], classes: &[SubjectId]) -> Matrix {
    let mut targets = Matrix::from_element(y.len(), classes.len(), -1.0);
    for (row, label) in y.iter().enumerate() {
        if let Ok(col) = classes.binary_search(label) {
            targets[(row, col)] = 1.0;
        }
    }
    targets
}

/// Solve (X^T X + alpha I) W = X^T Y by Cholesky factorization.
///
/// The system is positive definite for alpha > 0, so the factorization
/// cannot fail on finite inputs.
fn solve_ridge(x: &Matrix, targets: &Matrix, alpha: f64) -> Matrix {
    let d = x.ncols();
    let mut gram = x.transpose() * x;
    for i in 0..d {
        gram[(i, i)] += alpha;
    }
    let chol = Cholesky::new(gram)
        .expect("Ridge normal equations are positive definite for alpha > 0");
    chol.solve(&(x.transpose() * targets))
}

/// Index of the row's maximum score; first maximum wins.
fn argmax_row(scores: &Matrix, row: usize) -> usize {
    let mut best = 0;
    for c in 1..scores.ncols() {
        if scores[(row, c)] > scores[(row, best)] {
            best = c;
        }
    }
    best
}
