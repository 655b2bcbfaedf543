//! Diagnostic k-fold cross-validation.
//!
//! Splits pooled training data into k contiguous, nearly-equal folds by
//! index, not by session, not shuffled. For each fold a fresh unfitted
//! copy of the classifier is trained on the other k-1 folds and scored on
//! the held-out fold. The scores are printed and reported but never
//! consumed downstream; the production fit is untouched.

use crate::model::ridge::RidgeClassifier;
use crate::result::CvReport;
use crate::types::{Matrix, SubjectId};

/// Contiguous fold boundaries over `n` indices.
///
/// Fold sizes differ by at most one and every index lands in exactly one
/// fold: 100 samples over 5 folds gives [20, 20, 20, 20, 20]; 101 gives
/// one fold of 21.
///
/// # Panics
///
/// Panics if `k` is less than 2 or greater than `n`.
pub fn fold_boundaries(n: usize, k: usize) -> Vec<(usize, usize)> {
    assert!(k >= 2, "k-fold split requires at least 2 folds");
    assert!(k <= n, "k-fold split requires at least one sample per fold");

    let base = n / k;
    let remainder = n % k;
    let mut bounds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < remainder);
        bounds.push((start, start + size));
        start += size;
    }
    bounds
}

/// Run diagnostic k-fold cross-validation and report per-fold accuracy.
///
/// `model` supplies the hyperparameters; each fold trains a fresh copy so
/// no fitted state is ever reused across training sets.
///
/// # Panics
///
/// Panics if the arrays are not parallel or `k` is out of range.
pub fn k_fold_cv(
    model: &RidgeClassifier,
    x: &Matrix,
    y: &[SubjectId],
    k: usize,
) -> CvReport {
    assert_eq!(
        x.nrows(),
        y.len(),
        "Samples and labels must be parallel arrays"
    );
    let bounds = fold_boundaries(x.nrows(), k);

    let mut fold_accuracies = Vec::with_capacity(k);
    for (fold, &(start, end)) in bounds.iter().enumerate() {
        let heldout: Vec<usize> = (start..end).collect();
        let rest: Vec<usize> = (0..start).chain(end..x.nrows()).collect();

        let x_train = x.select_rows(rest.iter());
        let y_train: Vec<SubjectId> = rest.iter().map(|&i| y[i]).collect();
        let x_heldout = x.select_rows(heldout.iter());
        let y_heldout: Vec<SubjectId> = heldout.iter().map(|&i| y[i]).collect();

        let mut fold_model = model.fresh();
        fold_model.fit(&x_train, &y_train);
        let accuracy = fold_model.score(&x_heldout, &y_heldout);

        eprintln!(
            "[motion-oracle] fold {}: accuracy {:.2} %",
            fold,
            accuracy * 100.0
        );
        fold_accuracies.push(accuracy);
    }

    let mean_accuracy = fold_accuracies.iter().sum::<f64>() / fold_accuracies.len() as f64;
    eprintln!(
        "[motion-oracle] mean cross-validation accuracy: {:.2} %",
        mean_accuracy * 100.0
    );

    CvReport {
        fold_accuracies,
        mean_accuracy,
    }
}
