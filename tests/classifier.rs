//! Classifier and validation behavior on synthetic pooled sets.

use motion_oracle::model::{build_sets, fold_boundaries, k_fold_cv, RidgeClassifier};
use motion_oracle::{Matrix, SubjectId, TrainWindow};

/// Three interleaved classes on a triangle, slightly jittered.
fn three_class_data(per_class: usize) -> (Matrix, Vec<SubjectId>) {
    let centers = [(2.0, 0.0), (-1.0, 1.8), (-1.0, -1.8)];
    let mut values = Vec::new();
    let mut labels = Vec::new();
    for i in 0..per_class {
        for (class, &(cx, cy)) in centers.iter().enumerate() {
            let jx = ((i * 3 + class) as f64 * 0.618).fract() * 0.4 - 0.2;
            let jy = ((i * 7 + class) as f64 * 0.414).fract() * 0.4 - 0.2;
            values.extend([cx + jx, cy + jy]);
            labels.push((class + 1) as SubjectId);
        }
    }
    (
        Matrix::from_row_slice(per_class * 3, 2, &values),
        labels,
    )
}

#[test]
fn multiclass_fit_and_score() {
    let (x, y) = three_class_data(30);
    let mut model = RidgeClassifier::new().with_seed(3);
    model.fit(&x, &y);

    assert_eq!(model.classes(), &[1, 2, 3]);
    let accuracy = model.score(&x, &y);
    assert!(accuracy > 0.95, "accuracy = {}", accuracy);
}

#[test]
fn alpha_is_chosen_from_the_grid() {
    let (x, y) = three_class_data(20);
    let grid = vec![0.1, 1.0, 10.0];
    let mut model = RidgeClassifier::new().with_alphas(grid.clone()).with_seed(3);
    model.fit(&x, &y);

    let alpha = model.chosen_alpha().expect("fitted");
    assert!(grid.contains(&alpha));
}

#[test]
fn k_fold_matches_spec_sizes() {
    let bounds = fold_boundaries(100, 5);
    assert_eq!(bounds.len(), 5);
    for &(start, end) in &bounds {
        assert_eq!(end - start, 20);
    }

    let bounds = fold_boundaries(101, 5);
    let sizes: Vec<usize> = bounds.iter().map(|&(s, e)| e - s).collect();
    assert_eq!(sizes.iter().sum::<usize>(), 101);
    assert!(sizes.iter().all(|&s| s == 20 || s == 21));
}

#[test]
fn diagnostic_cv_does_not_touch_the_model() {
    let (x, y) = three_class_data(20);
    let mut model = RidgeClassifier::new().with_alphas(vec![1.0]).with_seed(3);
    model.fit(&x, &y);
    let alpha_before = model.chosen_alpha();

    let report = k_fold_cv(&model, &x, &y, 5);

    assert_eq!(model.chosen_alpha(), alpha_before);
    assert_eq!(report.fold_accuracies.len(), 5);
    assert!(report.mean_accuracy > 0.9, "mean = {}", report.mean_accuracy);
}

#[test]
fn build_sets_pools_across_windows() {
    let windows: Vec<TrainWindow> = (1..=4)
        .map(|subject| TrainWindow {
            subject,
            activity: None,
            samples: Matrix::from_element(3, 2, subject as f64),
        })
        .collect();

    let (x, y) = build_sets(&windows);
    assert_eq!(x.nrows(), 12);
    assert_eq!(y.len(), 12);
    // One sample = one example, in window order.
    assert_eq!(&y[0..3], &[1, 1, 1]);
    assert_eq!(&y[9..12], &[4, 4, 4]);
}
