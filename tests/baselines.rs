//! Baseline predictor properties.

use motion_oracle::model::{average, average_predictions, uniform, uniform_predictions};
use motion_oracle::{Matrix, PredictionSource, SubjectId, TrainWindow};

fn window(subject: SubjectId) -> TrainWindow {
    TrainWindow {
        subject,
        activity: None,
        samples: Matrix::zeros(4, 12),
    }
}

#[test]
fn uniform_is_independent_of_input_size() {
    for n_windows in [0, 1, 17] {
        let predictions = uniform_predictions(n_windows, 8);
        assert_eq!(predictions.len(), n_windows);
        for prediction in &predictions {
            assert_eq!(prediction.distribution, vec![0.125; 8]);
            assert_eq!(prediction.source, PredictionSource::Baseline);
        }
    }
}

#[test]
fn average_matches_balanced_frequencies() {
    let train: Vec<TrainWindow> = (1..=8).map(|s| window(s as SubjectId)).collect();
    let prediction = average(&train, 8);
    assert_eq!(prediction.distribution, vec![0.125; 8]);
}

#[test]
fn average_shifts_with_skewed_frequencies() {
    // Subject 1 contributes double the windows.
    let mut train: Vec<TrainWindow> = (1..=8).map(|s| window(s as SubjectId)).collect();
    train.push(window(1));

    let prediction = average(&train, 8);
    assert!(prediction.distribution[0] > 0.125);
    for &p in &prediction.distribution[1..] {
        assert!(p < 0.125);
    }
    let sum: f64 = prediction.distribution.iter().sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[test]
fn average_is_identical_for_every_window() {
    let train: Vec<TrainWindow> = vec![window(3), window(5), window(3)];
    let predictions = average_predictions(&train, 5, 8);
    assert_eq!(predictions.len(), 5);
    for prediction in &predictions[1..] {
        assert_eq!(prediction.distribution, predictions[0].distribution);
    }
    assert!((predictions[0].distribution[2] - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn baselines_are_tagged() {
    assert_eq!(uniform(8).source, PredictionSource::Baseline);
    assert_eq!(average(&[window(1)], 8).source, PredictionSource::Baseline);
}
