//! Trivial reference predictors.
//!
//! Both baselines ignore the test window contents entirely: `uniform`
//! spreads mass evenly, `average` replays the empirical class frequency of
//! the training windows. They are dumb on purpose: reference points for
//! the linear model, not tuned predictors.

use crate::data::TrainWindow;
use crate::result::{Prediction, PredictionSource};
use crate::types::SubjectId;

/// The uniform baseline: 1/n per class, independent of input.
pub fn uniform(nr_subjects: usize) -> Prediction {
    Prediction {
        distribution: vec![1.0 / nr_subjects as f64; nr_subjects],
        source: PredictionSource::Baseline,
    }
}

/// One uniform prediction per test window.
pub fn uniform_predictions(n_windows: usize, nr_subjects: usize) -> Vec<Prediction> {
    vec![uniform(nr_subjects); n_windows]
}

/// The average baseline: class frequency over training window labels.
///
/// Each training window contributes one count for its subject; the
/// resulting distribution is replicated identically for every test window
/// (no per-window conditioning).
///
/// # Panics
///
/// Panics if the training set is empty or a label falls outside
/// 1..=`nr_subjects` ; no frequency can be derived either way.
pub fn average(train: &[TrainWindow], nr_subjects: usize) -> Prediction {
    assert!(
        !train.is_empty(),
        "Cannot derive the average baseline from an empty training set"
    );

    let mut counts = vec![0usize; nr_subjects];
    for window in train {
        assert!(
            (1..=nr_subjects as SubjectId).contains(&window.subject),
            "Subject {} outside 1..={}",
            window.subject,
            nr_subjects
        );
        counts[window.subject as usize - 1] += 1;
    }

    let total = train.len() as f64;
    Prediction {
        distribution: counts.iter().map(|&c| c as f64 / total).collect(),
        source: PredictionSource::Baseline,
    }
}

/// One average-baseline prediction per test window.
pub fn average_predictions(
    train: &[TrainWindow],
    n_windows: usize,
    nr_subjects: usize,
) -> Vec<Prediction> {
    vec![average(train, nr_subjects); n_windows]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Matrix;

    fn window(subject: SubjectId) -> TrainWindow {
        TrainWindow {
            subject,
            activity: None,
            samples: Matrix::zeros(1, 2),
        }
    }

    #[test]
    fn test_uniform_is_one_eighth() {
        let prediction = uniform(8);
        assert_eq!(prediction.source, PredictionSource::Baseline);
        for &p in &prediction.distribution {
            assert!((p - 0.125).abs() < 1e-12);
        }
    }

    #[test]
    fn test_uniform_ignores_window_count() {
        let predictions = uniform_predictions(3, 8);
        assert_eq!(predictions.len(), 3);
        for prediction in &predictions {
            assert!((prediction.distribution.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_average_balanced_ratio() {
        let train: Vec<TrainWindow> = (1..=8).map(|s| window(s as SubjectId)).collect();
        let prediction = average(&train, 8);
        for &p in &prediction.distribution {
            assert!((p - 0.125).abs() < 1e-12);
        }
    }

    #[test]
    fn test_average_skewed_ratio() {
        // Subject 1 contributes twice as many windows as each other subject.
        let mut train: Vec<TrainWindow> = (1..=8).map(|s| window(s as SubjectId)).collect();
        train.push(window(1));
        let prediction = average(&train, 8);

        assert!((prediction.distribution[0] - 2.0 / 9.0).abs() < 1e-12);
        for &p in &prediction.distribution[1..] {
            assert!((p - 1.0 / 9.0).abs() < 1e-12);
        }
        assert!((prediction.distribution.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "empty training set")]
    fn test_average_empty_panics() {
        average(&[], 8);
    }

    #[test]
    fn test_average_is_replicated_per_window() {
        let train: Vec<TrainWindow> = vec![window(1), window(2)];
        let predictions = average_predictions(&train, 4, 8);
        assert_eq!(predictions.len(), 4);
        for prediction in &predictions {
            assert_eq!(prediction.distribution, predictions[0].distribution);
        }
    }
}
