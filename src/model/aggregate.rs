//! Per-window prediction aggregation.
//!
//! A test window's samples are classified independently; votes per subject
//! id are counted and divided by the window size to produce a normalized
//! distribution. A window with zero samples after cleaning gets the
//! uniform distribution, tagged distinctly; the naive vote-count formula
//! would divide by zero there.

use crate::data::TestWindow;
use crate::result::{Prediction, PredictionSource};
use crate::types::{Matrix, SubjectId, Vector};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The seam between aggregation and the concrete classifier.
///
/// Implemented by the production ridge classifier and by test stubs.
pub trait SubjectClassifier: Sync {
    /// Predict a subject id, 1..=nr_subjects, for one sample.
    fn predict_subject(&self, sample: &Vector) -> SubjectId;
}

/// Aggregate per-sample predictions for one test window.
///
/// # Panics
///
/// Panics if the model predicts an id outside 1..=`nr_subjects`.
pub fn aggregate<M: SubjectClassifier>(
    model: &M,
    window: &Matrix,
    nr_subjects: usize,
) -> Prediction {
    if window.nrows() == 0 {
        return Prediction {
            distribution: vec![1.0 / nr_subjects as f64; nr_subjects],
            source: PredictionSource::EmptyWindowFallback,
        };
    }

    let mut votes = vec![0usize; nr_subjects];
    for row in window.row_iter() {
        let sample = Vector::from_iterator(row.len(), row.iter().copied());
        let predicted = model.predict_subject(&sample);
        assert!(
            (1..=nr_subjects as SubjectId).contains(&predicted),
            "Predicted subject {} outside 1..={}",
            predicted,
            nr_subjects
        );
        votes[predicted as usize - 1] += 1;
    }

    let n = window.nrows() as f64;
    Prediction {
        distribution: votes.iter().map(|&v| v as f64 / n).collect(),
        source: PredictionSource::VoteCount,
    }
}

/// Aggregate every test window with a shared read-only model.
pub fn aggregate_all<M: SubjectClassifier>(
    model: &M,
    windows: &[TestWindow],
    nr_subjects: usize,
) -> Vec<Prediction> {
    #[cfg(feature = "parallel")]
    {
        windows
            .par_iter()
            .map(|window| aggregate(model, &window.samples, nr_subjects))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        windows
            .iter()
            .map(|window| aggregate(model, &window.samples, nr_subjects))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stub predicting from a fixed script, keyed on the sample's first
    /// dimension.
    struct ScriptedClassifier;

    impl SubjectClassifier for ScriptedClassifier {
        fn predict_subject(&self, sample: &Vector) -> SubjectId {
            sample[0] as SubjectId
        }
    }

    #[test]
    fn test_vote_counting() {
        // Four samples: subject 1 three times, subject 2 once.
        let window = Matrix::from_row_slice(4, 1, &[1.0, 1.0, 2.0, 1.0]);
        let prediction = aggregate(&ScriptedClassifier, &window, 8);

        assert_eq!(prediction.source, PredictionSource::VoteCount);
        assert!((prediction.distribution[0] - 0.75).abs() < 1e-12);
        assert!((prediction.distribution[1] - 0.25).abs() < 1e-12);
        for &p in &prediction.distribution[2..] {
            assert_eq!(p, 0.0);
        }
    }

    #[test]
    fn test_distribution_sums_to_one() {
        let window = Matrix::from_row_slice(7, 1, &[1.0, 2.0, 3.0, 4.0, 5.0, 1.0, 2.0]);
        let prediction = aggregate(&ScriptedClassifier, &window, 8);
        let sum: f64 = prediction.distribution.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(prediction.distribution.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn test_empty_window_uniform_fallback() {
        let window = Matrix::zeros(0, 5);
        let prediction = aggregate(&ScriptedClassifier, &window, 8);

        assert_eq!(prediction.source, PredictionSource::EmptyWindowFallback);
        for &p in &prediction.distribution {
            assert!((p - 0.125).abs() < 1e-12);
        }
    }

    #[test]
    #[should_panic(expected = "outside 1..=8")]
    fn test_out_of_range_prediction_panics() {
        let window = Matrix::from_row_slice(1, 1, &[9.0]);
        aggregate(&ScriptedClassifier, &window, 8);
    }

    #[test]
    fn test_aggregate_all_preserves_order() {
        let windows = vec![
            TestWindow {
                id: "a".to_string(),
                samples: Matrix::from_row_slice(2, 1, &[1.0, 1.0]),
            },
            TestWindow {
                id: "b".to_string(),
                samples: Matrix::zeros(0, 1),
            },
            TestWindow {
                id: "c".to_string(),
                samples: Matrix::from_row_slice(1, 1, &[3.0]),
            },
        ];

        let predictions = aggregate_all(&ScriptedClassifier, &windows, 8);
        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions[0].source, PredictionSource::VoteCount);
        assert_eq!(predictions[1].source, PredictionSource::EmptyWindowFallback);
        assert!((predictions[2].distribution[2] - 1.0).abs() < 1e-12);
    }
}
