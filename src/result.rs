//! Run result types and related structures.

use serde::{Deserialize, Serialize};

use crate::types::SubjectId;

/// A probability-like distribution over the candidate subjects for one test
/// window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// One entry per subject id (index 0 is subject 1); entries are >= 0
    /// and sum to 1.
    pub distribution: Vec<f64>,

    /// How the distribution was produced.
    pub source: PredictionSource,
}

impl Prediction {
    /// Subject id with the highest score; ties break to the lowest id.
    pub fn top_subject(&self) -> SubjectId {
        let mut best = 0;
        for (idx, &score) in self.distribution.iter().enumerate() {
            if score > self.distribution[best] {
                best = idx;
            }
        }
        (best + 1) as SubjectId
    }
}

/// Provenance of a prediction distribution.
///
/// An empty test window cannot be voted on; its uniform fallback is tagged
/// distinctly so it is never mistaken for a genuine low-confidence
/// vote-count result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionSource {
    /// Per-sample classifier votes, normalized by window size.
    VoteCount,
    /// Uniform fallback for a window with zero samples after cleaning.
    EmptyWindowFallback,
    /// A trivial reference predictor (uniform or average baseline).
    Baseline,
}

/// Diagnostic k-fold cross-validation scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvReport {
    /// Held-out accuracy per fold, in fold order.
    pub fold_accuracies: Vec<f64>,
    /// Mean of the per-fold accuracies.
    pub mean_accuracy: f64,
}

/// Complete result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// One distribution per test window, in window order.
    pub predictions: Vec<Prediction>,

    /// Classifier accuracy on the full pooled training set.
    pub train_accuracy: f64,

    /// Regularization strength chosen by the classifier's internal
    /// cross-validation.
    pub chosen_alpha: f64,

    /// Diagnostic k-fold scores, when requested. Never consumed downstream.
    pub cross_validation: Option<CvReport>,

    /// Metadata for debugging and reporting.
    pub metadata: Metadata,
}

/// Metadata describing one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Number of labeled training windows after parsing.
    pub train_windows: usize,
    /// Number of test windows.
    pub test_windows: usize,
    /// Pooled training samples entering the classifier.
    pub train_samples: usize,
    /// Feature width entering the decomposer.
    pub feature_width: usize,
    /// Decomposer output components.
    pub n_components: usize,
    /// Decomposition algorithm used.
    pub decomposer: String,
    /// Training samples discarded by cleaning.
    pub dropped_samples: usize,
    /// Test samples kept with repaired dimensions.
    pub repaired_samples: usize,
    /// Explained-variance ratio per component, when the decomposer
    /// reports one.
    pub explained_variance_ratio: Option<Vec<f64>>,
    /// Wall-clock runtime of the whole run in seconds.
    pub runtime_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_subject_breaks_ties_low() {
        let prediction = Prediction {
            distribution: vec![0.25, 0.25, 0.25, 0.25],
            source: PredictionSource::VoteCount,
        };
        assert_eq!(prediction.top_subject(), 1);

        let prediction = Prediction {
            distribution: vec![0.1, 0.4, 0.4, 0.1],
            source: PredictionSource::VoteCount,
        };
        assert_eq!(prediction.top_subject(), 2);
    }

    #[test]
    fn test_report_serialization() {
        let report = RunReport {
            predictions: vec![Prediction {
                distribution: vec![0.5, 0.5],
                source: PredictionSource::VoteCount,
            }],
            train_accuracy: 0.9,
            chosen_alpha: 1.0,
            cross_validation: None,
            metadata: Metadata {
                train_windows: 2,
                test_windows: 1,
                train_samples: 8,
                feature_width: 14,
                n_components: 5,
                decomposer: "truncated-svd".to_string(),
                dropped_samples: 0,
                repaired_samples: 0,
                explained_variance_ratio: None,
                runtime_secs: 0.1,
            },
        };

        let json = serde_json::to_string(&report).expect("Should serialize");
        assert!(json.contains("distribution"));
        assert!(json.contains("VoteCount"));
        assert!(json.contains("chosen_alpha"));
    }
}
