//! Configuration for the identification pipeline.

use std::path::PathBuf;

use crate::constants::{DEFAULT_ALPHAS, DEFAULT_COMPONENTS, NR_SUBJECTS};

/// Configuration options for `MotionOracle`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of candidate subjects (default: 8). Subject ids are 1..=n.
    pub nr_subjects: usize,

    /// Feature derivation mode (default: `Engineered`).
    ///
    /// `Raw` leaves samples at the full 12-channel width and defers all
    /// dimensionality reduction to the decomposer.
    pub feature_mode: FeatureMode,

    /// Dimensionality-reduction algorithm (default: truncated SVD).
    pub decomposer: DecomposerKind,

    /// Decomposer output components (default: 5).
    ///
    /// Must not exceed the feature width entering the decomposer.
    pub n_components: usize,

    /// Regularization grid searched by the classifier at fit time
    /// (default: [0.1, 1.0, 10.0]).
    pub alphas: Vec<f64>,

    /// Folds used internally for regularization selection (default: 5).
    pub cv_folds: usize,

    /// When set, run the diagnostic k-fold cross-validation with this k
    /// after the production fit and include the scores in the report.
    /// Purely informational; never consumed downstream.
    pub diagnostic_folds: Option<usize>,

    /// Drop the first half of every training interval except each session's
    /// first, removing samples shared with the preceding window
    /// (default: true).
    pub remove_overlap: bool,

    /// Optional deterministic seed for the stochastic steps (ICA
    /// initialization, shuffled regularization folds).
    pub seed: Option<u64>,

    /// Directory for stage snapshots. When set, parsed data is cached and
    /// reloaded on later runs; absence of a snapshot means recompute.
    pub cache_dir: Option<PathBuf>,
}

/// Feature derivation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureMode {
    /// Derive the engineered per-sample feature vector (triad norms,
    /// cross-limb differences, energies, retained raw accelerometer
    /// channels).
    Engineered,

    /// Keep raw 12-channel samples; the decomposer alone reduces
    /// dimensionality.
    Raw,
}

/// Dimensionality-reduction algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecomposerKind {
    /// Truncated low-rank projection from the singular value decomposition
    /// of the pooled training matrix.
    TruncatedSvd,

    /// Independent component analysis (whitening + symmetric fixed-point
    /// iteration with the logcosh nonlinearity).
    FastIca,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nr_subjects: NR_SUBJECTS,
            feature_mode: FeatureMode::Engineered,
            decomposer: DecomposerKind::TruncatedSvd,
            n_components: DEFAULT_COMPONENTS,
            alphas: DEFAULT_ALPHAS.to_vec(),
            cv_folds: 5,
            diagnostic_folds: None,
            remove_overlap: true,
            seed: None,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Seed for stochastic steps, defaulting to a fixed value so unseeded
    /// runs are still reproducible.
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(0x6d6f_7469_6f6e)
    }
}
