//! # motion-oracle
//!
//! Identify which of a fixed set of subjects produced a short window of
//! wearable motion-sensor data (3-axis accelerometer + gyroscope at two
//! body locations), using a classical feature-engineering +
//! linear-classification pipeline.
//!
//! The pipeline is a single sequential batch computation:
//!
//! 1. Parse raw per-session recordings; collapse corrupted readings to NaN
//! 2. Clean samples (training: discard invalid; test: repair to zero)
//! 3. Derive engineered per-sample features
//! 4. Impute per window, reduce dimensionality and standardize: the
//!    decomposer and scaler are fit once on pooled training samples and
//!    applied unchanged to held-out data, so nothing leaks
//! 5. Fit a regularized linear classifier on pooled (sample, label) pairs
//! 6. Aggregate per-sample votes into one distribution per test window
//!
//! ## Quick Start
//!
//! ```ignore
//! use motion_oracle::MotionOracle;
//!
//! let report = MotionOracle::new()
//!     .diagnostic_folds(5)
//!     .run_from_dir("Data".as_ref())?;
//!
//! println!("training accuracy: {:.1}%", report.train_accuracy * 100.0);
//! for prediction in &report.predictions {
//!     println!("{:?}", prediction.distribution);
//! }
//! ```
//!
//! ## Contracts
//!
//! Fitted transforms (decomposer, scaler, classifier) are constructed
//! empty, fit exactly once, and applied any number of times; applying
//! before fitting, fitting twice, or feeding mismatched column widths is a
//! programming error and panics. Recoverable environment failures (I/O,
//! malformed files, cache snapshots) are `Result`s.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod constants;
mod oracle;
mod result;
mod types;

// Functional modules
pub mod data;
pub mod model;
pub mod output;
pub mod pipeline;

// Re-exports for public API
pub use config::{Config, DecomposerKind, FeatureMode};
pub use constants::{DEFAULT_ALPHAS, ENGINEERED_WIDTH, NR_SUBJECTS, RAW_CHANNELS};
pub use data::{Interval, Session, TestWindow, TrainWindow};
pub use oracle::{MotionOracle, RunError};
pub use result::{CvReport, Metadata, Prediction, PredictionSource, RunReport};
pub use types::{Matrix, SubjectId, Vector};

/// Convenience function running the pipeline with default configuration.
///
/// # Arguments
///
/// * `train` - Labeled training sessions
/// * `test` - Standalone unlabeled test intervals
///
/// # Returns
///
/// A `RunReport` with one prediction distribution per test window.
pub fn identify(train: Vec<Session>, test: Vec<Interval>) -> RunReport {
    MotionOracle::new().run(train, test)
}
