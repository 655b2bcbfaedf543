//! Records for raw recordings and the payloads flowing through the pipeline.

use serde::{Deserialize, Serialize};

use crate::pipeline::CleanStats;
use crate::types::Matrix;

/// One labeled recording of one subject performing one activity, made of
/// time-ordered two-second intervals.
///
/// Created once at load time; intervals are appended in time order and the
/// record is immutable thereafter. Pipeline stages never mutate a `Session`;
/// they derive `TrainWindow` values from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Name of the folder containing the session data.
    pub id: String,
    /// Session number for this subject.
    pub number: u32,
    /// Id of the subject, 1..=NR_SUBJECTS.
    pub subject: u8,
    /// Activity label from the activities file, if present.
    pub activity: Option<String>,
    /// Intervals sorted by start time.
    pub intervals: Vec<Interval>,
}

/// A fixed-duration slice of raw multi-channel sensor data.
///
/// Training intervals carry a start time; standalone test intervals do not.
/// The owning session is identified by id strings only; there is no
/// back-reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interval {
    /// Name of the file the interval was read from.
    pub id: String,
    /// Start time within the session in seconds; `None` for test intervals.
    pub time: Option<f64>,
    /// Raw data, rows x 12 channels.
    pub data: Matrix,
}

/// A labeled window after parsing: the per-interval payload transformed by
/// the pipeline stages.
///
/// Stages replace the `samples` matrix by constructing a new value through
/// [`TrainWindow::with_samples`]; identity fields are never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainWindow {
    /// Id of the subject that produced the window.
    pub subject: u8,
    /// Numeric activity id, if the session carried one.
    pub activity: Option<i32>,
    /// Sample matrix for this window (rows x current stage width).
    pub samples: Matrix,
}

impl TrainWindow {
    /// Build a new window with the same identity fields and a replaced
    /// sample matrix.
    pub fn with_samples(&self, samples: Matrix) -> Self {
        Self {
            subject: self.subject,
            activity: self.activity,
            samples,
        }
    }
}

/// An unlabeled test window after parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestWindow {
    /// Name of the file the window was read from.
    pub id: String,
    /// Sample matrix for this window (rows x current stage width).
    pub samples: Matrix,
}

impl TestWindow {
    /// Build a new window with the same identity and a replaced sample
    /// matrix.
    pub fn with_samples(&self, samples: Matrix) -> Self {
        Self {
            id: self.id.clone(),
            samples,
        }
    }
}

/// Raw dataset as loaded from disk: the shape of the first cache snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDataset {
    /// All training sessions.
    pub train: Vec<Session>,
    /// All standalone test intervals, sorted by id.
    pub test: Vec<Interval>,
}

/// Parsed dataset after cleaning: the shape of the second cache snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowDataset {
    /// Labeled training windows.
    pub train: Vec<TrainWindow>,
    /// Unlabeled test windows.
    pub test: Vec<TestWindow>,
    /// Cleaning outcomes from the parse stage, preserved so cached runs
    /// still report them.
    pub stats: CleanStats,
}

/// Fully transformed dataset (features, imputation, decomposition and
/// scaling applied): the shape of the processed cache snapshot.
///
/// Carries the processing facts a cached run can no longer recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDataset {
    /// Transformed training windows.
    pub train: Vec<TrainWindow>,
    /// Transformed test windows.
    pub test: Vec<TestWindow>,
    /// Cleaning outcomes from the parse stage.
    pub stats: CleanStats,
    /// Feature width that entered the decomposer.
    pub feature_width: usize,
    /// Decomposition algorithm used.
    pub decomposer: String,
    /// Explained-variance ratios, when the decomposer reported them.
    pub explained_variance_ratio: Option<Vec<f64>>,
}
