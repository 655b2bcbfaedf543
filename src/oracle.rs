//! Main `MotionOracle` entry point and builder.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{Config, DecomposerKind, FeatureMode};
use crate::data::{
    load_dataset, load_stage, save_stage, CacheError, DataError, Interval, ProcessedDataset,
    RawDataset, Session, TestWindow, TrainWindow, WindowDataset, PARSED_SNAPSHOT,
    PROCESSED_SNAPSHOT, RAW_SNAPSHOT,
};
use crate::model::{aggregate_all, build_sets, k_fold_cv, RidgeClassifier};
use crate::pipeline::{
    extract_matrix, impute, parse_test, parse_train, CleanStats, Decomposer, StandardScaler,
};
use crate::result::{Metadata, RunReport};
use crate::types::Matrix;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Main entry point for subject identification.
///
/// Use the builder pattern to configure and run the batch pipeline.
///
/// # Example
///
/// ```ignore
/// use motion_oracle::MotionOracle;
///
/// let report = MotionOracle::new()
///     .n_components(8)
///     .diagnostic_folds(5)
///     .run(train_sessions, test_intervals);
///
/// for prediction in &report.predictions {
///     println!("top subject: {}", prediction.top_subject());
/// }
/// ```
///
/// # Stage order
///
/// Stages run strictly in dependency order on the full dataset; the
/// decomposer, scaler and classifier require the complete pooled training
/// matrix before fitting, and every fitted transform is constructed fresh
/// per run. A failed stage aborts the run; a partially fit pipeline
/// produces meaningless downstream numbers.
#[derive(Debug, Clone, Default)]
pub struct MotionOracle {
    config: Config,
}

/// Failure reasons from the filesystem-backed entry point.
#[derive(Debug)]
pub enum RunError {
    /// Loading or parsing raw recordings failed.
    Data(DataError),
    /// A cache snapshot exists but could not be used.
    Cache(CacheError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Data(err) => write!(f, "{}", err),
            RunError::Cache(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Data(err) => Some(err),
            RunError::Cache(err) => Some(err),
        }
    }
}

impl From<DataError> for RunError {
    fn from(err: DataError) -> Self {
        RunError::Data(err)
    }
}

impl From<CacheError> for RunError {
    fn from(err: CacheError) -> Self {
        RunError::Cache(err)
    }
}

impl MotionOracle {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the number of candidate subjects.
    pub fn nr_subjects(mut self, n: usize) -> Self {
        self.config.nr_subjects = n;
        self
    }

    /// Set the feature derivation mode.
    pub fn feature_mode(mut self, mode: FeatureMode) -> Self {
        self.config.feature_mode = mode;
        self
    }

    /// Set the dimensionality-reduction algorithm.
    pub fn decomposer(mut self, kind: DecomposerKind) -> Self {
        self.config.decomposer = kind;
        self
    }

    /// Set the decomposer output components.
    pub fn n_components(mut self, n: usize) -> Self {
        self.config.n_components = n;
        self
    }

    /// Set the regularization grid searched at fit time.
    pub fn alphas(mut self, alphas: Vec<f64>) -> Self {
        self.config.alphas = alphas;
        self
    }

    /// Set the internal folds for regularization selection.
    pub fn cv_folds(mut self, folds: usize) -> Self {
        self.config.cv_folds = folds;
        self
    }

    /// Request the diagnostic k-fold cross-validation with this k.
    pub fn diagnostic_folds(mut self, k: usize) -> Self {
        self.config.diagnostic_folds = Some(k);
        self
    }

    /// Enable or disable training overlap removal.
    pub fn remove_overlap(mut self, yes: bool) -> Self {
        self.config.remove_overlap = yes;
        self
    }

    /// Set a deterministic seed for the stochastic steps.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the stage snapshot directory.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = Some(dir.into());
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline on in-memory raw recordings.
    pub fn run(self, train: Vec<Session>, test: Vec<Interval>) -> RunReport {
        let start_time = Instant::now();

        // Step 1: parse and clean both partitions. Training uses the
        // discard policy, test the repair policy.
        let mut stats = CleanStats::default();
        let train_windows = parse_train(&train, self.config.remove_overlap, &mut stats);
        let test_windows = parse_test(&test, &mut stats);

        let processed = self.process(train_windows, test_windows, stats);
        self.classify(processed, start_time)
    }

    /// Run the full pipeline from a data directory, honoring stage
    /// snapshots when a cache directory is configured.
    ///
    /// # Errors
    ///
    /// Returns an error on filesystem failures, malformed recordings, or a
    /// cache snapshot that exists but cannot be decoded. A merely absent
    /// snapshot is recomputed from the prior stage.
    pub fn run_from_dir(self, root: &Path) -> Result<RunReport, RunError> {
        let start_time = Instant::now();
        let cache_dir = self.config.cache_dir.clone();

        let processed = match &cache_dir {
            Some(dir) => load_stage::<ProcessedDataset>(&dir.join(PROCESSED_SNAPSHOT))?,
            None => None,
        };
        let processed = match processed {
            Some(processed) => processed,
            None => {
                let parsed = match &cache_dir {
                    Some(dir) => load_stage::<WindowDataset>(&dir.join(PARSED_SNAPSHOT))?,
                    None => None,
                };
                let parsed = match parsed {
                    Some(parsed) => parsed,
                    None => {
                        let raw = match &cache_dir {
                            Some(dir) => load_stage::<RawDataset>(&dir.join(RAW_SNAPSHOT))?,
                            None => None,
                        };
                        let raw = match raw {
                            Some(raw) => raw,
                            None => {
                                let raw = load_dataset(root)?;
                                if let Some(dir) = &cache_dir {
                                    save_stage(&raw, &dir.join(RAW_SNAPSHOT))?;
                                }
                                raw
                            }
                        };

                        let mut stats = CleanStats::default();
                        let train =
                            parse_train(&raw.train, self.config.remove_overlap, &mut stats);
                        let test = parse_test(&raw.test, &mut stats);
                        let parsed = WindowDataset { train, test, stats };
                        if let Some(dir) = &cache_dir {
                            save_stage(&parsed, &dir.join(PARSED_SNAPSHOT))?;
                        }
                        parsed
                    }
                };

                let processed = self.process(parsed.train, parsed.test, parsed.stats);
                if let Some(dir) = &cache_dir {
                    save_stage(&processed, &dir.join(PROCESSED_SNAPSHOT))?;
                }
                processed
            }
        };

        Ok(self.classify(processed, start_time))
    }

    /// Run the sample-level transformation stages on parsed windows.
    fn process(
        &self,
        train_windows: Vec<TrainWindow>,
        test_windows: Vec<TestWindow>,
        stats: CleanStats,
    ) -> ProcessedDataset {
        let config = &self.config;

        // Step 2: derive features. Stateless per-sample map, safe to fan
        // out per window.
        let mode = config.feature_mode;
        let train_windows = map_train(train_windows, |m| extract_matrix(m, mode));
        let test_windows = map_test(test_windows, |m| extract_matrix(m, mode));

        // Step 3: impute per window, using only that window's column
        // statistics.
        let train_windows = map_train(train_windows, impute);
        let test_windows = map_test(test_windows, impute);

        // Step 4: fit the decomposer once on the pooled training samples,
        // then apply the single fitted projection everywhere.
        let pooled = pool(&train_windows);
        let feature_width = pooled.ncols();
        let mut decomposer = Decomposer::from_config(config);
        decomposer.fit(&pooled);
        let explained_variance_ratio = decomposer.explained_variance_ratio();

        let train_windows = map_train(train_windows, |m| decomposer.transform(m));
        let test_windows = map_test(test_windows, |m| decomposer.transform(m));

        // Step 5: same discipline for the scaler, on the decomposed pool.
        let pooled = pool(&train_windows);
        let mut scaler = StandardScaler::new();
        scaler.fit(&pooled);

        let train_windows = map_train(train_windows, |m| scaler.transform(m));
        let test_windows = map_test(test_windows, |m| scaler.transform(m));

        ProcessedDataset {
            train: train_windows,
            test: test_windows,
            stats,
            feature_width,
            decomposer: decomposer.kind_name().to_string(),
            explained_variance_ratio,
        }
    }

    /// Fit the classifier on processed windows and aggregate predictions.
    fn classify(self, processed: ProcessedDataset, start_time: Instant) -> RunReport {
        let config = &self.config;
        let ProcessedDataset {
            train: train_windows,
            test: test_windows,
            stats,
            feature_width,
            decomposer,
            explained_variance_ratio,
        } = processed;

        // Step 6: flatten to (sample, label) pairs and fit the classifier.
        let (dataset, subjects) = build_sets(&train_windows);
        let mut classifier = RidgeClassifier::new()
            .with_alphas(config.alphas.clone())
            .with_cv_folds(config.cv_folds)
            .with_seed(config.effective_seed());
        classifier.fit(&dataset, &subjects);

        let train_accuracy = classifier.score(&dataset, &subjects);
        eprintln!(
            "[motion-oracle] accuracy on full training set: {:.2} %",
            train_accuracy * 100.0
        );

        // Step 7: optional diagnostic cross-validation. Reported only.
        let cross_validation = config
            .diagnostic_folds
            .map(|k| k_fold_cv(&classifier, &dataset, &subjects, k));

        // Step 8: aggregate per-sample votes into per-window distributions.
        let predictions = aggregate_all(&classifier, &test_windows, config.nr_subjects);

        RunReport {
            predictions,
            train_accuracy,
            chosen_alpha: classifier
                .chosen_alpha()
                .expect("Classifier records its alpha at fit time"),
            cross_validation,
            metadata: Metadata {
                train_windows: train_windows.len(),
                test_windows: test_windows.len(),
                train_samples: dataset.nrows(),
                feature_width,
                n_components: config.n_components,
                decomposer,
                dropped_samples: stats.dropped,
                repaired_samples: stats.repaired,
                explained_variance_ratio,
                runtime_secs: start_time.elapsed().as_secs_f64(),
            },
        }
    }
}

/// Stack every training window's samples into one pooled matrix,
/// flattening session boundaries.
///
/// # Panics
///
/// Panics if the pool would be empty or widths disagree; no projection or
/// scaling can be derived from nothing.
fn pool(windows: &[TrainWindow]) -> Matrix {
    let width = windows
        .iter()
        .find(|w| w.samples.nrows() > 0)
        .map(|w| w.samples.ncols());
    let width = width.expect("Cannot fit the pipeline on an empty pooled training matrix");

    let mut values: Vec<f64> = Vec::new();
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
            rows += 1;
        }
    }
    Matrix::from_row_iterator(rows, width, values)
}

/// Replace every training window's samples through a read-only map.
fn map_train<F>(windows: Vec<TrainWindow>, f: F) -> Vec<TrainWindow>
where
    F: Fn(&Matrix) -> Matrix + Sync,
{
    #[cfg(feature = "parallel")]
    {
        windows
            .par_iter()
            .map(|w| w.with_samples(f(&w.samples)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        windows
            .iter()
            .map(|w| w.with_samples(f(&w.samples)))
            .collect()
    }
}

/// Replace every test window's samples through a read-only map.
fn map_test<F>(windows: Vec<TestWindow>, f: F) -> Vec<TestWindow>
where
    F: Fn(&Matrix) -> Matrix + Sync,
{
    #[cfg(feature = "parallel")]
    {
        windows
            .par_iter()
            .map(|w| w.with_samples(f(&w.samples)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        windows
            .iter()
            .map(|w| w.with_samples(f(&w.samples)))
            .collect()
    }
}
