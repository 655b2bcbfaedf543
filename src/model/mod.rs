//! Classifier training, validation, aggregation, and baselines.
//!
//! This module implements the supervised tail of the pipeline:
//!
//! 1. **Ridge classification** ([`ridge`]): one-vs-rest regularized linear
//!    model with internal regularization selection
//! 2. **Diagnostic validation** ([`validation`]): contiguous k-fold scores
//! 3. **Aggregation** ([`aggregate`]): per-sample votes to per-window
//!    distributions
//! 4. **Baselines** ([`baseline`]): uniform and average reference points

mod aggregate;
mod baseline;
mod ridge;
mod validation;

pub use aggregate::{aggregate, aggregate_all, SubjectClassifier};
pub use baseline::{average, average_predictions, uniform, uniform_predictions};
pub use ridge::{build_sets, RidgeClassifier};
pub use validation::{fold_boundaries, k_fold_cv};
