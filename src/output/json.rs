//! JSON serialization and prediction artifacts.
//!
//! Each run writes its distributions to a uniquely named artifact so
//! baseline and linear-model runs never overwrite each other, and repeated
//! runs keep their history.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::result::{Prediction, RunReport};

/// Serialize a run report to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize a run report to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_pretty(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// First free `base-NNNN.json` path next to `base`.
///
/// Counting up from 0 preserves every earlier artifact; the run that wrote
/// `linear-0003.json` can still be compared against `linear-0002.json`.
pub fn unique_artifact_path(base: &Path) -> PathBuf {
    let stem = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "predictions".to_string());
    let dir = base.parent().unwrap_or_else(|| Path::new("."));

    let mut counter = 0u32;
    loop {
        let candidate = dir.join(format!("{}-{:04}.json", stem, counter));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Write a run report to a uniquely named artifact under `base`'s parent.
///
/// `base` names the artifact family (for example `Predictions/linear`);
/// the written file appends a counter and the `.json` extension. Parent
/// directories are created as needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub fn write_predictions(report: &RunReport, base: &Path) -> Result<PathBuf, io::Error> {
    if let Some(parent) = base.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let path = unique_artifact_path(base);
    let file = fs::File::create(&path)?;
    serde_json::to_writer_pretty(io::BufWriter::new(file), report).map_err(io::Error::other)?;
    Ok(path)
}

/// Write bare prediction distributions to a uniquely named artifact.
///
/// Used for baseline runs, which carry no training metadata; the artifact
/// is a (windows x subjects) matrix of rows. Baseline and linear-model
/// runs use different bases, so their artifacts never collide.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub fn write_distributions(
    predictions: &[Prediction],
    base: &Path,
) -> Result<PathBuf, io::Error> {
    if let Some(parent) = base.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let rows: Vec<&[f64]> = predictions.iter().map(|p| p.distribution.as_slice()).collect();
    let path = unique_artifact_path(base);
    let file = fs::File::create(&path)?;
    serde_json::to_writer_pretty(io::BufWriter::new(file), &rows).map_err(io::Error::other)?;
    Ok(path)
}
