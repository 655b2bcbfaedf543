//! JSON snapshot caching at pipeline stage boundaries.
//!
//! One serialized blob per stage boundary, keyed by file path and never
//! partially updated. A consumer tolerates cache absence by recomputing
//! from the prior stage; a snapshot that exists but cannot be read or
//! decoded is an error, not a silent recompute.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// File name of the raw-dataset snapshot.
pub const RAW_SNAPSHOT: &str = "raw.json";

/// File name of the parsed-window snapshot.
pub const PARSED_SNAPSHOT: &str = "parsed.json";

/// File name of the processed-window snapshot.
pub const PROCESSED_SNAPSHOT: &str = "processed.json";

/// Errors from snapshot persistence.
#[derive(Debug)]
pub enum CacheError {
    /// Filesystem access failed.
    Io {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A snapshot exists but could not be encoded or decoded.
    Serde {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying serialization error.
        source: serde_json::Error,
    },
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Io { path, source } => {
                write!(f, "cache IO failure at {}: {}", path.display(), source)
            }
            CacheError::Serde { path, source } => {
                write!(f, "bad cache snapshot at {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io { source, .. } => Some(source),
            CacheError::Serde { source, .. } => Some(source),
        }
    }
}

/// Write a stage snapshot to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the file cannot be
/// written, or the value fails to serialize.
pub fn save_stage<T: Serialize>(value: &T, path: &Path) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| CacheError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
    }
    let file = fs::File::create(path).map_err(|err| CacheError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    serde_json::to_writer(io::BufWriter::new(file), value).map_err(|err| CacheError::Serde {
        path: path.to_path_buf(),
        source: err,
    })
}

/// Load a stage snapshot from `path`.
///
/// Returns `Ok(None)` when the snapshot does not exist; the caller
/// recomputes from the prior stage.
///
/// # Errors
///
/// Returns an error when a snapshot exists but cannot be read or decoded.
pub fn load_stage<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CacheError> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(CacheError::Io {
                path: path.to_path_buf(),
                source: err,
            })
        }
    };
    let value = serde_json::from_reader(io::BufReader::new(file)).map_err(|err| {
        CacheError::Serde {
            path: path.to_path_buf(),
            source: err,
        }
    })?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{TestWindow, TrainWindow, WindowDataset};
    use crate::types::Matrix;
    use tempfile::tempdir;

    #[test]
    fn test_missing_snapshot_is_none() {
        let dir = tempdir().unwrap();
        let loaded: Option<WindowDataset> =
            load_stage(&dir.path().join(PARSED_SNAPSHOT)).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(PARSED_SNAPSHOT);

        let dataset = WindowDataset {
            train: vec![TrainWindow {
                subject: 2,
                activity: Some(4),
                samples: Matrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            }],
            test: vec![TestWindow {
                id: "000001.dat".to_string(),
                samples: Matrix::zeros(1, 3),
            }],
            stats: Default::default(),
        };

        save_stage(&dataset, &path).unwrap();
        let loaded: WindowDataset = load_stage(&path).unwrap().unwrap();

        assert_eq!(loaded.train.len(), 1);
        assert_eq!(loaded.train[0].subject, 2);
        assert_eq!(loaded.train[0].samples[(1, 2)], 6.0);
        assert_eq!(loaded.test[0].id, "000001.dat");
    }

    #[test]
    fn test_corrupt_snapshot_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(RAW_SNAPSHOT);
        fs::write(&path, b"not json").unwrap();

        let loaded: Result<Option<WindowDataset>, CacheError> = load_stage(&path);
        assert!(matches!(loaded, Err(CacheError::Serde { .. })));
    }
}
