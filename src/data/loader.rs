//! Filesystem sensor store: parses raw per-interval recordings.
//!
//! Expected layout under a data root:
//!
//! ```text
//! <root>/Train/subject_03/session_03_001/00012_500.dat
//! <root>/Train/activities.csv
//! <root>/Test/000123.dat
//! ```
//!
//! Each `.dat` file holds one sample per line: 12 whitespace-separated
//! floats. `inf` and `nan` tokens are accepted and kept as parsed; the
//! clean stage later collapses every non-finite value to the NaN sentinel.
//! Interval files sort by name, which equals sorting by start time.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::RAW_CHANNELS;
use crate::data::model::{Interval, RawDataset, Session};
use crate::types::Matrix;

/// Train subdirectory name under the data root.
pub const TRAIN_DIR: &str = "Train";

/// Test subdirectory name under the data root.
pub const TEST_DIR: &str = "Test";

/// Session-to-activity mapping file at the train root.
pub const ACTIVITIES_FILE: &str = "activities.csv";

/// Errors from loading and parsing raw recordings.
#[derive(Debug)]
pub enum DataError {
    /// Filesystem access failed.
    Io {
        /// Path we attempted to access.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A data file had an unparseable row.
    Malformed {
        /// File containing the bad row.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the row.
        reason: String,
    },
    /// A folder or file name did not match the expected template.
    BadName {
        /// The offending path.
        path: PathBuf,
        /// Why the name could not be parsed.
        reason: String,
    },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            DataError::Malformed { path, line, reason } => {
                write!(f, "{}:{}: {}", path.display(), line, reason)
            }
            DataError::BadName { path, reason } => {
                write!(f, "unexpected name {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Load both partitions from a data root.
///
/// # Errors
///
/// Returns an error if either partition fails to load.
pub fn load_dataset(root: &Path) -> Result<RawDataset, DataError> {
    let train = load_train(&root.join(TRAIN_DIR))?;
    let test = load_test(&root.join(TEST_DIR))?;
    Ok(RawDataset { train, test })
}

/// Load and parse every training session under a train folder.
///
/// Sessions come back in folder-name order; each session's intervals are
/// sorted by file name (equivalently, by start time).
///
/// # Errors
///
/// Returns an error on filesystem failures, malformed data rows, or folder
/// names that do not encode a subject/session number.
pub fn load_train(train_dir: &Path) -> Result<Vec<Session>, DataError> {
    let activities = load_activities(train_dir)?;

    let mut session_dirs = Vec::new();
    for subject_dir in read_dir_sorted(train_dir)? {
        if !subject_dir.is_dir() || !name_starts_with(&subject_dir, "subject_") {
            continue;
        }
        for session_dir in read_dir_sorted(&subject_dir)? {
            if session_dir.is_dir() && name_starts_with(&session_dir, "session_") {
                session_dirs.push(session_dir);
            }
        }
    }

    let mut sessions = Vec::with_capacity(session_dirs.len());
    for dir in session_dirs {
        sessions.push(load_session(&dir, &activities)?);
    }
    Ok(sessions)
}

/// Load every standalone test interval under a test folder, sorted by id.
///
/// Test intervals carry no start time and no session association.
///
/// # Errors
///
/// Returns an error on filesystem failures or malformed data rows.
pub fn load_test(test_dir: &Path) -> Result<Vec<Interval>, DataError> {
    let mut intervals = Vec::new();
    for path in read_dir_sorted(test_dir)? {
        if path.extension().and_then(|e| e.to_str()) != Some("dat") {
            continue;
        }
        let data = read_dat(&path)?;
        intervals.push(Interval {
            id: file_name(&path),
            time: None,
            data,
        });
    }
    Ok(intervals)
}

/// Load the activities mapping. A missing file yields an empty map so
/// train data can be loaded without activity labels.
fn load_activities(train_dir: &Path) -> Result<HashMap<String, String>, DataError> {
    let path = train_dir.join(ACTIVITIES_FILE);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(err) => return Err(DataError::Io { path, source: err }),
    };

    let mut map = HashMap::new();
    // The first row is the header and is discarded.
    for (idx, row) in contents.lines().enumerate().skip(1) {
        let row = row.trim();
        if row.is_empty() {
            continue;
        }
        let Some((session_id, activity)) = row.split_once(',') else {
            return Err(DataError::Malformed {
                path,
                line: idx + 1,
                reason: "expected `session_id,activity`".to_string(),
            });
        };
        map.insert(session_id.trim().to_string(), activity.trim().to_string());
    }
    Ok(map)
}

/// Load all data for one session folder.
fn load_session(
    session_dir: &Path,
    activities: &HashMap<String, String>,
) -> Result<Session, DataError> {
    let id = file_name(session_dir);
    let (subject, number) = parse_session_id(&id).ok_or_else(|| DataError::BadName {
        path: session_dir.to_path_buf(),
        reason: "expected session_<subject>_<number>".to_string(),
    })?;

    let mut intervals = Vec::new();
    for path in read_dir_sorted(session_dir)? {
        if path.extension().and_then(|e| e.to_str()) != Some("dat") {
            continue;
        }
        let interval_id = file_name(&path);
        let time = parse_interval_time(&interval_id).ok_or_else(|| DataError::BadName {
            path: path.clone(),
            reason: "expected <seconds>_<millis>.dat".to_string(),
        })?;
        let data = read_dat(&path)?;
        intervals.push(Interval {
            id: interval_id,
            time: Some(time),
            data,
        });
    }

    Ok(Session {
        activity: activities.get(&id).cloned(),
        id,
        number,
        subject,
        intervals,
    })
}

/// Parse `session_<subject>_<number>` into its numeric parts.
fn parse_session_id(id: &str) -> Option<(u8, u32)> {
    let mut parts = id.split('_');
    if parts.next()? != "session" {
        return None;
    }
    let subject = parts.next()?.parse().ok()?;
    let number = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((subject, number))
}

/// Parse an interval file name (`00012_500.dat`) into its start time (12.5).
fn parse_interval_time(id: &str) -> Option<f64> {
    let stem = id.strip_suffix(".dat")?;
    stem.replace('_', ".").parse().ok()
}

/// Read a `.dat` file into a rows x RAW_CHANNELS matrix.
///
/// Rust's float parser accepts `inf`, `-inf` and `nan` tokens, which this
/// format uses for corrupted readings; they pass through unchanged here.
fn read_dat(path: &Path) -> Result<Matrix, DataError> {
    let contents = fs::read_to_string(path).map_err(|err| DataError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;

    let mut values: Vec<f64> = Vec::new();
    let mut rows = 0;
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let start = values.len();
        for token in line.split_whitespace() {
            let value = token.parse::<f64>().map_err(|_| DataError::Malformed {
                path: path.to_path_buf(),
                line: idx + 1,
                reason: format!("unparseable value `{}`", token),
            })?;
            values.push(value);
        }
        if values.len() - start != RAW_CHANNELS {
            return Err(DataError::Malformed {
                path: path.to_path_buf(),
                line: idx + 1,
                reason: format!(
                    "expected {} channels, found {}",
                    RAW_CHANNELS,
                    values.len() - start
                ),
            });
        }
        rows += 1;
    }

    Ok(Matrix::from_row_iterator(rows, RAW_CHANNELS, values))
}

/// Directory entries sorted by file name for deterministic ordering.
fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, DataError> {
    let entries = fs::read_dir(dir).map_err(|err| DataError::Io {
        path: dir.to_path_buf(),
        source: err,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| DataError::Io {
            path: dir.to_path_buf(),
            source: err,
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn name_starts_with(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(prefix))
}
