//! Filesystem loading and stage caching over a temporary data tree.

use std::fs;
use std::path::Path;

use motion_oracle::data::{load_test, load_train, DataError};
use motion_oracle::MotionOracle;
use tempfile::tempdir;

/// One sample row of 12 whitespace-separated values.
fn row(values: [&str; 12]) -> String {
    values.join(" ") + "\n"
}

fn plain_row(seed: f64) -> String {
    let values: Vec<String> = (0..12).map(|c| format!("{:.3}", seed + c as f64)).collect();
    values.join(" ") + "\n"
}

/// Build a minimal two-subject data tree under `root`.
fn build_tree(root: &Path) {
    for (subject, session) in [(1, 1), (2, 1)] {
        let dir = root
            .join("Train")
            .join(format!("subject_{:02}", subject))
            .join(format!("session_{:02}_{:03}", subject, session));
        fs::create_dir_all(&dir).unwrap();

        for (i, name) in ["00000_000.dat", "00002_000.dat"].iter().enumerate() {
            let mut contents = String::new();
            for r in 0..6 {
                contents += &plain_row((subject * 10 + i) as f64 + r as f64 * 0.1);
            }
            fs::write(dir.join(name), contents).unwrap();
        }
    }
    fs::write(
        root.join("Train").join("activities.csv"),
        "session_id,activity\nsession_01_001,3\nsession_02_001,5\n",
    )
    .unwrap();

    let test_dir = root.join("Test");
    fs::create_dir_all(&test_dir).unwrap();
    let mut contents = String::new();
    for r in 0..4 {
        contents += &plain_row(11.0 + r as f64 * 0.1);
    }
    fs::write(test_dir.join("000001.dat"), contents).unwrap();
}

#[test]
fn loads_sessions_sorted_with_activities() {
    let dir = tempdir().unwrap();
    build_tree(dir.path());

    let sessions = load_train(&dir.path().join("Train")).unwrap();
    assert_eq!(sessions.len(), 2);

    let first = &sessions[0];
    assert_eq!(first.subject, 1);
    assert_eq!(first.number, 1);
    assert_eq!(first.activity.as_deref(), Some("3"));
    assert_eq!(first.intervals.len(), 2);
    assert_eq!(first.intervals[0].time, Some(0.0));
    assert_eq!(first.intervals[1].time, Some(2.0));
    assert_eq!(first.intervals[0].data.nrows(), 6);
    assert_eq!(first.intervals[0].data.ncols(), 12);
}

#[test]
fn loads_test_intervals_without_labels() {
    let dir = tempdir().unwrap();
    build_tree(dir.path());

    let intervals = load_test(&dir.path().join("Test")).unwrap();
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].id, "000001.dat");
    assert_eq!(intervals[0].time, None);
}

#[test]
fn accepts_inf_and_nan_tokens() {
    let dir = tempdir().unwrap();
    build_tree(dir.path());

    let bad = dir
        .path()
        .join("Train")
        .join("subject_01")
        .join("session_01_001")
        .join("00004_000.dat");
    fs::write(
        &bad,
        row(["1", "2", "inf", "4", "5", "6", "nan", "8", "9", "10", "11", "-inf"]),
    )
    .unwrap();

    let sessions = load_train(&dir.path().join("Train")).unwrap();
    let interval = &sessions[0].intervals[2];
    assert!(interval.data[(0, 2)].is_infinite());
    assert!(interval.data[(0, 6)].is_nan());
}

#[test]
fn rejects_short_rows() {
    let dir = tempdir().unwrap();
    build_tree(dir.path());

    let bad = dir.path().join("Test").join("000002.dat");
    fs::write(&bad, "1 2 3\n").unwrap();

    let result = load_test(&dir.path().join("Test"));
    assert!(matches!(result, Err(DataError::Malformed { line: 1, .. })));
}

#[test]
fn run_from_dir_uses_cache_on_second_run() {
    let dir = tempdir().unwrap();
    build_tree(dir.path());
    let cache = dir.path().join("cache");

    let first = MotionOracle::new()
        .n_components(3)
        .cache_dir(&cache)
        .run_from_dir(dir.path())
        .unwrap();
    assert_eq!(first.predictions.len(), 1);
    assert!(cache.join("raw.json").exists());
    assert!(cache.join("parsed.json").exists());
    assert!(cache.join("processed.json").exists());

    // Remove the raw data entirely: the second run must come from the
    // parsed snapshot alone.
    fs::remove_dir_all(dir.path().join("Train")).unwrap();
    fs::remove_dir_all(dir.path().join("Test")).unwrap();

    let second = MotionOracle::new()
        .n_components(3)
        .cache_dir(&cache)
        .run_from_dir(dir.path())
        .unwrap();
    assert_eq!(second.predictions.len(), 1);
    assert_eq!(
        second.metadata.train_windows,
        first.metadata.train_windows
    );
}

#[test]
fn run_from_dir_without_cache_recomputes() {
    let dir = tempdir().unwrap();
    build_tree(dir.path());

    let report = MotionOracle::new()
        .n_components(3)
        .run_from_dir(dir.path())
        .unwrap();
    assert_eq!(report.predictions.len(), 1);
    // Four training windows: two intervals per session, two sessions.
    assert_eq!(report.metadata.train_windows, 4);
}
