//! Sample-level transformation stages.
//!
//! Stages run strictly in dependency order on the full dataset:
//!
//! 1. **Parse/clean** ([`clean`]): non-finite readings collapse to NaN,
//!    then training samples are discarded and test samples repaired;
//!    training overlap is removed.
//! 2. **Feature derivation** ([`features`]): stateless per-sample map.
//! 3. **Imputation** ([`impute`]): per-window column means, fused
//!    fit-and-apply.
//! 4. **Decomposition** ([`decompose`]): fit once on pooled training
//!    samples, applied everywhere.
//! 5. **Scaling** ([`scale`]): same fit-once/apply-everywhere discipline.

mod clean;
mod decompose;
mod features;
mod impute;
mod scale;

pub use clean::{clean_matrix, clean_sample, normalize_value, remove_overlap, CleanStats};
pub use decompose::{Decomposer, FastIca, TruncatedSvd};
pub use features::{extract, extract_matrix, output_width};
pub use impute::impute;
pub use scale::StandardScaler;

use crate::data::{Interval, Session, TestWindow, TrainWindow};

/// Parse raw training sessions into labeled windows.
///
/// For every interval: overlap removal (skipping each session's first
/// interval, which shares no samples with a predecessor), then cleaning
/// under the discard policy. Windows that lose all their samples are kept;
/// they simply contribute nothing to the pooled training matrix.
pub fn parse_train(
    sessions: &[Session],
    remove_session_overlap: bool,
    stats: &mut CleanStats,
) -> Vec<TrainWindow> {
    let mut windows = Vec::new();
    for session in sessions {
        let activity = session
            .activity
            .as_deref()
            .and_then(|a| a.trim().parse().ok());
        for (idx, interval) in session.intervals.iter().enumerate() {
            let data = if remove_session_overlap && idx > 0 {
                remove_overlap(&interval.data)
            } else {
                interval.data.clone()
            };
            windows.push(TrainWindow {
                subject: session.subject,
                activity,
                samples: clean_matrix(&data, false, stats),
            });
        }
    }
    windows
}

/// Parse raw test intervals into unlabeled windows.
///
/// Cleaning runs under the repair policy: every input row yields exactly
/// one output row, so each window stays aligned with its prediction.
pub fn parse_test(intervals: &[Interval], stats: &mut CleanStats) -> Vec<TestWindow> {
    intervals
        .iter()
        .map(|interval| TestWindow {
            id: interval.id.clone(),
            samples: clean_matrix(&interval.data, true, stats),
        })
        .collect()
}
