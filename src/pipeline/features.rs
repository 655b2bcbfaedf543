//! Per-sample feature derivation.
//!
//! A stateless, order-preserving map from the 12 raw channels to the
//! engineered feature vector: Euclidean norms of the four sensor triads,
//! cross-limb norm differences, per-location energies, and the retained raw
//! accelerometer channels. Gyroscope raw channels are dropped; their signal
//! survives through the norms and energies.

use crate::config::FeatureMode;
use crate::constants::{
    CHEST_ACC, CHEST_GYRO, ENGINEERED_WIDTH, HAND_ACC, HAND_GYRO, RAW_CHANNELS, TRIAD,
};
use crate::types::Matrix;

/// Width of the feature vector produced under a given mode.
pub fn output_width(mode: FeatureMode) -> usize {
    match mode {
        FeatureMode::Engineered => ENGINEERED_WIDTH,
        FeatureMode::Raw => RAW_CHANNELS,
    }
}

/// Derive the engineered feature vector from one 12-channel sample.
///
/// Pure and deterministic: no fitted state, bit-identical output for
/// identical input.
///
/// # Panics
///
/// Panics if the sample is not exactly 12 channels wide.
pub fn extract(sample: &[f64]) -> Vec<f64> {
    assert_eq!(
        sample.len(),
        RAW_CHANNELS,
        "Feature extraction requires {} raw channels, got {}",
        RAW_CHANNELS,
        sample.len()
    );

    let hand_acc = triad_norm(sample, HAND_ACC);
    let hand_gyro = triad_norm(sample, HAND_GYRO);
    let chest_acc = triad_norm(sample, CHEST_ACC);
    let chest_gyro = triad_norm(sample, CHEST_GYRO);

    let mut features = Vec::with_capacity(ENGINEERED_WIDTH);
    features.extend([
        hand_acc,
        hand_gyro,
        chest_acc,
        chest_gyro,
        (hand_acc - chest_acc).abs(),
        (hand_gyro - chest_gyro).abs(),
        energy(&sample[HAND_ACC..HAND_ACC + 2 * TRIAD]),
        energy(&sample[CHEST_ACC..CHEST_ACC + 2 * TRIAD]),
    ]);
    features.extend_from_slice(&sample[HAND_ACC..HAND_ACC + TRIAD]);
    features.extend_from_slice(&sample[CHEST_ACC..CHEST_ACC + TRIAD]);

    debug_assert_eq!(features.len(), ENGINEERED_WIDTH);
    features
}

/// Apply feature derivation to every row of a window's matrix.
///
/// `Raw` mode is the identity: samples keep the full 12-channel width and
/// dimensionality reduction is deferred entirely to the decomposer.
pub fn extract_matrix(data: &Matrix, mode: FeatureMode) -> Matrix {
    match mode {
        FeatureMode::Raw => data.clone(),
        FeatureMode::Engineered => {
            let mut values = Vec::with_capacity(data.nrows() * ENGINEERED_WIDTH);
            for row in data.row_iter() {
                let sample: Vec<f64> = row.iter().copied().collect();
                values.extend(extract(&sample));
            }
            Matrix::from_row_iterator(data.nrows(), ENGINEERED_WIDTH, values)
        }
    }
}

/// Euclidean norm of a 3-axis triad starting at `offset`.
fn triad_norm(sample: &[f64], offset: usize) -> f64 {
    sample[offset..offset + TRIAD]
        .iter()
        .map(|v| v * v)
        .sum::<f64>()
        .sqrt()
}

/// Sum of absolute values over a channel range.
fn energy(channels: &[f64]) -> f64 {
    channels.iter().map(|v| v.abs()).sum()
}
