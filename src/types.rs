//! Type aliases and common types.

/// Dynamically sized sample matrix (rows = samples, columns = channels or
/// features). Column width varies across pipeline stages but is identical
/// for every window within one stage.
pub type Matrix = nalgebra::DMatrix<f64>;

/// Dynamically sized column vector.
pub type Vector = nalgebra::DVector<f64>;

/// Subject identifier, 1..=NR_SUBJECTS.
pub type SubjectId = u8;
