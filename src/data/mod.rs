//! Session/interval data model, filesystem loading, and stage caching.
//!
//! This module provides:
//! - The load-time records (`Session`, `Interval`) and the labeled pipeline
//!   payloads (`TrainWindow`, `TestWindow`) that stages transform
//! - A directory-tree loader for raw per-interval `.dat` recordings
//! - JSON snapshot caching at stage boundaries

mod cache;
mod loader;
mod model;

pub use cache::{
    load_stage, save_stage, CacheError, PARSED_SNAPSHOT, PROCESSED_SNAPSHOT, RAW_SNAPSHOT,
};
pub use loader::{load_dataset, load_test, load_train, DataError};
pub use model::{
    Interval, ProcessedDataset, RawDataset, Session, TestWindow, TrainWindow, WindowDataset,
};
