//! Normalization and ranking pipeline
//!
//! Runs after scraping: [`combine`] turns per-job files into ranked
//! per-discipline files, [`split`] merges those into one dataset and
//! partitions it. [`mark`] and [`discipline`] hold the pure helpers both
//! stages rely on.

pub mod combine;
pub mod discipline;
pub mod mark;
pub mod split;

pub use combine::{combine_all, CombineSummary};
pub use discipline::normalize_discipline;
pub use mark::parse_mark;
pub use split::{merge_combined, split_dataset, SplitSummary};
