//! HTML parsing and data extraction
//!
//! This module handles parsing toplist result pages into [`ResultRow`]s.
//!
//! [`ResultRow`]: crate::models::ResultRow

pub mod selectors;
pub mod table;

pub use selectors::RecordsTableSelectors;
pub use table::RecordsTableParser;
