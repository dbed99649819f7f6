//! Flat-file persistence
//!
//! Per-job CSVs and the run error log go through [`ResultStore`]; the
//! pipeline stages read and write CSVs with [`csv_file`].

pub mod csv_file;
pub mod result_store;

pub use result_store::ResultStore;
