//! toplists - Athletics all-time toplist scraper and ranking pipeline
//!
//! Scrapes every all-time toplist of a public results site concurrently,
//! then normalizes the per-event exports into ranked, partitioned datasets.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Job enumeration, page fetching and the concurrent coordinator
//! - [`parser`] - Records-table extraction from result pages
//! - [`models`] - Core data structures and types
//! - [`storage`] - Atomic CSV output and the run error log
//! - [`pipeline`] - Mark parsing, discipline normalization, combine and split
//! - [`utils`] - Retry policy, domain errors and helpers
//!
//! # Example
//!
//! ```no_run
//! use toplists::config::Config;
//! use toplists::crawler::jobs::{enumerate_jobs, DisciplineMapping};
//! use toplists::crawler::Coordinator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let mapping = DisciplineMapping::from_file(&config.paths.options_file)?;
//!     let jobs = enumerate_jobs(&mapping, &config.paths.scrape_root);
//!
//!     let coordinator = Coordinator::from_config(&config)?;
//!     let (_, summary) = coordinator.run(jobs).await;
//!     println!("{} rows scraped", summary.total_rows);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::fetcher::{PageSource, ToplistFetcher};
    pub use crate::crawler::job::JobRunner;
    pub use crate::crawler::Coordinator;
    pub use crate::error::{Error, ErrorCategory, ErrorClass, Result};
    pub use crate::models::{
        BatchSummary, JobOutcome, JobStatus, NormalizedRecord, PageResult, ResultRow, ScrapeJob,
    };
    pub use crate::storage::ResultStore;
    pub use crate::utils::retry::RetryPolicy;
}

// Direct re-exports for convenience
pub use models::{NormalizedRecord, ResultRow, ScrapeJob};
