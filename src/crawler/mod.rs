//! Concurrent toplist scraping
//!
//! This module implements the scraping engine: job enumeration, page
//! fetching with retry/backoff, per-job pagination, and the [`Coordinator`]
//! that runs every job on a bounded worker pool.

pub mod fetcher;
pub mod job;
pub mod jobs;
pub mod url;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::crawler::fetcher::ToplistFetcher;
use crate::crawler::job::JobRunner;
use crate::error::ErrorClass;
use crate::models::{BatchSummary, JobOutcome, JobStatus, ScrapeJob};
use crate::storage::ResultStore;

/// Runs scrape jobs in parallel with failure isolation
pub struct Coordinator {
    /// Shared job executor
    runner: Arc<JobRunner>,

    /// Worker pool width
    workers: usize,
}

impl Coordinator {
    /// Create a coordinator over an existing runner
    pub fn new(runner: Arc<JobRunner>, workers: usize) -> Self {
        Self {
            runner,
            workers: workers.max(1),
        }
    }

    /// Build the fetcher, result store and runner for one run
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let fetcher = ToplistFetcher::new(config).context("Failed to create page fetcher")?;
        let store = Arc::new(ResultStore::for_run(&config.paths.log_dir));
        let runner = JobRunner::new(Arc::new(fetcher), store, config.page_pause())
            .skip_existing(config.scraper.skip_existing);

        Ok(Self::new(Arc::new(runner), config.scraper.workers))
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        self.runner.store()
    }

    /// Run every job to a terminal state
    ///
    /// Each job runs in its own task, so a panicking job is reported as
    /// failed without disturbing the others. Returns once all jobs finished.
    pub async fn run(&self, jobs: Vec<ScrapeJob>) -> (Vec<JobOutcome>, BatchSummary) {
        let started = Instant::now();
        let total = jobs.len();

        tracing::info!(jobs = total, workers = self.workers, "Starting scrape batch");

        let outcomes: Vec<JobOutcome> = stream::iter(jobs)
            .map(|job| self.run_isolated(job))
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let summary = BatchSummary::from_outcomes(&outcomes, started.elapsed());

        tracing::info!(
            total = summary.total_jobs,
            succeeded = summary.succeeded,
            partial = summary.partial,
            empty = summary.empty,
            skipped = summary.skipped,
            failed = summary.failed,
            rows = summary.total_rows,
            elapsed_secs = format!("{:.1}", summary.elapsed.as_secs_f64()),
            "Scrape batch complete"
        );

        (outcomes, summary)
    }

    async fn run_isolated(&self, job: ScrapeJob) -> JobOutcome {
        let runner = Arc::clone(&self.runner);
        let task_job = job.clone();
        let handle = tokio::spawn(async move { runner.run(&task_job).await });

        let status = match handle.await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                tracing::error!(
                    job = %job,
                    category = %e.category(),
                    recoverable = e.is_recoverable(),
                    error = %e,
                    "Job failed"
                );
                self.store().log_uncaught(&job, &e).await;
                JobStatus::Failed(e.to_string())
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(job = %job, error = %message, "Job task aborted");
                self.store().log_uncaught(&job, &message).await;
                JobStatus::Failed(message)
            }
        };

        tracing::debug!(job = %job, status = status.as_str(), "Job finished");

        JobOutcome { job, status }
    }
}
