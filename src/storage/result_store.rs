//! Per-job result persistence and the run error log
//!
//! Every job writes through one [`ResultStore`]. A single async mutex (the
//! write gate) serializes error-log appends and job file writes.

use chrono::Local;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::models::{ResultRow, ScrapeJob};
use crate::storage::csv_file;
use crate::utils::error::StorageError;

/// Shared sink for job outputs and failure records
pub struct ResultStore {
    gate: Mutex<()>,
    error_log: PathBuf,
}

impl ResultStore {
    /// Store appending failures to `error_log`
    pub fn new(error_log: impl Into<PathBuf>) -> Self {
        Self {
            gate: Mutex::new(()),
            error_log: error_log.into(),
        }
    }

    /// Store with a fresh timestamped log under `<log_dir>/<YYYY-MM-DD>/`
    pub fn for_run(log_dir: &Path) -> Self {
        let now = Local::now();
        let path = log_dir
            .join(now.format("%Y-%m-%d").to_string())
            .join(format!("scrape_errors_{}.log", now.format("%Y%m%d-%H%M%S")));
        Self::new(path)
    }

    pub fn error_log_path(&self) -> &Path {
        &self.error_log
    }

    /// Whether a job's output already exists and is non-empty
    pub async fn has_output(&self, job: &ScrapeJob) -> bool {
        tokio::fs::metadata(job.output_path())
            .await
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }

    /// Atomically write a job's rows to its output file
    pub async fn write_job(&self, job: &ScrapeJob, rows: &[ResultRow]) -> Result<PathBuf, StorageError> {
        let path = job.output_path();
        let bytes = csv_file::encode(rows)?;
        let temp = csv_file::temp_path(&path);

        let _guard = self.gate.lock().await;

        tokio::fs::create_dir_all(&job.output_dir)
            .await
            .map_err(|e| StorageError::io(&job.output_dir, e))?;
        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|e| StorageError::io(&temp, e))?;
        tokio::fs::rename(&temp, &path)
            .await
            .map_err(|e| StorageError::io(&path, e))?;

        Ok(path)
    }

    /// Record a job whose pagination was aborted by a fetch failure
    pub async fn log_fetch_failure(&self, job: &ScrapeJob, url: &str, error: &(dyn Display + Sync)) {
        let line = format!("FAILED: job={job} url={url} | {error}");
        self.append(&line).await;
    }

    /// Record a job that ended abnormally (panic or storage error)
    pub async fn log_uncaught(&self, job: &ScrapeJob, error: &(dyn Display + Sync)) {
        let line = format!("UNCAUGHT ERROR in job {job}: {error}");
        self.append(&line).await;
    }

    async fn append(&self, message: &str) {
        let line = format!("[{}] {message}\n", Local::now().format("%Y-%m-%d %H:%M:%S"));

        if let Err(e) = self.append_line(&line).await {
            tracing::error!(
                path = %self.error_log.display(),
                error = %e,
                "Failed to write error log"
            );
        }
    }

    async fn append_line(&self, line: &str) -> Result<(), StorageError> {
        let _guard = self.gate.lock().await;

        if let Some(parent) = self.error_log.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.error_log)
            .await
            .map_err(|e| StorageError::io(&self.error_log, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StorageError::io(&self.error_log, e))?;
        file.flush()
            .await
            .map_err(|e| StorageError::io(&self.error_log, e))?;

        Ok(())
    }
}
