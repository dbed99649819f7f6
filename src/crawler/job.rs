//! Single scrape job execution
//!
//! A job walks its toplist page by page until the results table runs out,
//! then persists what it collected:
//!
//! ```text
//! Fetching(1) --rows--> Fetching(2) --rows--> ... --end--> Done(rows)
//!      |                    |
//!      +-------fetch failure+-------------------------> Aborted(rows so far)
//! ```
//!
//! Aborted jobs with at least one row still write those rows. Jobs that end
//! with no rows write nothing, so the absence of a file means the toplist was
//! not (successfully) scraped.

use std::sync::Arc;
use std::time::Duration;

use crate::crawler::fetcher::PageSource;
use crate::models::{JobStatus, PageResult, ResultRow, ScrapeJob};
use crate::storage::ResultStore;
use crate::utils::error::{FetchError, ScrapeError};

/// Where pagination stopped
enum Stop {
    Done,
    Aborted(FetchError),
}

/// Drives the pagination loop of a job and persists its rows
pub struct JobRunner {
    source: Arc<dyn PageSource>,
    store: Arc<ResultStore>,
    page_pause: Duration,
    skip_existing: bool,
}

impl JobRunner {
    pub fn new(source: Arc<dyn PageSource>, store: Arc<ResultStore>, page_pause: Duration) -> Self {
        Self {
            source,
            store,
            page_pause,
            skip_existing: false,
        }
    }

    /// Skip jobs whose output file already exists and is non-empty
    #[must_use]
    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    /// Run one job to a terminal state
    ///
    /// Fetch failures are recorded in the error log and reflected in the
    /// returned status.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::Storage` if collected rows could not be written
    pub async fn run(&self, job: &ScrapeJob) -> Result<JobStatus, ScrapeError> {
        if self.skip_existing && self.store.has_output(job).await {
            tracing::debug!(job = %job, "Output exists, skipping");
            return Ok(JobStatus::Skipped);
        }

        let (rows, stop) = self.paginate(job).await;

        match (rows.is_empty(), stop) {
            (true, Stop::Done) => {
                tracing::info!(job = %job, "No results found");
                Ok(JobStatus::Empty)
            }
            (true, Stop::Aborted(e)) => Ok(JobStatus::Failed(e.to_string())),
            (false, stop) => {
                let path = self.store.write_job(job, &rows).await?;
                tracing::info!(
                    job = %job,
                    rows = rows.len(),
                    path = %path.display(),
                    "Saved toplist"
                );

                Ok(match stop {
                    Stop::Done => JobStatus::Success(rows.len()),
                    Stop::Aborted(e) => JobStatus::Partial {
                        rows: rows.len(),
                        error: e.to_string(),
                    },
                })
            }
        }
    }

    /// Fetch pages strictly in order, accumulating rows
    async fn paginate(&self, job: &ScrapeJob) -> (Vec<ResultRow>, Stop) {
        let mut rows = Vec::new();
        let mut page = 1;

        loop {
            tracing::debug!(job = %job, page, "Fetching page");

            match self.source.fetch_page(job, page).await {
                Ok(PageResult::Rows(page_rows)) => {
                    tracing::debug!(
                        job = %job,
                        page,
                        rows = page_rows.len(),
                        total = rows.len() + page_rows.len(),
                        "Processed page"
                    );
                    rows.extend(page_rows);
                    page += 1;
                    tokio::time::sleep(self.page_pause).await;
                }
                Ok(PageResult::End) => {
                    tracing::debug!(job = %job, page, "No more pages");
                    return (rows, Stop::Done);
                }
                Err(e) => {
                    let url = self.source.page_url(job, page);
                    tracing::warn!(
                        job = %job,
                        page,
                        url = %url,
                        error = %e,
                        collected = rows.len(),
                        "Page fetch failed, stopping pagination"
                    );
                    self.store.log_fetch_failure(job, &url, &e).await;
                    return (rows, Stop::Aborted(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted page source: one entry per page, `None` = fetch failure
    struct ScriptedSource {
        pages: Vec<Option<PageResult>>,
        requested: Mutex<Vec<u32>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Option<PageResult>>) -> Self {
            Self {
                pages,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        fn page_url(&self, job: &ScrapeJob, page: u32) -> String {
            format!("http://scripted/{job}?page={page}")
        }

        async fn fetch_page(&self, _job: &ScrapeJob, page: u32) -> Result<PageResult, FetchError> {
            self.requested.lock().unwrap().push(page);
            match self.pages.get(page as usize - 1) {
                Some(Some(result)) => Ok(result.clone()),
                Some(None) => Err(FetchError::RetriesExhausted {
                    attempts: 5,
                    last: Box::new(FetchError::Status(503)),
                }),
                None => Ok(PageResult::End),
            }
        }
    }

    fn rows(marks: &[&str]) -> PageResult {
        PageResult::Rows(
            marks
                .iter()
                .map(|m| ResultRow {
                    mark: m.to_string(),
                    ..Default::default()
                })
                .collect(),
        )
    }

    fn setup(
        dir: &std::path::Path,
        pages: Vec<Option<PageResult>>,
    ) -> (Arc<ScriptedSource>, JobRunner, ScrapeJob) {
        let source = Arc::new(ScriptedSource::new(pages));
        let store = Arc::new(ResultStore::new(dir.join("errors.log")));
        let runner = JobRunner::new(source.clone(), store, Duration::ZERO);
        let job = ScrapeJob::new("men", "senior", "400-metres", "sprints", dir.join("men"));
        (source, runner, job)
    }

    #[test]
    fn test_run_future_is_send() {
        fn assert_send<T: Send>(_: T) {}

        let dir = tempfile::tempdir().unwrap();
        let (_, runner, job) = setup(dir.path(), vec![Some(PageResult::End)]);
        assert_send(runner.run(&job));
    }

    #[tokio::test]
    async fn test_pages_until_end() {
        let dir = tempfile::tempdir().unwrap();
        let (source, runner, job) = setup(
            dir.path(),
            vec![
                Some(rows(&["43.03", "43.18"])),
                Some(rows(&["43.29"])),
                Some(PageResult::End),
            ],
        );

        let status = runner.run(&job).await.unwrap();
        assert_eq!(status, JobStatus::Success(3));
        assert_eq!(*source.requested.lock().unwrap(), vec![1, 2, 3]);

        let written: Vec<ResultRow> =
            crate::storage::csv_file::read_records(&job.output_path()).unwrap();
        let marks: Vec<&str> = written.iter().map(|r| r.mark.as_str()).collect();
        assert_eq!(marks, vec!["43.03", "43.18", "43.29"]);
    }

    #[tokio::test]
    async fn test_empty_toplist_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (_, runner, job) = setup(dir.path(), vec![Some(PageResult::End)]);

        assert_eq!(runner.run(&job).await.unwrap(), JobStatus::Empty);
        assert!(!job.output_path().exists());
    }

    #[tokio::test]
    async fn test_failure_keeps_partial_rows() {
        let dir = tempfile::tempdir().unwrap();
        let (source, runner, job) = setup(dir.path(), vec![Some(rows(&["44.10"])), None]);

        let status = runner.run(&job).await.unwrap();
        assert!(matches!(status, JobStatus::Partial { rows: 1, .. }));
        assert_eq!(*source.requested.lock().unwrap(), vec![1, 2]);
        assert!(job.output_path().exists());

        let log = std::fs::read_to_string(dir.path().join("errors.log")).unwrap();
        assert!(log.contains("FAILED: job=men/senior/sprints/400-metres"));
        assert!(log.contains("page=2"));
    }

    #[tokio::test]
    async fn test_failure_without_rows_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (_, runner, job) = setup(dir.path(), vec![None]);

        let status = runner.run(&job).await.unwrap();
        assert!(matches!(status, JobStatus::Failed(_)));
        assert!(!job.output_path().exists());
    }

    #[tokio::test]
    async fn test_skip_existing() {
        let dir = tempfile::tempdir().unwrap();
        let (source, runner, job) = setup(dir.path(), vec![Some(rows(&["45.00"]))]);
        let runner = runner.skip_existing(true);

        std::fs::create_dir_all(&job.output_dir).unwrap();
        std::fs::write(job.output_path(), "rank,mark\n1,44.00\n").unwrap();

        assert_eq!(runner.run(&job).await.unwrap(), JobStatus::Skipped);
        assert!(source.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rerun_overwrites_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let (_, runner, job) = setup(dir.path(), vec![Some(rows(&["45.00"]))]);

        std::fs::create_dir_all(&job.output_dir).unwrap();
        std::fs::write(job.output_path(), "stale").unwrap();

        assert_eq!(runner.run(&job).await.unwrap(), JobStatus::Success(1));
        let content = std::fs::read_to_string(job.output_path()).unwrap();
        assert!(content.contains("45.00"));
    }
}
