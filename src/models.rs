// Core data structures for the toplists scraper and pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One independent scrape job: a single toplist for one
/// (gender, age category, discipline, event type) combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScrapeJob {
    pub gender: String,
    pub age_category: String,
    pub discipline_slug: String,
    pub event_type_slug: String,
    /// Per-gender directory the job's CSV is written to
    pub output_dir: PathBuf,
}

impl ScrapeJob {
    pub fn new(
        gender: impl Into<String>,
        age_category: impl Into<String>,
        discipline_slug: impl Into<String>,
        event_type_slug: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            gender: gender.into(),
            age_category: age_category.into(),
            discipline_slug: discipline_slug.into(),
            event_type_slug: event_type_slug.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Deterministic file name: `{type}_{discipline}_{age_category}.csv`
    ///
    /// Spaces become `_` and slashes become `-` so the name is always a single
    /// path component.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.csv",
            self.event_type_slug, self.discipline_slug, self.age_category
        )
        .replace(' ', "_")
        .replace('/', "-")
    }

    /// Full path of the job's output file
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.file_name())
    }
}

impl fmt::Display for ScrapeJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.gender, self.age_category, self.event_type_slug, self.discipline_slug
        )
    }
}

/// One athlete performance as scraped from a toplist table row.
///
/// Serde names are the on-disk CSV header names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultRow {
    pub rank: String,
    pub mark: String,
    pub wind: String,
    pub competitor: String,
    pub dob: String,
    pub nationality: String,
    pub position: String,
    pub venue: String,
    #[serde(rename = "date")]
    pub event_date: String,
    pub result_score: String,
    pub discipline: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "sex")]
    pub gender: String,
    #[serde(rename = "age_cat")]
    pub age_category: String,
}

/// Outcome of fetching a single toplist page
#[derive(Debug, Clone, PartialEq)]
pub enum PageResult {
    /// Non-empty rows in page order
    Rows(Vec<ResultRow>),
    /// Empty or missing results table: pagination is finished
    End,
}

/// Terminal state of a scrape job
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// All pages fetched and written
    Success(usize),
    /// Pagination aborted after some rows were collected; those rows were written
    Partial { rows: usize, error: String },
    /// The toplist had no rows; nothing was written
    Empty,
    /// Output already present and skipping was requested
    Skipped,
    /// Nothing was written
    Failed(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Partial { .. } => "partial",
            Self::Empty => "empty",
            Self::Skipped => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    /// Rows persisted by the job
    pub fn rows_written(&self) -> usize {
        match self {
            Self::Success(rows) | Self::Partial { rows, .. } => *rows,
            _ => 0,
        }
    }
}

/// Per-job result collected by the coordinator
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job: ScrapeJob,
    pub status: JobStatus,
}

/// Aggregate statistics for a finished batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total_jobs: usize,
    pub succeeded: usize,
    pub partial: usize,
    pub empty: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_rows: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[JobOutcome], elapsed: Duration) -> Self {
        let mut summary = Self {
            total_jobs: outcomes.len(),
            elapsed,
            ..Default::default()
        };

        for outcome in outcomes {
            summary.total_rows += outcome.status.rows_written();
            match outcome.status {
                JobStatus::Success(_) => summary.succeeded += 1,
                JobStatus::Partial { .. } => summary.partial += 1,
                JobStatus::Empty => summary.empty += 1,
                JobStatus::Skipped => summary.skipped += 1,
                JobStatus::Failed(_) => summary.failed += 1,
            }
        }

        summary
    }

    /// Failed jobs as a percentage of all jobs
    pub fn failure_rate(&self) -> f64 {
        if self.total_jobs == 0 {
            0.0
        } else {
            (self.failed as f64 / self.total_jobs as f64) * 100.0
        }
    }
}

/// Scoring modality of an event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackField {
    Track,
    Field,
    Mixed,
    Unknown,
}

impl TrackField {
    const TRACK_TYPES: &'static [&'static str] = &[
        "sprints",
        "middlelong",
        "hurdles",
        "relays",
        "road-running",
        "race-walks",
    ];
    const FIELD_TYPES: &'static [&'static str] = &["throws", "jumps"];
    const MIXED_TYPES: &'static [&'static str] = &["combined-events"];

    /// Classify an event type slug
    pub fn from_event_type(event_type: &str) -> Self {
        if Self::FIELD_TYPES.contains(&event_type) {
            Self::Field
        } else if Self::TRACK_TYPES.contains(&event_type) {
            Self::Track
        } else if Self::MIXED_TYPES.contains(&event_type) {
            Self::Mixed
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Field => "field",
            Self::Mixed => "mixed",
            Self::Unknown => "unknown",
        }
    }

    /// Timed events rank lowest-first; everything else, unknown types
    /// included, ranks highest-first.
    pub fn sort_direction(&self) -> SortDirection {
        match self {
            Self::Track => SortDirection::Ascending,
            Self::Field | Self::Mixed | Self::Unknown => SortDirection::Descending,
        }
    }
}

impl fmt::Display for TrackField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A result row enriched during the combine stage.
///
/// Field order matches the CSV column order of combined and split datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub rank: String,
    pub mark: String,
    pub wind: String,
    pub competitor: String,
    pub dob: Option<NaiveDate>,
    pub nationality: String,
    pub position: String,
    pub venue: String,
    #[serde(rename = "date")]
    pub event_date: Option<NaiveDate>,
    pub result_score: String,
    pub discipline: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "sex")]
    pub gender: String,
    #[serde(rename = "age_cat")]
    pub age_category: String,
    pub normalized_discipline: String,
    pub track_field: TrackField,
    pub mark_numeric: f64,
    pub venue_country: Option<String>,
    pub age_at_event: Option<i64>,
    pub season: Option<i32>,
}

/// Relay view of a record: relay teams have no birth date or age
#[derive(Debug, Serialize)]
pub struct RelayRecord<'a> {
    pub rank: &'a str,
    pub mark: &'a str,
    pub wind: &'a str,
    pub competitor: &'a str,
    pub nationality: &'a str,
    pub position: &'a str,
    pub venue: &'a str,
    #[serde(rename = "date")]
    pub event_date: Option<NaiveDate>,
    pub result_score: &'a str,
    pub discipline: &'a str,
    #[serde(rename = "type")]
    pub event_type: &'a str,
    #[serde(rename = "sex")]
    pub gender: &'a str,
    #[serde(rename = "age_cat")]
    pub age_category: &'a str,
    pub normalized_discipline: &'a str,
    pub track_field: TrackField,
    pub mark_numeric: f64,
    pub venue_country: Option<&'a str>,
    pub season: Option<i32>,
}

impl<'a> From<&'a NormalizedRecord> for RelayRecord<'a> {
    fn from(record: &'a NormalizedRecord) -> Self {
        Self {
            rank: &record.rank,
            mark: &record.mark,
            wind: &record.wind,
            competitor: &record.competitor,
            nationality: &record.nationality,
            position: &record.position,
            venue: &record.venue,
            event_date: record.event_date,
            result_score: &record.result_score,
            discipline: &record.discipline,
            event_type: &record.event_type,
            gender: &record.gender,
            age_category: &record.age_category,
            normalized_discipline: &record.normalized_discipline,
            track_field: record.track_field,
            mark_numeric: record.mark_numeric,
            venue_country: record.venue_country.as_deref(),
            season: record.season,
        }
    }
}

/// Combine-stage grouping key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub gender: String,
    pub event_type: String,
    pub normalized_discipline: String,
}

impl GroupKey {
    /// `{gender}_{type}_{discipline}.csv`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.csv",
            self.gender, self.event_type, self.normalized_discipline
        )
    }

    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.gender, self.event_type, self.normalized_discipline
        )
    }
}
