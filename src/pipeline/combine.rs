//! Combine per-job toplists into ranked per-discipline files
//!
//! Per-job files under `<scrape_root>/<gender>/` are grouped by
//! (gender, event type, normalized discipline). Each group is concatenated,
//! enriched into [`NormalizedRecord`]s, sorted by numeric mark in the
//! direction the event type implies, and written to
//! `<combined_dir>/<gender>_<type>_<discipline>.csv`.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::Result;
use crate::models::{GroupKey, NormalizedRecord, ResultRow, SortDirection, TrackField};
use crate::pipeline::discipline::normalize_discipline;
use crate::pipeline::mark::parse_mark;
use crate::storage::csv_file;
use crate::utils::error::{ParseError, StorageError};

/// Date format used by the toplist tables, e.g. `22 AUG 2015`
pub const DATE_FORMAT: &str = "%d %b %Y";

/// Column every per-job file must carry to be combined
const MARK_COLUMN: &str = "mark";

/// Components of a per-job file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFileName {
    pub event_type: String,
    pub discipline: String,
    pub age_category: String,
}

/// Parse `<type>_<discipline…>_<age>.csv`
///
/// The discipline is every part between the first and the last, joined by
/// `_`, so underscores inside a discipline slug survive.
pub fn parse_job_file_name(name: &str) -> std::result::Result<JobFileName, ParseError> {
    let stem = name.strip_suffix(".csv").unwrap_or(name);
    let parts: Vec<&str> = stem.split('_').collect();

    match parts.as_slice() {
        [event_type, discipline @ .., age_category] if !discipline.is_empty() => Ok(JobFileName {
            event_type: (*event_type).to_string(),
            discipline: discipline.join("_"),
            age_category: (*age_category).to_string(),
        }),
        _ => Err(ParseError::FileName(name.to_string())),
    }
}

/// Group per-job files under `scrape_root` by combine key
///
/// Gender directories and the files inside them are visited in name order,
/// which fixes the concatenation order of each group. A missing root yields
/// no groups.
pub fn collect_groups(scrape_root: &Path) -> Result<BTreeMap<GroupKey, Vec<PathBuf>>> {
    let mut groups: BTreeMap<GroupKey, Vec<PathBuf>> = BTreeMap::new();

    let entries = match std::fs::read_dir(scrape_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(root = %scrape_root.display(), "Scrape root does not exist, nothing to combine");
            return Ok(groups);
        }
        Err(e) => return Err(StorageError::io(scrape_root, e).into()),
    };

    let mut gender_dirs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| StorageError::io(scrape_root, e))?.path();
        if path.is_dir() {
            gender_dirs.push(path);
        }
    }
    gender_dirs.sort();

    for dir in gender_dirs {
        let gender = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for file in csv_file::list_csv_files(&dir)? {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match parse_job_file_name(&name) {
                Ok(parsed) => {
                    let key = GroupKey {
                        gender: gender.clone(),
                        event_type: parsed.event_type,
                        normalized_discipline: normalize_discipline(&parsed.discipline),
                    };
                    groups.entry(key).or_default().push(file);
                }
                Err(e) => tracing::debug!(path = %file.display(), error = %e, "Ignoring file"),
            }
        }
    }

    Ok(groups)
}

fn venue_country_regex() -> &'static Regex {
    static VENUE_COUNTRY_RE: OnceLock<Regex> = OnceLock::new();
    VENUE_COUNTRY_RE.get_or_init(|| Regex::new(r"\((\w{3})\)").expect("Invalid regex pattern"))
}

/// Three-letter country code in parentheses, e.g. `Eugene, OR (USA)` -> `USA`
pub fn venue_country(venue: &str) -> Option<String> {
    venue_country_regex()
        .captures(venue)
        .map(|caps| caps[1].to_string())
}

/// Parse a table date, `None` when malformed
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Age in completed 365-day years
pub fn age_at_event(dob: NaiveDate, date: NaiveDate) -> i64 {
    (date - dob).num_days().div_euclid(365)
}

/// Enrich one scraped row for its group
pub fn normalize_row(row: ResultRow, key: &GroupKey, track_field: TrackField) -> NormalizedRecord {
    let dob = parse_date(&row.dob);
    let event_date = parse_date(&row.event_date);
    let age = dob.zip(event_date).map(|(dob, date)| age_at_event(dob, date));

    NormalizedRecord {
        mark_numeric: parse_mark(&row.mark),
        venue_country: venue_country(&row.venue),
        age_at_event: age,
        season: event_date.map(|d| d.year()),
        normalized_discipline: key.normalized_discipline.clone(),
        track_field,
        rank: row.rank,
        mark: row.mark,
        wind: row.wind,
        competitor: row.competitor,
        dob,
        nationality: row.nationality,
        position: row.position,
        venue: row.venue,
        event_date,
        result_score: row.result_score,
        discipline: row.discipline,
        event_type: row.event_type,
        gender: row.gender,
        age_category: row.age_category,
    }
}

/// Stable sort by numeric mark
pub fn sort_records(records: &mut [NormalizedRecord], direction: SortDirection) {
    match direction {
        SortDirection::Ascending => {
            records.sort_by(|a, b| a.mark_numeric.total_cmp(&b.mark_numeric))
        }
        SortDirection::Descending => {
            records.sort_by(|a, b| b.mark_numeric.total_cmp(&a.mark_numeric))
        }
    }
}

/// Load, enrich and rank one group
///
/// Returns `Ok(None)` when a file of the group has no `mark` column.
pub fn normalize_group(key: &GroupKey, files: &[PathBuf]) -> Result<Option<Vec<NormalizedRecord>>> {
    for file in files {
        if !csv_file::headers(file)?.iter().any(|h| h == MARK_COLUMN) {
            let err = ParseError::MissingColumn {
                column: MARK_COLUMN.to_string(),
                path: file.clone(),
            };
            tracing::warn!(group = %key, error = %err, "Skipping group");
            return Ok(None);
        }
    }

    let track_field = TrackField::from_event_type(&key.event_type);

    let mut records = Vec::new();
    for file in files {
        let rows: Vec<ResultRow> = csv_file::read_records(file)?;
        records.extend(rows.into_iter().map(|row| normalize_row(row, key, track_field)));
    }

    sort_records(&mut records, track_field.sort_direction());
    Ok(Some(records))
}

/// Totals of a combine run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombineSummary {
    pub groups_written: usize,
    pub groups_skipped: usize,
    pub rows: usize,
}

/// Combine every group under `scrape_root` into `combined_dir`
pub fn combine_all(scrape_root: &Path, combined_dir: &Path) -> Result<CombineSummary> {
    let groups = collect_groups(scrape_root)?;
    let mut summary = CombineSummary::default();

    tracing::info!(
        groups = groups.len(),
        root = %scrape_root.display(),
        "Combining toplists"
    );

    for (key, files) in &groups {
        let Some(records) = normalize_group(key, files)? else {
            summary.groups_skipped += 1;
            continue;
        };

        let path = key.output_path(combined_dir);
        csv_file::write_records(&path, &records)?;

        tracing::info!(
            group = %key,
            files = files.len(),
            rows = records.len(),
            path = %path.display(),
            "Saved combined toplist"
        );

        summary.groups_written += 1;
        summary.rows += records.len();
    }

    Ok(summary)
}
