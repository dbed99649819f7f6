//! Global merge and dataset partitioning
//!
//! The combined per-discipline files are concatenated into one dataset,
//! which is then split into:
//!
//! ```text
//! <datasets_dir>/
//!   all_disciplines_combined.csv
//!   individual_events.csv
//!   relay_events.csv                      (no dob / age_at_event)
//!   split_by_type/<gender>/<type>.csv
//!   split_by_discipline/<gender>/<normalized_discipline>.csv
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{NormalizedRecord, RelayRecord};
use crate::storage::csv_file;

pub const MERGED_FILE: &str = "all_disciplines_combined.csv";
pub const INDIVIDUAL_FILE: &str = "individual_events.csv";
pub const RELAY_FILE: &str = "relay_events.csv";
pub const BY_TYPE_DIR: &str = "split_by_type";
pub const BY_DISCIPLINE_DIR: &str = "split_by_discipline";

/// Event type of relay races
pub const RELAY_TYPE: &str = "relays";

/// Concatenate every combined file (name order) into `dataset_path`
///
/// Returns the number of merged records.
pub fn merge_combined(combined_dir: &Path, dataset_path: &Path) -> Result<usize> {
    let mut records: Vec<NormalizedRecord> = Vec::new();

    for file in csv_file::list_csv_files(combined_dir)? {
        if file == dataset_path {
            continue;
        }
        let mut part: Vec<NormalizedRecord> = csv_file::read_records(&file)?;
        tracing::debug!(path = %file.display(), rows = part.len(), "Merging combined file");
        records.append(&mut part);
    }

    csv_file::write_records(dataset_path, &records)?;

    tracing::info!(
        rows = records.len(),
        path = %dataset_path.display(),
        "Saved merged dataset"
    );

    Ok(records.len())
}

/// Counts of a split run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSummary {
    pub individual: usize,
    pub relay: usize,
    pub type_files: usize,
    pub discipline_files: usize,
}

type Partitions<'a> = BTreeMap<&'a str, BTreeMap<&'a str, Vec<&'a NormalizedRecord>>>;

/// Group records by gender, then by `key`
fn partition<'a>(
    records: &'a [NormalizedRecord],
    key: impl Fn(&'a NormalizedRecord) -> &'a str,
) -> Partitions<'a> {
    let mut partitions: Partitions<'a> = BTreeMap::new();
    for record in records {
        partitions
            .entry(record.gender.as_str())
            .or_default()
            .entry(key(record))
            .or_default()
            .push(record);
    }
    partitions
}

/// Single path component for a partition value
fn component(value: &str) -> String {
    let cleaned = value.trim().replace(['/', '\\'], "-");
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

fn write_partitions(root: &Path, partitions: &Partitions<'_>) -> Result<usize> {
    let mut written = 0;
    for (gender, groups) in partitions {
        let dir = root.join(component(gender));
        for (value, rows) in groups {
            let path: PathBuf = dir.join(format!("{}.csv", component(value)));
            csv_file::write_records(&path, rows)?;
            tracing::debug!(path = %path.display(), rows = rows.len(), "Saved partition");
            written += 1;
        }
    }
    Ok(written)
}

/// Split the merged dataset under `datasets_dir`
///
/// Every gender present in the data gets its own partition directories.
/// Relays appear in the type and discipline partitions like any other event.
pub fn split_dataset(dataset_path: &Path, datasets_dir: &Path) -> Result<SplitSummary> {
    let records: Vec<NormalizedRecord> = csv_file::read_records(dataset_path)?;

    let (relays, individual): (Vec<&NormalizedRecord>, Vec<&NormalizedRecord>) = records
        .iter()
        .partition(|r| r.event_type == RELAY_TYPE);
    let relay_rows: Vec<RelayRecord<'_>> = relays.iter().map(|r| RelayRecord::from(*r)).collect();

    csv_file::write_records(&datasets_dir.join(INDIVIDUAL_FILE), &individual)?;
    csv_file::write_records(&datasets_dir.join(RELAY_FILE), &relay_rows)?;

    let type_files = write_partitions(
        &datasets_dir.join(BY_TYPE_DIR),
        &partition(&records, |r| r.event_type.as_str()),
    )?;
    let discipline_files = write_partitions(
        &datasets_dir.join(BY_DISCIPLINE_DIR),
        &partition(&records, |r| r.normalized_discipline.as_str()),
    )?;

    let summary = SplitSummary {
        individual: individual.len(),
        relay: relay_rows.len(),
        type_files,
        discipline_files,
    };

    tracing::info!(
        individual = summary.individual,
        relay = summary.relay,
        type_files = summary.type_files,
        discipline_files = summary.discipline_files,
        dir = %datasets_dir.display(),
        "Split dataset"
    );

    Ok(summary)
}
