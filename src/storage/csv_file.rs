//! CSV encoding, decoding and atomic file writes

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::error::{ParseError, StorageError};

/// Encode records as CSV bytes with a header row
///
/// An empty slice encodes to an empty buffer.
pub fn encode<T: Serialize>(records: &[T]) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| StorageError::io("<csv buffer>", e.into_error()))
}

/// Sibling temp path used for atomic replacement
pub fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write bytes to `path` through a temp file and rename, creating parents
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let temp = temp_path(path);
    fs::write(&temp, bytes).map_err(|e| StorageError::io(&temp, e))?;
    fs::rename(&temp, path).map_err(|e| StorageError::io(path, e))?;
    Ok(())
}

/// Encode and atomically write records to `path`
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), StorageError> {
    let bytes = encode(records)?;
    write_atomic(path, &bytes)
}

/// Header row of a CSV file
pub fn headers(path: &Path) -> Result<Vec<String>, ParseError> {
    let mut reader = csv::Reader::from_path(path)?;
    Ok(reader.headers()?.iter().map(str::to_string).collect())
}

/// Read every record of a CSV file
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ParseError> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()?;
    Ok(records)
}

/// CSV files directly inside `dir`, sorted by file name
///
/// A directory that does not exist has no files.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::io(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| StorageError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
