//! Persistence for everything downstream of raw payloads.
//!
//! Processed per-city CSVs, join coverage, the rendered quality report, and
//! the append-only fetch history.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::join::JoinCoverage;
use crate::records::CombinedRecord;
use crate::stats::FetchStats;

const PROCESSED_SUFFIX: &str = "_processed.csv";

/// Appends a [`FetchStats`] record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_fetch_record(path: &Path, stats: &FetchStats) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending fetch history row");

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(stats)?;
    writer.flush()?;

    Ok(())
}

/// `New York` → `new_york_processed.csv`
pub fn processed_file_name(city: &str) -> String {
    format!(
        "{}{PROCESSED_SUFFIX}",
        city.trim().to_lowercase().replace(' ', "_")
    )
}

/// Writes one city's combined records, replacing any previous file.
pub fn write_processed(dir: &Path, city: &str, records: &[CombinedRecord]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(processed_file_name(city));

    let mut writer = WriterBuilder::new().has_headers(true).from_path(&path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), city, rows = records.len(), "Processed data saved");
    Ok(path)
}

/// Deletes the city's processed file, if any. Returns whether one existed.
pub fn remove_processed(dir: &Path, city: &str) -> Result<bool> {
    let path = dir.join(processed_file_name(city));
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(&path)?;
    info!(path = %path.display(), city, "Stale processed data removed");
    Ok(true)
}

pub fn read_processed(path: &Path) -> Result<Vec<CombinedRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<CombinedRecord>, _>>()?;
    Ok(records)
}

/// Every `*_processed.csv` in `dir`, sorted by name.
pub fn processed_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_processed = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(PROCESSED_SUFFIX));
        if is_processed && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Concatenates every processed file in `dir`. A file that cannot be read is
/// logged and left out.
pub fn read_processed_dir(dir: &Path) -> Result<(Vec<CombinedRecord>, usize)> {
    let files = processed_files(dir)?;
    let mut records = Vec::new();
    for path in &files {
        match read_processed(path) {
            Ok(mut rows) => records.append(&mut rows),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable processed file"),
        }
    }
    Ok((records, files.len()))
}

pub fn write_join_coverage(path: &Path, coverage: &[JoinCoverage]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(coverage)?)?;
    Ok(())
}

/// Coverage from the last processing run; none if it never ran.
pub fn read_join_coverage(path: &Path) -> Result<Vec<JoinCoverage>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn write_report(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    info!(path = %path.display(), "Quality report written");
    Ok(())
}
