//! Raw payload files, one per (source, city, date range).

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::dates::{DATE_FORMAT, DateRange};
use crate::error::Result;
use crate::parser::load_payload;
use crate::sources::Source;

/// City name as it appears in raw file names.
pub fn file_city(city: &str) -> String {
    city.trim().replace(' ', "_")
}

/// `{source}_{City_Name}_{start}_to_{end}.json`
pub fn file_name(source: Source, city: &str, range: &DateRange) -> String {
    format!("{}_{}_{}.json", source, file_city(city), range)
}

/// Whether `rest` is exactly `YYYY-MM-DD_to_YYYY-MM-DD.json`.
fn is_range_suffix(rest: &str) -> bool {
    let Some(range) = rest.strip_suffix(".json") else {
        return false;
    };
    let Some((start, end)) = range.split_once("_to_") else {
        return false;
    };
    NaiveDate::parse_from_str(start, DATE_FORMAT).is_ok()
        && NaiveDate::parse_from_str(end, DATE_FORMAT).is_ok()
}

/// Directory of raw payloads.
#[derive(Debug, Clone)]
pub struct RawStore {
    dir: PathBuf,
}

impl RawStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `payload` pretty-printed, replacing any file for the same range.
    pub fn save(
        &self,
        source: Source,
        city: &str,
        range: &DateRange,
        payload: &Value,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name(source, city, range));
        let body = serde_json::to_string_pretty(payload)?;
        std::fs::write(&path, body)?;
        info!(path = %path.display(), %source, city, "Raw payload saved");
        Ok(path)
    }

    /// Every raw file for (`source`, `city`), sorted by name.
    pub fn list(&self, source: Source, city: &str) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let prefix = format!("{}_{}_", source, file_city(city));
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let matches = name
                .strip_prefix(prefix.as_str())
                .is_some_and(is_range_suffix);
            if matches && entry.path().is_file() {
                found.push(entry.path());
            }
        }
        found.sort();
        debug!(%source, city, count = found.len(), "Raw files listed");
        Ok(found)
    }

    /// The lexicographically greatest raw file, i.e. the latest start date.
    pub fn latest(&self, source: Source, city: &str) -> Result<Option<PathBuf>> {
        let mut files = self.list(source, city)?;
        let latest = files.pop();
        if !files.is_empty() {
            warn!(
                %source,
                city,
                ignored = files.len(),
                "Several date ranges on disk, only the latest is processed"
            );
        }
        Ok(latest)
    }

    pub fn load(&self, path: &Path) -> Result<Value> {
        load_payload(path)
    }
}
