//! Data types produced by the quality and pattern analyzers.

use chrono::NaiveDate;
use serde::Serialize;

use crate::join::JoinCoverage;
use crate::records::CombinedRecord;

/// How recent the newest observation is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Freshness {
    pub latest_date: NaiveDate,
    pub days_since_latest: i64,
}

/// Absent entries in one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingValues {
    pub column: &'static str,
    pub count: usize,
    pub percent: f64,
}

/// Rows that fail the hard-coded sanity bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outliers {
    pub temperature: Vec<CombinedRecord>,
    pub energy: Vec<CombinedRecord>,
}

impl Outliers {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty() && self.energy.is_empty()
    }
}

/// Complete data-quality picture of one run's combined datasets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub total_records: usize,
    /// `None` when there are no records at all.
    pub freshness: Option<Freshness>,
    /// Only columns with at least one missing entry, in column order.
    pub missing_values: Vec<MissingValues>,
    pub outliers: Outliers,
    pub join_coverage: Vec<JoinCoverage>,
}

impl QualityReport {
    /// Attaches per-city join coverage gathered while processing.
    pub fn with_join_coverage(mut self, mut coverage: Vec<JoinCoverage>) -> Self {
        coverage.sort_by(|a, b| a.city.cmp(&b.city));
        self.join_coverage = coverage;
        self
    }
}

/// Pearson correlation between average temperature and demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    pub r: f64,
    pub r_squared: f64,
    pub samples: usize,
}

/// Mean demand for one group of days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub label: String,
    pub mean_energy_mwh: f64,
    pub stddev_energy_mwh: f64,
    pub days: usize,
}

/// Mean demand by temperature band (rows) and weekday (columns, Monday first).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub bands: Vec<&'static str>,
    pub weekdays: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}
