//! Freshness, missing-value and outlier checks over combined records.

use chrono::NaiveDate;
use tracing::info;

use crate::analyzers::types::{Freshness, MissingValues, Outliers, QualityReport};
use crate::analyzers::utility::pct;
use crate::records::CombinedRecord;

/// Physical sanity bounds for daily temperatures, °F.
pub const MAX_PLAUSIBLE_TEMP_F: f64 = 130.0;
pub const MIN_PLAUSIBLE_TEMP_F: f64 = -50.0;

/// Demand below this is impossible.
pub const MIN_PLAUSIBLE_ENERGY_MWH: f64 = 0.0;

/// Processed CSV columns, in file order.
pub const COLUMNS: [&str; 6] = ["date", "tmax_f", "tmin_f", "energy_mwh", "city", "day_of_week"];

fn is_missing(record: &CombinedRecord, column: &str) -> bool {
    match column {
        "tmax_f" => record.tmax_f.is_none(),
        "tmin_f" => record.tmin_f.is_none(),
        "energy_mwh" => !record.energy_mwh.is_finite(),
        "city" => record.city.trim().is_empty(),
        "day_of_week" => record.day_of_week.trim().is_empty(),
        _ => false,
    }
}

fn temp_out_of_range(temp: Option<f64>) -> bool {
    temp.is_some_and(|t| !(MIN_PLAUSIBLE_TEMP_F..=MAX_PLAUSIBLE_TEMP_F).contains(&t))
}

pub fn is_temperature_outlier(record: &CombinedRecord) -> bool {
    temp_out_of_range(record.tmax_f) || temp_out_of_range(record.tmin_f)
}

pub fn is_energy_outlier(record: &CombinedRecord) -> bool {
    record.energy_mwh < MIN_PLAUSIBLE_ENERGY_MWH
}

/// Newest date and its age relative to `today`.
pub fn check_freshness(records: &[CombinedRecord], today: NaiveDate) -> Option<Freshness> {
    let latest_date = records.iter().map(|r| r.date).max()?;
    Some(Freshness {
        latest_date,
        days_since_latest: (today - latest_date).num_days(),
    })
}

/// Count and share of absent entries, reported only for affected columns.
pub fn check_missing_values(records: &[CombinedRecord]) -> Vec<MissingValues> {
    COLUMNS
        .iter()
        .filter_map(|&column| {
            let count = records.iter().filter(|r| is_missing(r, column)).count();
            (count > 0).then(|| MissingValues {
                column,
                count,
                percent: pct(count, records.len()),
            })
        })
        .collect()
}

pub fn check_outliers(records: &[CombinedRecord]) -> Outliers {
    Outliers {
        temperature: records
            .iter()
            .filter(|r| is_temperature_outlier(r))
            .cloned()
            .collect(),
        energy: records
            .iter()
            .filter(|r| is_energy_outlier(r))
            .cloned()
            .collect(),
    }
}

/// Builds the quality report for every city's combined records.
///
/// Deterministic for a given `today`; callers pass the wall-clock date.
pub fn analyze(records: &[CombinedRecord], today: NaiveDate) -> QualityReport {
    let report = QualityReport {
        total_records: records.len(),
        freshness: check_freshness(records, today),
        missing_values: check_missing_values(records),
        outliers: check_outliers(records),
        join_coverage: Vec::new(),
    };

    info!(
        total_records = report.total_records,
        columns_with_missing = report.missing_values.len(),
        temperature_outliers = report.outliers.temperature.len(),
        energy_outliers = report.outliers.energy.len(),
        "Quality analysis complete"
    );

    report
}
