//! Inner join of one city's weather and demand series on calendar date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::records::{CombinedRecord, DemandRecord, WeatherRecord};
use crate::sources::Source;

/// How well the two sources lined up for one city.
///
/// Days present on only one side are dropped by the join; these counts are
/// the only trace of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCoverage {
    pub city: String,
    pub weather_days: usize,
    pub demand_days: usize,
    pub matched_days: usize,
    pub weather_only: usize,
    pub demand_only: usize,
}

impl JoinCoverage {
    /// Share of the union of days that survived the join, in percent.
    pub fn matched_pct(&self) -> f64 {
        let union = self.matched_days + self.weather_only + self.demand_only;
        crate::analyzers::utility::pct(self.matched_days, union)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub records: Vec<CombinedRecord>,
    pub coverage: JoinCoverage,
}

/// Joins `weather` and `demand` for `city`, output sorted by date.
///
/// If a side repeats a date, its first row for that date is used, so the
/// output never has more rows than the smaller input.
///
/// # Errors
///
/// [`PipelineError::EmptyInput`] when either side has no rows.
pub fn join(weather: &[WeatherRecord], demand: &[DemandRecord], city: &str) -> Result<JoinOutcome> {
    if weather.is_empty() {
        return Err(PipelineError::EmptyInput {
            city: city.to_string(),
            side: Source::Weather,
        });
    }
    if demand.is_empty() {
        return Err(PipelineError::EmptyInput {
            city: city.to_string(),
            side: Source::Demand,
        });
    }

    let mut weather_by_date: BTreeMap<NaiveDate, &WeatherRecord> = BTreeMap::new();
    for record in weather {
        weather_by_date.entry(record.date).or_insert(record);
    }

    let mut demand_by_date: BTreeMap<NaiveDate, &DemandRecord> = BTreeMap::new();
    for record in demand {
        demand_by_date.entry(record.date).or_insert(record);
    }

    let records: Vec<CombinedRecord> = weather_by_date
        .iter()
        .filter_map(|(date, w)| {
            demand_by_date
                .get(date)
                .map(|d| CombinedRecord::new(city, w, d))
        })
        .collect();

    let matched_days = records.len();
    let coverage = JoinCoverage {
        city: city.to_string(),
        weather_days: weather_by_date.len(),
        demand_days: demand_by_date.len(),
        matched_days,
        weather_only: weather_by_date.len() - matched_days,
        demand_only: demand_by_date.len() - matched_days,
    };

    if coverage.weather_only > 0 || coverage.demand_only > 0 {
        warn!(
            city,
            weather_only = coverage.weather_only,
            demand_only = coverage.demand_only,
            "Dates present in only one source were dropped"
        );
    }
    info!(city, matched_days, "Joined weather and demand");

    Ok(JoinOutcome { records, coverage })
}
