//! Row types flowing through normalize → join → quality.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of temperatures for a station, already in Fahrenheit.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub date: NaiveDate,
    pub tmax_f: Option<f64>,
    pub tmin_f: Option<f64>,
}

/// One day of electricity demand for a region.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandRecord {
    pub date: NaiveDate,
    pub energy_mwh: f64,
}

/// A city-day with both weather and demand.
///
/// Field order is the processed CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub date: NaiveDate,
    pub tmax_f: Option<f64>,
    pub tmin_f: Option<f64>,
    pub energy_mwh: f64,
    pub city: String,
    pub day_of_week: String,
}

impl CombinedRecord {
    pub fn new(city: &str, weather: &WeatherRecord, demand: &DemandRecord) -> Self {
        Self {
            date: weather.date,
            tmax_f: weather.tmax_f,
            tmin_f: weather.tmin_f,
            energy_mwh: demand.energy_mwh,
            city: city.to_string(),
            day_of_week: weather.date.format("%A").to_string(),
        }
    }

    /// Mean of max and min, when both are known.
    pub fn temp_avg_f(&self) -> Option<f64> {
        match (self.tmax_f, self.tmin_f) {
            (Some(max), Some(min)) => Some((max + min) / 2.0),
            _ => None,
        }
    }
}
