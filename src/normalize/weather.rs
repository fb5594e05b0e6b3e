use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Normalized, tenths_to_fahrenheit};
use crate::parser::{parse_api_date, parse_number};
use crate::records::WeatherRecord;
use crate::sources::weather::{TMAX, TMIN};

#[derive(Default)]
struct DayReadings {
    tmax: Vec<f64>,
    tmin: Vec<f64>,
}

/// Pivots `(date, datatype, value)` triples into one row per date.
///
/// Repeated readings for the same date and datatype are averaged. Values
/// arrive in tenths of a degree Celsius and leave in Fahrenheit. A datatype
/// that never appears leaves its field `None` on every row.
pub fn normalize_weather(payload: &Value, path: &Path) -> Normalized<WeatherRecord> {
    let results = match payload.get("results").and_then(Value::as_array) {
        Some(results) if !results.is_empty() => results,
        _ => {
            warn!(path = %path.display(), "No 'results' found in weather payload");
            return Normalized::Empty;
        }
    };

    let mut days: BTreeMap<NaiveDate, DayReadings> = BTreeMap::new();
    let mut skipped = 0usize;

    for item in results {
        let date = item
            .get("date")
            .and_then(Value::as_str)
            .and_then(parse_api_date);
        let datatype = item.get("datatype").and_then(Value::as_str);
        let value = item.get("value").and_then(parse_number);

        let (Some(date), Some(datatype), Some(value)) = (date, datatype, value) else {
            skipped += 1;
            continue;
        };

        let day = days.entry(date).or_default();
        match datatype {
            TMAX => day.tmax.push(value),
            TMIN => day.tmin.push(value),
            _ => {}
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "Skipped weather rows without a usable date, datatype or value");
    }

    for (datatype, present) in [
        (TMAX, days.values().any(|d| !d.tmax.is_empty())),
        (TMIN, days.values().any(|d| !d.tmin.is_empty())),
    ] {
        if !present {
            warn!(path = %path.display(), datatype, "Datatype not found, column will be missing");
        }
    }

    let records: Vec<WeatherRecord> = days
        .into_iter()
        .map(|(date, day)| WeatherRecord {
            date,
            tmax_f: average(&day.tmax).map(tenths_to_fahrenheit),
            tmin_f: average(&day.tmin).map(tenths_to_fahrenheit),
        })
        .collect();

    debug!(path = %path.display(), rows = records.len(), "Weather payload normalized");
    Normalized::Records(records)
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
