use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use super::Normalized;
use crate::parser::{parse_api_date, parse_number};
use crate::records::DemandRecord;

/// `type` code of demand rows (other codes are forecasts, net generation, ...).
pub const DEMAND_TYPE: &str = "D";

/// Timezone whose readings are used whenever the payload has any.
pub const CANONICAL_TIMEZONE: &str = "Eastern";

/// Tie-break order when falling back to other timezones. Zones not listed
/// rank after these, alphabetically; payload order breaks remaining ties.
pub const TIMEZONE_PREFERENCE: [&str; 5] = ["Eastern", "Central", "Mountain", "Pacific", "Arizona"];

struct Candidate<'a> {
    position: usize,
    timezone: &'a str,
    date: NaiveDate,
    energy_mwh: f64,
}

impl Candidate<'_> {
    fn rank(&self) -> (usize, &str, usize) {
        match TIMEZONE_PREFERENCE.iter().position(|tz| *tz == self.timezone) {
            Some(i) => (i, "", self.position),
            None => (TIMEZONE_PREFERENCE.len(), self.timezone, self.position),
        }
    }
}

/// Filters a demand payload to one daily demand value per date.
///
/// Rows in [`CANONICAL_TIMEZONE`] are used when present. Otherwise every
/// demand row is considered and, per date, the best-ranked timezone wins.
/// Rows without a numeric value or a parseable period are dropped.
pub fn normalize_demand(payload: &Value, path: &Path) -> Normalized<DemandRecord> {
    let data = match payload
        .get("response")
        .and_then(|r| r.get("data"))
        .and_then(Value::as_array)
    {
        Some(data) if !data.is_empty() => data,
        _ => {
            warn!(path = %path.display(), "No 'data' found in demand payload");
            return Normalized::Empty;
        }
    };

    let mut candidates = Vec::new();
    let mut unusable = 0usize;

    for (position, row) in data.iter().enumerate() {
        if row.get("type").and_then(Value::as_str) != Some(DEMAND_TYPE) {
            continue;
        }

        let date = row
            .get("period")
            .and_then(Value::as_str)
            .and_then(parse_api_date);
        let energy = row.get("value").and_then(parse_number);

        match (date, energy) {
            (Some(date), Some(energy_mwh)) => candidates.push(Candidate {
                position,
                timezone: row.get("timezone").and_then(Value::as_str).unwrap_or(""),
                date,
                energy_mwh,
            }),
            _ => unusable += 1,
        }
    }

    if unusable > 0 {
        warn!(path = %path.display(), unusable, "Dropped demand rows without a numeric value or valid period");
    }

    let has_canonical = candidates.iter().any(|c| c.timezone == CANONICAL_TIMEZONE);
    if has_canonical {
        candidates.retain(|c| c.timezone == CANONICAL_TIMEZONE);
    } else if !candidates.is_empty() {
        warn!(
            path = %path.display(),
            timezone = CANONICAL_TIMEZONE,
            "No demand rows for canonical timezone, falling back to any timezone"
        );
    }

    let mut by_date: BTreeMap<NaiveDate, Candidate> = BTreeMap::new();
    let mut duplicates = 0usize;

    for candidate in candidates {
        match by_date.get(&candidate.date) {
            Some(current) => {
                duplicates += 1;
                if candidate.rank() < current.rank() {
                    by_date.insert(candidate.date, candidate);
                }
            }
            None => {
                by_date.insert(candidate.date, candidate);
            }
        }
    }

    if duplicates > 0 {
        debug!(path = %path.display(), duplicates, "Collapsed duplicate demand dates");
    }

    Normalized::Records(
        by_date
            .into_values()
            .map(|c| DemandRecord {
                date: c.date,
                energy_mwh: c.energy_mwh,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path() -> &'static Path {
        Path::new("demand_Test_City_2023-01-01_to_2023-01-31.json")
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    fn row(period: &str, kind: &str, tz: &str, value: serde_json::Value) -> serde_json::Value {
        json!({
            "period": period,
            "respondent": "NYIS",
            "type": kind,
            "timezone": tz,
            "value": value,
            "value-units": "megawatthours"
        })
    }

    fn payload(rows: Vec<serde_json::Value>) -> serde_json::Value {
        json!({"response": {"total": rows.len(), "data": rows}})
    }

    #[test]
    fn test_prefers_canonical_timezone() {
        let p = payload(vec![
            row("2023-01-01", "D", "Pacific", json!(999)),
            row("2023-01-01", "D", "Eastern", json!(100)),
            row("2023-01-02", "D", "Eastern", json!("200")),
            row("2023-01-02", "NG", "Eastern", json!(5)),
        ]);

        let records = normalize_demand(&p, path()).into_records();
        assert_eq!(
            records,
            vec![
                DemandRecord {
                    date: d(1),
                    energy_mwh: 100.0,
                },
                DemandRecord {
                    date: d(2),
                    energy_mwh: 200.0,
                },
            ]
        );
    }

    #[test]
    fn test_fallback_uses_preference_order_per_date() {
        let p = payload(vec![
            row("2023-01-01", "D", "Pacific", json!(300)),
            row("2023-01-01", "D", "Central", json!(200)),
            row("2023-01-02", "D", "Zulu", json!(7)),
            row("2023-01-02", "D", "Alaska", json!(8)),
            row("2023-01-03", "D", "Mountain", json!(1)),
            row("2023-01-03", "D", "Mountain", json!(2)),
        ]);

        let records = normalize_demand(&p, path()).into_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].energy_mwh, 200.0);
        // Unlisted zones fall back to alphabetical order.
        assert_eq!(records[1].energy_mwh, 8.0);
        // Same zone: first in payload order.
        assert_eq!(records[2].energy_mwh, 1.0);
    }

    #[test]
    fn test_non_numeric_values_are_excluded() {
        let p = payload(vec![
            row("2023-01-01", "D", "Eastern", json!(null)),
            row("2023-01-02", "D", "Eastern", json!("n/a")),
            row("2023-01-03", "D", "Eastern", json!(42)),
        ]);

        let records = normalize_demand(&p, path()).into_records();
        assert_eq!(
            records,
            vec![DemandRecord {
                date: d(3),
                energy_mwh: 42.0,
            }]
        );
    }

    #[test]
    fn test_missing_data_list_is_empty_marker() {
        assert_eq!(normalize_demand(&json!({}), path()), Normalized::Empty);
        assert_eq!(
            normalize_demand(&json!({"response": {"data": []}}), path()),
            Normalized::Empty
        );
    }

    #[test]
    fn test_no_demand_rows_yields_empty_records() {
        let p = payload(vec![row("2023-01-01", "NG", "Eastern", json!(1))]);
        let normalized = normalize_demand(&p, path());
        assert_eq!(normalized, Normalized::Records(vec![]));
        assert!(normalized.is_empty());
    }
}
