//! Loading persisted payloads and reading the loosely-typed values inside them.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::dates::DATE_FORMAT;
use crate::error::{PipelineError, Result};

/// Reads and decodes a raw payload file.
///
/// # Errors
///
/// A missing file or malformed JSON is a [`PipelineError::Parse`] naming the
/// path; it concerns this file only.
pub fn load_payload(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| PipelineError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Calendar date from either `2023-01-01` or `2023-01-01T00:00:00`.
pub fn parse_api_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// A number, or a string holding one. Anything else (including non-finite
/// values) is `None`.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_api_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 2);
        assert_eq!(parse_api_date("2023-01-02"), expected);
        assert_eq!(parse_api_date("2023-01-02T00:00:00"), expected);
        assert_eq!(parse_api_date("January 2nd"), None);
    }

    #[test]
    fn test_parse_number_accepts_numeric_strings() {
        assert_eq!(parse_number(&json!(12.5)), Some(12.5));
        assert_eq!(parse_number(&json!("340")), Some(340.0));
        assert_eq!(parse_number(&json!("n/a")), None);
        assert_eq!(parse_number(&json!(null)), None);
        assert_eq!(parse_number(&json!("NaN")), None);
    }

    #[test]
    fn test_load_payload_missing_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather_nowhere.json");
        let err = load_payload(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
        assert!(err.to_string().contains("weather_nowhere.json"));
    }

    #[test]
    fn test_load_payload_malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demand_bad.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"{\"response\": {\"data\": [").unwrap();

        assert!(matches!(
            load_payload(&path),
            Err(PipelineError::Parse { .. })
        ));
    }
}
