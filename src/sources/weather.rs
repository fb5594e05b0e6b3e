//! Station-scoped daily weather endpoint (NOAA Climate Data Online v2).

use reqwest::Url;

use crate::dates::DateRange;
use crate::error::{PipelineError, Result};

pub const WEATHER_API_URL: &str = "https://www.ncei.noaa.gov/cdo-web/api/v2/data";

/// Header carrying the access token.
pub const TOKEN_HEADER: &str = "token";

pub const DATASET_ID: &str = "GHCND";
pub const TMAX: &str = "TMAX";
pub const TMIN: &str = "TMIN";

/// Rows per request; a 90 day window of two datatypes fits comfortably.
pub const PAGE_LIMIT: u32 = 1000;

/// Builds the request URL for TMAX/TMIN readings at `station_id` over `range`.
///
/// The token is not part of the URL; it is attached by the
/// [`ApiKey`](crate::fetch::auth::ApiKey) client wrapper.
pub fn weather_url(base: &str, station_id: &str, range: &DateRange) -> Result<Url> {
    let start = range.start_str();
    let end = range.end_str();
    let datatypes = format!("{TMAX},{TMIN}");
    let limit = PAGE_LIMIT.to_string();

    let params = [
        ("datasetid", DATASET_ID),
        ("stationid", station_id),
        ("startdate", start.as_str()),
        ("enddate", end.as_str()),
        ("datatypeid", datatypes.as_str()),
        ("limit", limit.as_str()),
    ];

    Url::parse_with_params(base, &params)
        .map_err(|e| PipelineError::Config(format!("invalid weather API url '{base}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_weather_url_carries_station_range_and_datatypes() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
        )
        .unwrap();

        let url = weather_url(WEATHER_API_URL, "GHCND:USW00094728", &range).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("stationid".into(), "GHCND:USW00094728".into())));
        assert!(pairs.contains(&("startdate".into(), "2023-01-01".into())));
        assert!(pairs.contains(&("enddate".into(), "2023-03-31".into())));
        assert!(pairs.contains(&("datatypeid".into(), "TMAX,TMIN".into())));
        assert!(pairs.contains(&("limit".into(), "1000".into())));
        assert!(!url.as_str().contains("token"));
    }
}
