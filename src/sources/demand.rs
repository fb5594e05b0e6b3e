//! Region-scoped daily electricity demand endpoint (EIA v2 RTO daily data).

use reqwest::Url;

use crate::dates::DateRange;
use crate::error::{PipelineError, Result};

pub const DEMAND_API_URL: &str = "https://api.eia.gov/v2/electricity/rto/daily-region-data/data/";

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "api_key";

/// Maximum rows returned in one response.
pub const ROW_WINDOW: u32 = 5000;

/// Builds the request URL for daily demand rows of `region_code` over
/// `range`, sorted by period ascending.
pub fn demand_url(base: &str, region_code: &str, range: &DateRange) -> Result<Url> {
    let start = range.start_str();
    let end = range.end_str();
    let length = ROW_WINDOW.to_string();

    let params = [
        ("frequency", "daily"),
        ("data[0]", "value"),
        ("facets[respondent][]", region_code),
        ("start", start.as_str()),
        ("end", end.as_str()),
        ("sort[0][column]", "period"),
        ("sort[0][direction]", "asc"),
        ("offset", "0"),
        ("length", length.as_str()),
    ];

    Url::parse_with_params(base, &params)
        .map_err(|e| PipelineError::Config(format!("invalid demand API url '{base}': {e}")))
}
