//! Sequences one run: fetch → normalize/join → quality report.
//!
//! Every step isolates failures to the narrowest unit (one city, one source,
//! one file) and logs them with that context. Only configuration problems
//! are returned to the caller.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::analyzers::patterns::{
    demand_heatmap, seasonal_demand, temperature_energy_correlation, weekday_vs_weekend,
};
use crate::analyzers::{quality, report};
use crate::config::{CityConfig, Settings};
use crate::dates::DateRange;
use crate::error::{PipelineError, Result};
use crate::fetch::auth::{ApiKey, UrlParam};
use crate::fetch::{BasicClient, HttpClient, RetryPolicy, fetch_json};
use crate::join::{JoinCoverage, JoinOutcome, join};
use crate::normalize::{Normalized, normalize_demand, normalize_weather};
use crate::output;
use crate::sources::demand::{API_KEY_PARAM, DEMAND_API_URL, demand_url};
use crate::sources::weather::{TOKEN_HEADER, WEATHER_API_URL, weather_url};
use crate::sources::Source;
use crate::stats::FetchStats;
use crate::storage::RawStore;

/// Base URLs of the two upstream APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub weather: String,
    pub demand: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather: WEATHER_API_URL.to_string(),
            demand: DEMAND_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub saved: usize,
    pub empty: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessSummary {
    pub cities_processed: usize,
    pub cities_skipped: usize,
    pub coverage: Vec<JoinCoverage>,
}

fn client_error(e: reqwest::Error) -> PipelineError {
    PipelineError::Config(format!("cannot build HTTP client: {e}"))
}

/// Fetches both sources for every city over `range` and saves non-empty
/// payloads to raw storage. Each attempt is appended to the fetch history.
///
/// # Errors
///
/// Only [`PipelineError::Config`]: missing credentials or an unusable
/// endpoint. Per-city failures are logged and counted instead.
pub async fn fetch_all(
    settings: &Settings,
    endpoints: &Endpoints,
    range: &DateRange,
) -> Result<FetchSummary> {
    let credentials = settings
        .credentials
        .as_ref()
        .ok_or_else(|| PipelineError::Config("API credentials are required to fetch".into()))?;

    let weather_client = ApiKey::new(
        BasicClient::new().map_err(client_error)?,
        TOKEN_HEADER,
        &credentials.weather_token,
    )?;
    let demand_client = UrlParam::new(
        BasicClient::new().map_err(client_error)?,
        API_KEY_PARAM,
        &credentials.demand_api_key,
    );

    let store = RawStore::new(&settings.paths.raw_dir);
    let history = settings.paths.fetch_history_file();
    let mut summary = FetchSummary::default();

    info!(cities = settings.cities.len(), %range, "Starting data fetch");

    for city in &settings.cities {
        for source in Source::ALL {
            let outcome = match source {
                Source::Weather => {
                    let url = weather_url(&endpoints.weather, &city.weather_station_id, range)?;
                    fetch_source(&weather_client, &settings.retry, &url, source, city, range, &store)
                        .await
                }
                Source::Demand => {
                    let url = demand_url(&endpoints.demand, &city.demand_region_code, range)?;
                    fetch_source(&demand_client, &settings.retry, &url, source, city, range, &store)
                        .await
                }
            };

            let stats = match outcome {
                Ok(Some(records)) => {
                    summary.saved += 1;
                    FetchStats::saved(records)
                }
                Ok(None) => {
                    summary.empty += 1;
                    FetchStats::empty()
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(city = %city.name, %source, error = %e, "Fetch failed, skipping");
                    FetchStats::from_error(&e)
                }
            }
            .with_target(&city.name, source, range);

            if let Err(e) = output::append_fetch_record(&history, &stats) {
                warn!(path = %history.display(), error = %e, "Failed to record fetch history");
            }
        }
    }

    info!(
        saved = summary.saved,
        empty = summary.empty,
        failed = summary.failed,
        "Data fetch complete"
    );
    Ok(summary)
}

/// One request with retry; `Some(rows)` when a payload was saved.
#[tracing::instrument(skip_all, fields(city = %city.name, source = %source))]
async fn fetch_source<C: HttpClient>(
    client: &C,
    policy: &RetryPolicy,
    url: &reqwest::Url,
    source: Source,
    city: &CityConfig,
    range: &DateRange,
    store: &RawStore,
) -> Result<Option<usize>> {
    let payload = fetch_json(client, policy, url).await?;

    if !source.has_payload(&payload) {
        warn!("Response had no rows, nothing saved");
        return Ok(None);
    }

    store.save(source, &city.name, range, &payload)?;
    Ok(Some(source.record_count(&payload)))
}

/// Normalizes and joins the latest raw files of every city, writing one
/// processed CSV per city and the join coverage of the run.
pub fn process_all(settings: &Settings) -> Result<ProcessSummary> {
    let store = RawStore::new(&settings.paths.raw_dir);
    let mut summary = ProcessSummary::default();

    for city in &settings.cities {
        let outcome = match process_city(&store, &city.name) {
            Ok(outcome) => outcome,
            Err(e) => {
                summary.cities_skipped += 1;
                match &e {
                    PipelineError::EmptyData { .. } => {
                        warn!(city = %city.name, error = %e, "Skipping city")
                    }
                    _ => error!(city = %city.name, error = %e, "Skipping city"),
                }
                discard_stale(&settings.paths.processed_dir, &city.name);
                continue;
            }
        };

        match output::write_processed(&settings.paths.processed_dir, &city.name, &outcome.records) {
            Ok(_) => {
                summary.cities_processed += 1;
                summary.coverage.push(outcome.coverage);
            }
            Err(e) => {
                summary.cities_skipped += 1;
                error!(city = %city.name, error = %e, "Failed to write processed data");
                discard_stale(&settings.paths.processed_dir, &city.name);
            }
        }
    }

    output::write_join_coverage(&settings.paths.join_coverage_file(), &summary.coverage)?;

    info!(
        processed = summary.cities_processed,
        skipped = summary.cities_skipped,
        "Processing complete"
    );
    Ok(summary)
}

/// A skipped city must not keep output from an earlier run.
fn discard_stale(processed_dir: &Path, city: &str) {
    if let Err(e) = output::remove_processed(processed_dir, city) {
        error!(city, error = %e, "Failed to remove stale processed data");
    }
}

#[tracing::instrument(skip(store))]
fn process_city(store: &RawStore, city: &str) -> Result<JoinOutcome> {
    let (weather, weather_path) = load_latest(store, Source::Weather, city)?;
    let (demand, demand_path) = load_latest(store, Source::Demand, city)?;

    let weather = match normalize_weather(&weather, &weather_path) {
        Normalized::Records(records) => records,
        Normalized::Empty => {
            return Err(PipelineError::EmptyData {
                origin: Source::Weather,
                path: weather_path,
            });
        }
    };
    let demand = match normalize_demand(&demand, &demand_path) {
        Normalized::Records(records) => records,
        Normalized::Empty => {
            return Err(PipelineError::EmptyData {
                origin: Source::Demand,
                path: demand_path,
            });
        }
    };

    join(&weather, &demand, city)
}

fn load_latest(store: &RawStore, source: Source, city: &str) -> Result<(Value, PathBuf)> {
    let path = store
        .latest(source, city)?
        .ok_or_else(|| PipelineError::EmptyData {
            origin: source,
            path: store.dir().to_path_buf(),
        })?;
    let payload = store.load(&path)?;
    Ok((payload, path))
}

/// Analyzes every processed file and writes the text report.
///
/// Returns the report path, or `None` when there was nothing to analyze.
pub fn quality_report(settings: &Settings, generated_at: NaiveDateTime) -> Result<Option<PathBuf>> {
    let paths = &settings.paths;
    let (records, files) = output::read_processed_dir(&paths.processed_dir)?;
    if files == 0 {
        error!(dir = %paths.processed_dir.display(), "No processed data files found, report not written");
        return Ok(None);
    }

    let coverage = output::read_join_coverage(&paths.join_coverage_file()).unwrap_or_else(|e| {
        warn!(error = %e, "Join coverage unreadable, section left empty");
        Vec::new()
    });

    let report = quality::analyze(&records, generated_at.date()).with_join_coverage(coverage);
    let text = report::render(&report, generated_at);

    let path = paths.report_file();
    output::write_report(&path, &text)?;
    Ok(Some(path))
}

/// Pattern analysis over every processed file, rendered as text.
pub fn analyze_patterns(processed_dir: &Path) -> Result<Option<String>> {
    let (records, files) = output::read_processed_dir(processed_dir)?;
    if files == 0 {
        error!(dir = %processed_dir.display(), "No processed data files found");
        return Ok(None);
    }

    let correlation = temperature_energy_correlation(&records);
    if let Some(c) = correlation {
        info!(r = c.r, r_squared = c.r_squared, samples = c.samples, "Temperature/demand correlation");
    }

    Ok(Some(report::render_patterns(
        correlation,
        &weekday_vs_weekend(&records),
        &seasonal_demand(&records),
        &demand_heatmap(&records),
    )))
}

/// The full pipeline. With `range` set, data is fetched first; otherwise
/// whatever raw files are on disk are processed.
pub async fn run(
    settings: &Settings,
    endpoints: &Endpoints,
    range: Option<&DateRange>,
) -> Result<Option<PathBuf>> {
    settings.paths.ensure()?;

    match range {
        Some(range) => {
            fetch_all(settings, endpoints, range).await?;
        }
        None => info!("Skipping fetch, using raw files on disk"),
    }

    process_all(settings)?;
    quality_report(settings, Local::now().naive_local())
}
