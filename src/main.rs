//! CLI entry point for the weather/energy pipeline.
//!
//! Provides subcommands for the full run and for each of its steps (fetch,
//! process, report), plus pattern analysis and S3 publishing.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use weather_energy_pipeline::{
    config::{
        AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_DATA_DIR, DEFAULT_LOGS_DIR, DEFAULT_REPORTS_DIR,
        DataPaths, Settings,
    },
    dates::{DEFAULT_WINDOW_DAYS, DateWindow, parse_cli_date},
    infra::keys::EnvKeyStore,
    pipeline::{self, Endpoints},
    publish::publish,
};

#[derive(Parser)]
#[command(name = "weather_energy_pipeline")]
#[command(about = "Fetch, reconcile and quality-check daily weather and electricity demand", long_about = None)]
struct Cli {
    /// City configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Root for raw and processed data
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Where the quality report is written
    #[arg(long, global = true, default_value = DEFAULT_REPORTS_DIR)]
    reports_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
struct WindowArgs {
    /// Trailing window of N days ending today
    #[arg(long, conflicts_with_all = ["start_date", "end_date", "two_weeks_ahead"])]
    days: Option<u64>,

    /// First day to fetch (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    start_date: Option<NaiveDate>,

    /// Last day to fetch (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    end_date: Option<NaiveDate>,

    /// Today through two weeks from today
    #[arg(long, conflicts_with_all = ["start_date", "end_date"])]
    two_weeks_ahead: bool,
}

impl WindowArgs {
    fn window(&self) -> DateWindow {
        if let Some(days) = self.days {
            DateWindow::Days(days)
        } else if self.two_weeks_ahead {
            DateWindow::LookAhead
        } else if self.start_date.is_some() || self.end_date.is_some() {
            DateWindow::Range {
                start: self.start_date,
                end: self.end_date,
            }
        } else {
            DateWindow::Days(DEFAULT_WINDOW_DAYS)
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, process and report in one go
    Run {
        #[command(flatten)]
        window: WindowArgs,

        /// Reuse raw files already on disk instead of fetching
        #[arg(long, default_value_t = false)]
        skip_fetch: bool,
    },
    /// Fetch raw weather and demand data for every city
    Fetch {
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Normalize and join the latest raw files into per-city CSVs
    Process,
    /// Write the data quality report from processed CSVs
    Report,
    /// Print temperature/demand pattern analysis of processed CSVs
    Analyze,
    /// Upload processed data and the report to S3
    Publish {
        /// S3 bucket name (e.g., "my-bucket")
        #[arg(long)]
        s3_bucket: String,

        /// Gzip compress files before uploading
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

/// Directory holding the JSON log; the fetch history is written there too.
fn log_dir_of(log_file_path: &Path) -> &Path {
    match log_file_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new(DEFAULT_LOGS_DIR),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/pipeline.log".to_string());
    let log_dir = log_dir_of(Path::new(&log_file_path));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("pipeline.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)?;
    let paths = DataPaths::new(&cli.data_dir, &cli.reports_dir, log_dir);
    paths.ensure()?;
    let endpoints = Endpoints::default();
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Run { window, skip_fetch } => {
            if skip_fetch {
                let settings = Settings::offline(config, paths);
                pipeline::run(&settings, &endpoints, None).await?;
            } else {
                let range = window.window().resolve(today)?;
                let settings = Settings::online(config, paths, &EnvKeyStore).await?;
                pipeline::run(&settings, &endpoints, Some(&range)).await?;
            }
        }
        Commands::Fetch { window } => {
            let range = window.window().resolve(today)?;
            let settings = Settings::online(config, paths, &EnvKeyStore).await?;
            pipeline::fetch_all(&settings, &endpoints, &range).await?;
        }
        Commands::Process => {
            let settings = Settings::offline(config, paths);
            pipeline::process_all(&settings)?;
        }
        Commands::Report => {
            let settings = Settings::offline(config, paths);
            pipeline::quality_report(&settings, Local::now().naive_local())?;
        }
        Commands::Analyze => {
            if let Some(text) = pipeline::analyze_patterns(&paths.processed_dir)? {
                println!("{text}");
            }
        }
        Commands::Publish { s3_bucket, gzip } => {
            if s3_bucket.is_empty() {
                info!("S3 bucket not specified, skipping upload");
            } else {
                let aws = aws_config::load_from_env().await;
                let client = aws_sdk_s3::Client::new(&aws);
                info!(bucket = %s3_bucket, gzip, "S3 upload enabled");
                publish(&client, &s3_bucket, &paths, gzip).await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_default_window_when_no_flags() {
        let cli = parse(&["weather_energy_pipeline", "run"]);
        let Commands::Run { window, skip_fetch } = cli.command else {
            panic!("expected run");
        };
        assert!(!skip_fetch);
        assert_eq!(window.window(), DateWindow::Days(DEFAULT_WINDOW_DAYS));
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_window_modes() {
        let cli = parse(&["weather_energy_pipeline", "fetch", "--start-date", "2023-01-01"]);
        let Commands::Fetch { window } = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(
            window.window(),
            DateWindow::Range {
                start: NaiveDate::from_ymd_opt(2023, 1, 1),
                end: None
            }
        );

        let cli = parse(&["weather_energy_pipeline", "run", "--two-weeks-ahead", "--skip-fetch"]);
        let Commands::Run { window, skip_fetch } = cli.command else {
            panic!("expected run");
        };
        assert!(skip_fetch);
        assert_eq!(window.window(), DateWindow::LookAhead);
    }

    #[test]
    fn test_conflicting_window_flags_rejected() {
        assert!(
            Cli::try_parse_from(["weather_energy_pipeline", "run", "--days", "7", "--two-weeks-ahead"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["weather_energy_pipeline", "fetch", "--start-date", "01/02/2023"]).is_err());
    }

    #[test]
    fn test_fetch_history_follows_log_file_location() {
        let log_dir = log_dir_of(Path::new("/var/log/pipeline/run.log"));
        assert_eq!(log_dir, Path::new("/var/log/pipeline"));

        let paths = DataPaths::new(Path::new("data"), Path::new("reports"), log_dir);
        assert_eq!(
            paths.fetch_history_file(),
            PathBuf::from("/var/log/pipeline/fetch_history.csv")
        );

        assert_eq!(log_dir_of(Path::new("run.log")), Path::new(DEFAULT_LOGS_DIR));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["weather_energy_pipeline", "report", "--data-dir", "/tmp/d"]);
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/d"));
    }
}
