//! Error taxonomy for the pipeline.
//!
//! Only [`PipelineError::Config`] is meant to stop a run. Everything else is
//! caught at the narrowest unit (one city, one source, one file), logged, and
//! the run moves on.

use std::path::PathBuf;

use thiserror::Error;

use crate::sources::Source;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network request failed for {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Could not read or parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("No {origin} data in '{}'", path.display())]
    EmptyData { origin: Source, path: PathBuf },

    #[error("Cannot join data for {city}: {side} input is empty")]
    EmptyInput { city: String, side: Source },

    #[error("Upload of '{key}' failed: {message}")]
    Publish { key: String, message: String },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Whether the retry policy should try the operation again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PipelineError::Network { .. } | PipelineError::HttpStatus { .. }
        )
    }

    /// Short machine-friendly label, used in the fetch history file.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Config(_) => "config_error",
            PipelineError::Network { .. } | PipelineError::HttpStatus { .. } => "network_error",
            PipelineError::Parse { .. } => "parse_error",
            PipelineError::EmptyData { .. } => "empty_data",
            PipelineError::EmptyInput { .. } => "empty_input",
            PipelineError::Publish { .. } => "publish_error",
            PipelineError::Io(_) => "io_error",
            PipelineError::Csv(_) => "csv_error",
            PipelineError::Json(_) => "json_error",
        }
    }
}
