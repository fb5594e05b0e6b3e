use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::DateRange;
use crate::error::PipelineError;
use crate::sources::Source;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// Payload had rows and was written to raw storage.
    Saved,
    /// Request succeeded but the payload had nothing in it.
    Empty,
    #[default]
    Failed,
}

/// One row of the fetch history: the outcome of fetching one source for one city.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchStats {
    pub timestamp: DateTime<Utc>,
    pub city: String,
    pub source: Option<Source>,
    pub date_range: String,
    pub status: FetchStatus,
    /// Rows in the payload's list.
    pub records: usize,

    // error tracking
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl FetchStats {
    pub fn saved(records: usize) -> Self {
        FetchStats {
            timestamp: Utc::now(),
            status: FetchStatus::Saved,
            records,
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        FetchStats {
            timestamp: Utc::now(),
            status: FetchStatus::Empty,
            ..Default::default()
        }
    }

    /// Create an error record with timestamp and error information
    pub fn from_error(err: &PipelineError) -> Self {
        FetchStats {
            timestamp: Utc::now(),
            status: FetchStatus::Failed,
            error_type: Some(err.kind().to_string()),
            error_message: Some(err.to_string()),
            ..Default::default()
        }
    }

    /// Set what was fetched
    pub fn with_target(mut self, city: &str, source: Source, range: &DateRange) -> Self {
        self.city = city.to_string();
        self.source = Some(source);
        self.date_range = range.to_string();
        self
    }
}
