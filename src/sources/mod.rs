//! The two upstream APIs and how to ask them for a city's data.

pub mod demand;
pub mod weather;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which upstream a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Weather,
    Demand,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Weather, Source::Demand];

    /// Prefix used in raw file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Weather => "weather",
            Source::Demand => "demand",
        }
    }

    /// Length of the payload's row list; zero when the list is absent.
    pub fn record_count(&self, value: &serde_json::Value) -> usize {
        let list = match self {
            Source::Weather => value.get("results"),
            Source::Demand => value.get("response").and_then(|r| r.get("data")),
        };
        list.and_then(|v| v.as_array()).map_or(0, Vec::len)
    }

    /// Whether the expected row list is present and non-empty; only such
    /// payloads are kept.
    pub fn has_payload(&self, value: &serde_json::Value) -> bool {
        self.record_count(value) > 0
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
