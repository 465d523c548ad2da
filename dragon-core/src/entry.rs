//! One month's measurement for one game.

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::month::YearMonth;

/// Error marker written when a month's page could not be read.
pub const PARSE_ERROR: &str = "HTML Parse Error";

/// The three metrics the analytics site reports per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub average_viewers: u64,
    pub average_channels: u64,
    pub peak_viewers: u64,
}

/// Either a full metric set or the reason it could not be determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Measurement {
    Recorded(Metrics),
    Failed(String),
}

/// A month's entry in a game document.
///
/// On disk this is a flat object: `date` plus either the three metric fields
/// or a single `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntryRecord", into = "EntryRecord")]
pub struct MonthlyEntry {
    pub date: YearMonth,
    pub measurement: Measurement,
}

impl MonthlyEntry {
    pub fn recorded(date: YearMonth, metrics: Metrics) -> Self {
        Self {
            date,
            measurement: Measurement::Recorded(metrics),
        }
    }

    pub fn failed(date: YearMonth, reason: impl Into<String>) -> Self {
        Self {
            date,
            measurement: Measurement::Failed(reason.into()),
        }
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        match &self.measurement {
            Measurement::Recorded(m) => Some(m),
            Measurement::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.measurement {
            Measurement::Recorded(_) => None,
            Measurement::Failed(reason) => Some(reason),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.measurement, Measurement::Failed(_))
    }
}

/// Flat serialized form of [`MonthlyEntry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryRecord {
    date: YearMonth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    average_viewers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    average_channels: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    peak_viewers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TryFrom<EntryRecord> for MonthlyEntry {
    type Error = DocumentError;

    fn try_from(record: EntryRecord) -> Result<Self, Self::Error> {
        let date = record.date;
        let any_metric = record.average_viewers.is_some()
            || record.average_channels.is_some()
            || record.peak_viewers.is_some();

        if let Some(error) = record.error {
            if any_metric {
                return Err(DocumentError::MetricsAndError {
                    date: date.to_string(),
                });
            }
            return Ok(Self::failed(date, error));
        }

        let missing = |field| DocumentError::MissingField {
            date: date.to_string(),
            field,
        };
        let metrics = Metrics {
            average_viewers: record.average_viewers.ok_or_else(|| missing("average_viewers"))?,
            average_channels: record
                .average_channels
                .ok_or_else(|| missing("average_channels"))?,
            peak_viewers: record.peak_viewers.ok_or_else(|| missing("peak_viewers"))?,
        };
        Ok(Self::recorded(date, metrics))
    }
}

impl From<MonthlyEntry> for EntryRecord {
    fn from(entry: MonthlyEntry) -> Self {
        match entry.measurement {
            Measurement::Recorded(m) => EntryRecord {
                date: entry.date,
                average_viewers: Some(m.average_viewers),
                average_channels: Some(m.average_channels),
                peak_viewers: Some(m.peak_viewers),
                error: None,
            },
            Measurement::Failed(reason) => EntryRecord {
                date: entry.date,
                average_viewers: None,
                average_channels: None,
                peak_viewers: None,
                error: Some(reason),
            },
        }
    }
}

#[cfg(test)]
#[path = "tests/entry_tests.rs"]
mod tests;
