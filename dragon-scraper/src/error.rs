use std::io;

use chrono::NaiveDate;
use dragon_core::YearMonth;
use dragon_store::StoreError;

/// Errors from the cached fetcher.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cache I/O error on {path}: {source}")]
    Cache { path: String, source: io::Error },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl FetchError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// Errors that abort a single game's crawl.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    #[error("No months to crawl: range starts at {first} but ends before {cutoff}")]
    NoMonths { first: YearMonth, cutoff: NaiveDate },
}

/// Errors loading the override table. Any of these is fatal for a run.
#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    #[error("I/O error reading {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error("JSON parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("{path}: expected a JSON array of {{name, normalized}} objects")]
    NotAList { path: String },

    #[error("{path}: entry {index} is missing string key '{key}'")]
    MissingKey {
        path: String,
        index: usize,
        key: &'static str,
    },
}
