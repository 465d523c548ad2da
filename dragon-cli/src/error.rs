use std::path::Path;

use thiserror::Error;

use dragon_db::{LoadError, MissingEnv, SchemaError};
use dragon_scraper::{FetchError, LocatorError, OverrideError};
use dragon_store::StoreError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Override table is malformed
    #[error("Override table error: {0}")]
    Overrides(#[from] OverrideError),

    /// Database environment incomplete
    #[error("{0}")]
    Environment(#[from] MissingEnv),

    /// Database could not be opened or written
    #[error("Database error: {0}")]
    Database(String),

    /// Catalog file could not be read
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Locator(#[from] LocatorError),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub(crate) fn catalog(path: &Path, msg: impl std::fmt::Display) -> Self {
        Self::Catalog(format!("{}: {msg}", path.display()))
    }

    /// Process exit status for this error. 2 is left to clap for usage
    /// errors.
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            CliError::Environment(_) => 3,
            CliError::Overrides(_) => 4,
            CliError::Database(_) => 5,
            _ => 1,
        }
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::database(e.to_string())
    }
}

impl From<LoadError> for CliError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Store(e) => Self::Store(e),
            LoadError::Sqlite(e) => Self::database(e.to_string()),
        }
    }
}
