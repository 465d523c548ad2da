//! Database connection settings, read from the environment.

use std::path::PathBuf;

use rusqlite::Connection;
use thiserror::Error;

use crate::schema::{SchemaError, open_database};

pub const ENV_HOST: &str = "SCRATCH_DB_HOST";
pub const ENV_NAME: &str = "SCRATCH_DB_NAME";
pub const ENV_USER: &str = "SCRATCH_DB_USER";
pub const ENV_PASSWORD: &str = "SCRATCH_DB_PASSWORD";

#[derive(Debug, Error)]
#[error("Missing required environment variable(s): {}", .missing.join(", "))]
pub struct MissingEnv {
    pub missing: Vec<&'static str>,
}

/// Where the fact table lives.
///
/// SQLite has no server or accounts: `host` is the directory holding the
/// database file and `name` its stem. `user` and `password` are still
/// required so the same environment works against a networked engine.
#[derive(Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl DatabaseSettings {
    /// Read all four `SCRATCH_DB_*` variables, reporting every missing one.
    pub fn from_env() -> Result<Self, MissingEnv> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    /// Empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MissingEnv> {
        let mut missing = Vec::new();
        let mut get = |key: &'static str| match lookup(key).filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => {
                missing.push(key);
                String::new()
            }
        };
        let host = get(ENV_HOST);
        let name = get(ENV_NAME);
        let user = get(ENV_USER);
        let password = get(ENV_PASSWORD);

        if !missing.is_empty() {
            return Err(MissingEnv { missing });
        }
        Ok(Self {
            host,
            name,
            user,
            password,
        })
    }

    /// `<host>/<name>.sqlite`
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.host).join(format!("{}.sqlite", self.name))
    }

    /// Open the database, creating the directory and schema as needed.
    pub fn connect(&self) -> Result<Connection, SchemaError> {
        let path = self.database_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        log::debug!("Opening database {} as {}", path.display(), self.user);
        open_database(&path)
    }
}
