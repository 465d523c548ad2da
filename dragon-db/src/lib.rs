//! SQLite sink for monthly viewership facts.
//!
//! Provides schema creation, environment-driven connection settings, the
//! batch upsert loader, and read queries, backed by SQLite (via rusqlite with
//! the bundled feature).

pub mod loader;
pub mod queries;
pub mod schema;
pub mod settings;

pub use loader::{
    DocumentSkip, EntrySkip, LoadError, LoadReport, document_facts, entry_to_fact, load_all,
    upsert_facts,
};
pub use queries::{FactStats, fact_stats, facts_for_game, find_fact};
pub use schema::{SchemaError, open_database, open_memory};
pub use settings::{DatabaseSettings, MissingEnv};
