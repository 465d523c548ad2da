//! Shared data model for the viewership harvester.
//!
//! Everything that crosses a crate boundary lives here: calendar months,
//! per-month metric entries, the persisted per-game document, fact records
//! destined for the relational sink, and catalog input records.

pub mod catalog;
pub mod document;
pub mod entry;
pub mod error;
pub mod fact;
pub mod month;
pub mod util;

pub use catalog::{CatalogGame, filter_by_company};
pub use document::{GameDocument, GameMeta};
pub use entry::{Measurement, Metrics, MonthlyEntry, PARSE_ERROR};
pub use error::DocumentError;
pub use fact::FactRecord;
pub use month::{MonthRange, YearMonth, crawl_cutoff};
