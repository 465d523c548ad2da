//! On-disk store of per-game documents.
//!
//! One pretty-printed JSON file per canonical slug, `<dir>/<slug>.json`.
//! The crawler owns writes; the loader reads through the lenient
//! [`RawDocument`] view so it can validate field by field.

pub mod raw;
pub mod store;

pub use raw::{RawDocument, RawEntry, RawMeta};
pub use store::{DEFAULT_OUTPUT_DIR, DocumentStore, StoreError};
