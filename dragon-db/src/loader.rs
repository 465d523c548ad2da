//! Batch upsert of stored game documents into the fact table.
//!
//! Every document in the store is read leniently and checked field by field.
//! Documents or entries that fail a check are logged and skipped; everything
//! that passes goes into one transaction through a single prepared upsert,
//! so a run either commits all of its records or none of them.

use std::path::Path;

use chrono::NaiveDate;
use dragon_core::{FactRecord, YearMonth};
use dragon_store::{DocumentStore, RawDocument, RawEntry, StoreError};
use rusqlite::{Connection, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot list documents: {0}")]
    Store(#[from] StoreError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Counts from one loader run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub documents_seen: usize,
    pub documents_skipped: usize,
    pub entries_skipped: usize,
    pub records_upserted: usize,
}

const UPSERT_SQL: &str = "INSERT INTO games_monthly_viewers
         (game_id, month, viewer_count, viewer_count_peak, stream_count)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(game_id, month) DO UPDATE SET
         viewer_count = excluded.viewer_count,
         viewer_count_peak = excluded.viewer_count_peak,
         stream_count = excluded.stream_count,
         updated_at = datetime('now')";

/// Why a whole document was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSkip {
    MissingData,
    MissingMeta,
    MissingGameId,
}

impl std::fmt::Display for DocumentSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentSkip::MissingData => write!(f, "no 'data' array"),
            DocumentSkip::MissingMeta => write!(f, "no 'meta-data' object"),
            DocumentSkip::MissingGameId => write!(f, "no game_id in meta-data"),
        }
    }
}

/// Why a single entry was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySkip {
    Error(String),
    MissingDate,
    BadDate(String),
    MissingField(&'static str),
    Negative(&'static str),
}

impl std::fmt::Display for EntrySkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntrySkip::Error(reason) => write!(f, "recorded error '{reason}'"),
            EntrySkip::MissingDate => write!(f, "missing date"),
            EntrySkip::BadDate(date) => write!(f, "unparseable date '{date}'"),
            EntrySkip::MissingField(field) => write!(f, "missing {field}"),
            EntrySkip::Negative(field) => write!(f, "negative {field}"),
        }
    }
}

/// Convert one lenient entry into a fact record for `game_id`.
pub fn entry_to_fact(game_id: &str, entry: &RawEntry) -> Result<FactRecord, EntrySkip> {
    if let Some(reason) = &entry.error {
        return Err(EntrySkip::Error(reason.clone()));
    }
    let date = entry.date.as_deref().ok_or(EntrySkip::MissingDate)?;
    let month: YearMonth = date
        .parse()
        .map_err(|_| EntrySkip::BadDate(date.to_string()))?;

    let metric = |value: Option<i64>, field: &'static str| match value {
        None => Err(EntrySkip::MissingField(field)),
        Some(v) if v < 0 => Err(EntrySkip::Negative(field)),
        Some(v) => Ok(v),
    };

    Ok(FactRecord {
        game_id: game_id.to_string(),
        month: month.first_day(),
        viewer_count: metric(entry.average_viewers, "average_viewers")?,
        stream_count: metric(entry.average_channels, "average_channels")?,
        viewer_count_peak: metric(entry.peak_viewers, "peak_viewers")?,
    })
}

/// Fact records for every usable entry of a document, plus the number of
/// entries skipped. Skips are logged against `origin`.
pub fn document_facts(
    origin: &Path,
    doc: &RawDocument,
) -> Result<(Vec<FactRecord>, usize), DocumentSkip> {
    let data = doc.data.as_ref().ok_or(DocumentSkip::MissingData)?;
    let meta = doc.meta.as_ref().ok_or(DocumentSkip::MissingMeta)?;
    let game_id = meta
        .game_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or(DocumentSkip::MissingGameId)?;

    let mut facts = Vec::with_capacity(data.len());
    let mut skipped = 0;
    for entry in data {
        match entry_to_fact(game_id, entry) {
            Ok(fact) => facts.push(fact),
            Err(reason) => {
                log::warn!(
                    "{}: skipping entry {}: {reason}",
                    origin.display(),
                    entry.date.as_deref().unwrap_or("?")
                );
                skipped += 1;
            }
        }
    }
    Ok((facts, skipped))
}

/// Load every document in `store` into the fact table in one transaction.
pub fn load_all(store: &DocumentStore, conn: &mut Connection) -> Result<LoadReport, LoadError> {
    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for path in store.document_paths()? {
        report.documents_seen += 1;
        let doc = match DocumentStore::read_raw(&path) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("Skipping unreadable document: {e}");
                report.documents_skipped += 1;
                continue;
            }
        };
        match document_facts(&path, &doc) {
            Ok((facts, skipped)) => {
                report.entries_skipped += skipped;
                records.extend(facts);
            }
            Err(reason) => {
                log::warn!("Skipping {}: {reason}", path.display());
                report.documents_skipped += 1;
            }
        }
    }

    report.records_upserted = upsert_facts(conn, &records)?;
    log::info!(
        "Upserted {} records from {} documents ({} skipped)",
        report.records_upserted,
        report.documents_seen - report.documents_skipped,
        report.documents_skipped
    );
    Ok(report)
}

/// Upsert `records` in a single transaction. Nothing is committed on error.
pub fn upsert_facts(conn: &mut Connection, records: &[FactRecord]) -> Result<usize, LoadError> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(UPSERT_SQL)?;
        for r in records {
            stmt.execute(params![
                r.game_id,
                month_key(r.month),
                r.viewer_count,
                r.viewer_count_peak,
                r.stream_count,
            ])?;
        }
    }
    tx.commit()?;
    Ok(records.len())
}

/// Stored form of a month: its first day as `YYYY-MM-DD`.
pub fn month_key(month: NaiveDate) -> String {
    month.format("%Y-%m-%d").to_string()
}
