//! The persisted per-game time series.

use serde::{Deserialize, Deserializer, Serialize};

use crate::entry::MonthlyEntry;
use crate::error::DocumentError;

/// Identity block stored under `meta-data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMeta {
    /// Name as received from the external catalog.
    #[serde(rename = "streamcamel_name")]
    pub source_name: String,
    /// Normalized slug used in fetch URLs.
    #[serde(rename = "sullygnome_name")]
    pub canonical_name: String,
    /// Opaque external identifier; required later by the loader.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opaque_id"
    )]
    pub game_id: Option<String>,
}

/// A complete game document: metadata plus chronological monthly entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDocument {
    #[serde(rename = "data")]
    pub entries: Vec<MonthlyEntry>,
    #[serde(rename = "meta-data")]
    pub meta: GameMeta,
}

impl GameDocument {
    pub fn new(meta: GameMeta) -> Self {
        Self {
            entries: Vec::new(),
            meta,
        }
    }

    /// The error entry, if the crawl that produced this document aborted.
    pub fn failure(&self) -> Option<&MonthlyEntry> {
        self.entries.iter().find(|e| e.is_error())
    }

    /// True when no entry carries an error marker.
    pub fn is_complete(&self) -> bool {
        self.failure().is_none()
    }

    /// Check the ordering invariants: months are consecutive and an error
    /// entry, if any, is the last one.
    pub fn validate(&self) -> Result<(), DocumentError> {
        let mut previous: Option<&MonthlyEntry> = None;
        for entry in &self.entries {
            if let Some(prev) = previous {
                if prev.is_error() {
                    return Err(DocumentError::EntryAfterError {
                        date: entry.date.to_string(),
                    });
                }
                if prev.date.next() != Some(entry.date) {
                    return Err(DocumentError::NotConsecutive {
                        previous: prev.date.to_string(),
                        date: entry.date.to_string(),
                    });
                }
            }
            previous = Some(entry);
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(i64),
}

/// Accept identifiers written either as strings or as bare numbers.
pub fn opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<IdRepr>::deserialize(deserializer)?.map(|id| match id {
            IdRepr::Text(s) => s,
            IdRepr::Number(n) => n.to_string(),
        }),
    )
}

#[cfg(test)]
#[path = "tests/document_tests.rs"]
mod tests;
