//! Reading and writing game documents.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dragon_core::{DocumentError, GameDocument};
use serde::Serialize;
use thiserror::Error;

use crate::raw::RawDocument;

/// Where documents live unless configured otherwise.
pub const DEFAULT_OUTPUT_DIR: &str = "output/games";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("Invalid document {path}: {source}")]
    Invalid {
        path: String,
        source: DocumentError,
    },

    #[error("Slug '{0}' cannot be used as a file name")]
    InvalidSlug(String),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.display().to_string(),
            source,
        }
    }
}

/// A directory of `<slug>.json` game documents.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `slug`.
    pub fn path_for(&self, slug: &str) -> Result<PathBuf, StoreError> {
        if slug.is_empty()
            || slug.starts_with('.')
            || slug.contains(['/', '\\'])
            || slug.contains('\0')
        {
            return Err(StoreError::InvalidSlug(slug.to_string()));
        }
        Ok(self.dir.join(format!("{slug}.json")))
    }

    /// Replace the document for `slug`.
    ///
    /// The file is written beside its final location and renamed into place,
    /// so a reader never observes a half-written document.
    pub fn write(&self, slug: &str, doc: &GameDocument) -> Result<PathBuf, StoreError> {
        let path = self.path_for(slug)?;
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        doc.serialize(&mut ser)
            .map_err(|e| StoreError::json(&path, e))?;
        buf.push(b'\n');

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &buf).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))?;
        log::debug!("Wrote {} ({} entries)", path.display(), doc.entries.len());
        Ok(path)
    }

    /// Read and validate the document for `slug`. `Ok(None)` if there is none.
    pub fn read(&self, slug: &str) -> Result<Option<GameDocument>, StoreError> {
        let path = self.path_for(slug)?;
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        let doc: GameDocument =
            serde_json::from_str(&contents).map_err(|e| StoreError::json(&path, e))?;
        doc.validate().map_err(|source| StoreError::Invalid {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(doc))
    }

    /// Read a document file without enforcing the entry invariants.
    pub fn read_raw(path: &Path) -> Result<RawDocument, StoreError> {
        let contents = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|e| StoreError::json(path, e))
    }

    /// All document files in the store, sorted by file name. A store whose
    /// directory does not exist yet is empty.
    pub fn document_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)
            .map_err(|e| StoreError::io(&self.dir, e))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Slugs of all stored documents, sorted.
    pub fn slugs(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .document_paths()?
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect())
    }
}
