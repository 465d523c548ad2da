//! Persistent HTTP response cache keyed by URL.
//!
//! Each URL maps to two files named by the SHA-256 of the URL:
//! `<key>.body` holds the response bytes verbatim and `<key>.json` holds the
//! metadata. The metadata file is written last, via rename, so an entry only
//! counts as present once both halves are complete.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::FetchError;

/// Cache location unless configured otherwise.
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Metadata stored beside each cached body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedMeta {
    pub url: String,
    pub status: u16,
    pub fetched_at: String,
    pub size: u64,
}

/// A response served from the cache.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub fetched_at: String,
}

/// Summary of what the cache currently holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub total_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key(url: &str) -> String {
        format!("{:x}", Sha256::digest(url.as_bytes()))
    }

    fn body_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.body"))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Look up `url`. Incomplete or unreadable entries count as misses.
    pub fn get(&self, url: &str) -> Result<Option<CachedResponse>, FetchError> {
        let key = Self::key(url);
        let meta_path = self.meta_path(&key);
        let meta_text = match fs::read_to_string(&meta_path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(cache_error(&meta_path, e)),
        };
        let meta: CachedMeta = match serde_json::from_str(&meta_text) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Ignoring corrupt cache metadata {}: {e}", meta_path.display());
                return Ok(None);
            }
        };
        if meta.url != url {
            log::warn!(
                "Cache key collision for {url} (entry belongs to {}), refetching",
                meta.url
            );
            return Ok(None);
        }

        let body_path = self.body_path(&key);
        let body = match fs::read(&body_path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("Cache body missing for {url}, refetching");
                return Ok(None);
            }
            Err(e) => return Err(cache_error(&body_path, e)),
        };

        Ok(Some(CachedResponse {
            status: meta.status,
            body,
            fetched_at: meta.fetched_at,
        }))
    }

    /// Store a response for `url`, whatever its status.
    pub fn put(&self, url: &str, status: u16, body: &[u8]) -> Result<(), FetchError> {
        fs::create_dir_all(&self.dir).map_err(|e| cache_error(&self.dir, e))?;
        let key = Self::key(url);

        let body_path = self.body_path(&key);
        fs::write(&body_path, body).map_err(|e| cache_error(&body_path, e))?;

        let meta = CachedMeta {
            url: url.to_string(),
            status,
            fetched_at: chrono::Utc::now().to_rfc3339(),
            size: body.len() as u64,
        };
        let meta_path = self.meta_path(&key);
        let tmp = meta_path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(&meta).map_err(io::Error::other);
        let text = text.map_err(|e| cache_error(&meta_path, e))?;
        fs::write(&tmp, text).map_err(|e| cache_error(&tmp, e))?;
        fs::rename(&tmp, &meta_path).map_err(|e| cache_error(&meta_path, e))?;
        Ok(())
    }

    /// Count complete entries and the bytes they hold.
    pub fn stats(&self) -> Result<CacheStats, FetchError> {
        let mut stats = CacheStats::default();
        for path in self.files()? {
            if path.extension().is_some_and(|ext| ext == "json") {
                stats.entries += 1;
            }
            if let Ok(m) = fs::metadata(&path) {
                stats.total_bytes += m.len();
            }
        }
        Ok(stats)
    }

    /// Remove every cached entry. Returns the number of bytes freed.
    pub fn clear(&self) -> Result<u64, FetchError> {
        let mut freed = 0u64;
        for path in self.files()? {
            if let Ok(m) = fs::metadata(&path) {
                freed += m.len();
            }
            fs::remove_file(&path).map_err(|e| cache_error(&path, e))?;
        }
        Ok(freed)
    }

    fn files(&self) -> Result<Vec<PathBuf>, FetchError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        Ok(fs::read_dir(&self.dir)
            .map_err(|e| cache_error(&self.dir, e))?
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .is_some_and(|ext| ext == "json" || ext == "body" || ext == "tmp")
            })
            .collect())
    }
}

fn cache_error(path: &Path, source: io::Error) -> FetchError {
    FetchError::Cache {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod tests;
