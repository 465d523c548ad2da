//! Mapping external catalog names to the analytics site's URL slugs.
//!
//! Names are first looked up in an override table of known exceptions. Any
//! other name goes through [`slugify`]: transliterate to ASCII, drop or spell
//! out punctuation, and join words with underscores.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

use crate::error::OverrideError;

/// Characters removed outright.
const STRIPPED: &[char] = &[':', '\'', '"', '?', '!', '%', '$', '^', '*', '/', '\\'];

/// Source-name to slug exceptions, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    map: HashMap<String, String>,
}

impl OverrideTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            map: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load a JSON array of `{"name": ..., "normalized": ...}` objects.
    pub fn load(path: &Path) -> Result<Self, OverrideError> {
        let text = fs::read_to_string(path).map_err(|source| OverrideError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text, &path.display().to_string())
    }

    /// Parse table contents; `origin` names the source in errors.
    pub fn from_json_str(text: &str, origin: &str) -> Result<Self, OverrideError> {
        let value: Value = serde_json::from_str(text).map_err(|source| OverrideError::Parse {
            path: origin.to_string(),
            source,
        })?;
        let Value::Array(items) = value else {
            return Err(OverrideError::NotAList {
                path: origin.to_string(),
            });
        };

        let mut map = HashMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let field = |key: &'static str| {
                item.get(key)
                    .and_then(Value::as_str)
                    .ok_or_else(|| OverrideError::MissingKey {
                        path: origin.to_string(),
                        index,
                        key,
                    })
            };
            let name = field("name")?;
            let normalized = field("normalized")?;
            if let Some(previous) = map.insert(name.to_string(), normalized.to_string()) {
                log::warn!(
                    "{origin}: duplicate override for '{name}' ('{previous}' replaced by '{normalized}')"
                );
            }
        }
        log::debug!("Loaded {} name overrides from {origin}", map.len());
        Ok(Self { map })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Turns catalog names into analytics-site slugs.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    overrides: OverrideTable,
}

impl Normalizer {
    pub fn new(overrides: OverrideTable) -> Self {
        Self { overrides }
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    /// Override value verbatim if one exists, otherwise [`slugify`].
    pub fn normalize(&self, source_name: &str) -> String {
        match self.overrides.get(source_name) {
            Some(slug) => slug.to_string(),
            None => slugify(source_name),
        }
    }
}

/// Rule-based slug for a name with no override.
///
/// `Dungeons & Dragons: Dark Alliance` becomes
/// `Dungeons_and_Dragons_Dark_Alliance`. Applying it to its own output is a
/// no-op.
pub fn slugify(name: &str) -> String {
    let ascii = transliterate(name);

    let mut spelled = String::with_capacity(ascii.len());
    for c in ascii.chars() {
        match c {
            '+' => spelled.push_str("plus"),
            '&' => spelled.push_str("and"),
            c if STRIPPED.contains(&c) => {}
            c => spelled.push(c),
        }
    }

    spelled.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Closest ASCII rendering of `s`. Compatibility forms are folded first so
/// full-width punctuation reaches the substitutions as plain ASCII.
fn transliterate(s: &str) -> String {
    let folded: String = s.nfkc().collect();
    deunicode::deunicode_with_tofu(&folded, "")
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
