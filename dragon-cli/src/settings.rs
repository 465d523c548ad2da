//! `settings.toml`: where things live and how the crawler behaves.
//!
//! Every key is optional. The file itself is optional too, unless it was
//! named explicitly with `--config`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use dragon_scraper::extract::{DEFAULT_CHANNELS_PATH, DEFAULT_PEAK_PATH, DEFAULT_VIEWERS_PATH};
use dragon_scraper::{
    DEFAULT_BASE_URL, DEFAULT_CACHE_DIR, DEFAULT_REQUEST_DELAY, DEFAULT_USER_AGENT,
    OverrideTable, PageLocators,
};
use dragon_store::DEFAULT_OUTPUT_DIR;

use crate::error::CliError;

/// Canonical path to the settings file: `~/.config/dragon/settings.toml`.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("dragon").join("settings.toml")
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub scraper: ScraperSettings,
    pub store: StoreSettings,
    pub normalizer: NormalizerSettings,
    pub locators: LocatorSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ScraperSettings {
    pub base_url: String,
    pub user_agent: String,
    pub request_delay_secs: f64,
    pub cache_dir: PathBuf,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_delay_secs: DEFAULT_REQUEST_DELAY.as_secs_f64(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

impl ScraperSettings {
    pub(crate) fn request_delay(&self) -> Result<Duration, CliError> {
        Duration::try_from_secs_f64(self.request_delay_secs).map_err(|_| {
            CliError::config(format!(
                "scraper.request_delay_secs must be a non-negative number, got {}",
                self.request_delay_secs
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct StoreSettings {
    pub output_dir: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct NormalizerSettings {
    /// JSON override table; no overrides when unset.
    pub overrides: Option<PathBuf>,
}

impl NormalizerSettings {
    pub(crate) fn load_overrides(&self) -> Result<OverrideTable, CliError> {
        match &self.overrides {
            Some(path) => {
                let table = OverrideTable::load(path)?;
                log::info!("Loaded {} name overrides", table.len());
                Ok(table)
            }
            None => Ok(OverrideTable::empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LocatorSettings {
    pub viewers: String,
    pub channels: String,
    pub peak: String,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            viewers: DEFAULT_VIEWERS_PATH.to_string(),
            channels: DEFAULT_CHANNELS_PATH.to_string(),
            peak: DEFAULT_PEAK_PATH.to_string(),
        }
    }
}

impl LocatorSettings {
    pub(crate) fn page_locators(&self) -> Result<PageLocators, CliError> {
        Ok(PageLocators::from_paths(
            &self.viewers,
            &self.channels,
            &self.peak,
        )?)
    }
}

impl Settings {
    /// Load from `explicit`, or from [`settings_path`] if that file exists.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let default = settings_path();
                if !default.exists() {
                    log::debug!("No settings file at {}, using defaults", default.display());
                    return Ok(Self::default());
                }
                default
            }
        };
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| CliError::config(format!("{}: {e}", path.display())))?;
        Self::parse(&contents).map_err(|e| CliError::config(format!("{}: {e}", path.display())))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let s = Settings::parse("").unwrap();
        assert_eq!(s.scraper.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.scraper.request_delay().unwrap(), Duration::from_secs(5));
        assert_eq!(s.store.output_dir, PathBuf::from("output/games"));
        assert!(s.normalizer.overrides.is_none());
        assert!(s.locators.page_locators().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let s = Settings::parse(
            r#"
[scraper]
request_delay_secs = 0.5
cache_dir = "/tmp/dragon-cache"

[normalizer]
overrides = "overrides.json"
"#,
        )
        .unwrap();
        assert_eq!(s.scraper.request_delay().unwrap(), Duration::from_millis(500));
        assert_eq!(s.scraper.cache_dir, PathBuf::from("/tmp/dragon-cache"));
        assert_eq!(s.scraper.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(
            s.normalizer.overrides.as_deref(),
            Some(Path::new("overrides.json"))
        );
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(Settings::parse("[scraper]\nbase_uri = \"x\"\n").is_err());
    }

    #[test]
    fn negative_delay_rejected() {
        let s = Settings::parse("[scraper]\nrequest_delay_secs = -1.0\n").unwrap();
        assert!(s.scraper.request_delay().is_err());
    }

    #[test]
    fn bad_locator_rejected() {
        let s = Settings::parse("[locators]\npeak = \"html/body\"\n").unwrap();
        assert!(s.locators.page_locators().is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(Settings::load(Some(&tmp.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn malformed_override_table_fails_early() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("overrides.json");
        std::fs::write(&path, r#"[{"name": "x"}]"#).unwrap();
        let settings = NormalizerSettings {
            overrides: Some(path),
        };
        let err = settings.load_overrides().unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
