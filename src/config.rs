//! Application configuration.
//!
//! Loaded from a JSON file. Every section and field falls back to its
//! default when missing, so a partial file is valid.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fetch::FetchSettings;
use crate::options::{Options, DEFAULT_BAD_WORDS, DEFAULT_GOOD_WORDS};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory relative paths in the CLI are resolved against.
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
        }
    }
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

/// Crawling, discovery and harvesting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Minimum age of a harvest before an origin is checked again.
    pub check_history_offset_secs: u64,
    /// Index of the thread link that becomes an origin's last checked URL.
    pub link_scan_offset: usize,
    /// Added to an origin's dead score on each failed fetch.
    pub origin_deadness_raise: i64,
    pub thread_table_good_words: Vec<String>,
    pub thread_table_bad_words: Vec<String>,
    pub default_explore_number_of_pages: usize,
    pub default_max_sample_threads: usize,
    pub default_proxy_mode: bool,
    pub default_verbose: bool,
    pub tor_proxy_address: String,
    pub tor_proxy_port: u16,
    /// Proxies rotated through in proxy mode.
    pub proxy_urls: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            check_history_offset_secs: 43_200,
            link_scan_offset: 5,
            origin_deadness_raise: 1,
            thread_table_good_words: DEFAULT_GOOD_WORDS.iter().map(|w| (*w).to_string()).collect(),
            thread_table_bad_words: DEFAULT_BAD_WORDS.iter().map(|w| (*w).to_string()).collect(),
            default_explore_number_of_pages: 4,
            default_max_sample_threads: 8,
            default_proxy_mode: false,
            default_verbose: false,
            tor_proxy_address: "http://127.0.0.1".to_string(),
            tor_proxy_port: 9053,
            proxy_urls: Vec::new(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration to `path`, overwriting it.
    pub fn write_default(path: impl AsRef<Path>) -> Result<Config> {
        let config = Config::default();
        fs::write(path.as_ref(), serde_json::to_string_pretty(&config)?)?;
        Ok(config)
    }

    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.web.default_explore_number_of_pages == 0 {
            errors.push("web.default_explore_number_of_pages must be positive");
        }
        if self.web.default_max_sample_threads == 0 {
            errors.push("web.default_max_sample_threads must be positive");
        }
        if self.web.request_timeout_secs == 0 {
            errors.push("web.request_timeout_secs must be positive");
        }
        if self.web.origin_deadness_raise < 0 {
            errors.push("web.origin_deadness_raise must not be negative");
        }
        if self.web.tor_proxy_address.trim().is_empty() {
            errors.push("web.tor_proxy_address must be set");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigInvalid(errors.join("; ")))
        }
    }

    /// Classifier calibration with this file's dictionaries.
    #[must_use]
    pub fn classifier_options(&self) -> Options {
        Options::with_words(
            self.web.thread_table_good_words.clone(),
            self.web.thread_table_bad_words.clone(),
        )
    }

    /// Connection settings for the HTTP fetcher.
    #[must_use]
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            tor_proxy: format!(
                "{}:{}",
                self.web.tor_proxy_address.trim_end_matches('/'),
                self.web.tor_proxy_port
            ),
            proxy_urls: self.web.proxy_urls.clone(),
            timeout: Duration::from_secs(self.web.request_timeout_secs),
        }
    }

    /// Resolve `path` against `general.root_path` unless it is absolute.
    #[must_use]
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.general.root_path.join(path)
        }
    }
}
