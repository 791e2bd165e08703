//! Poll settings loading
//!
//! Settings are loaded from (in order of priority):
//! 1. `MAILBOX_POLL_INTERVAL_MS` environment variable (interval only)
//! 2. JSON file in the Mailbox config directory
//! 3. Built-in defaults

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings filename in the Mailbox config directory
const SETTINGS_FILE: &str = "mailbox.json";

/// Environment variable overriding the poll interval
const POLL_INTERVAL_ENV: &str = "MAILBOX_POLL_INTERVAL_MS";

/// Default delay between sync cycles
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 15_000;

/// Settings that seed the application state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PollSettings {
    /// Delay between the end of one sync cycle and the start of the next
    pub poll_interval_ms: u64,
    /// Window/document title
    pub title: String,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            title: "Mailbox".to_string(),
        }
    }
}

impl PollSettings {
    /// Load settings from the config directory and environment
    pub fn load() -> Result<Self> {
        let settings = if Self::exists() {
            let settings: Self = config::load_json(SETTINGS_FILE)?;
            settings.validated()?
        } else {
            Self::default()
        };

        match std::env::var(POLL_INTERVAL_ENV) {
            Ok(value) => settings.with_interval_override(&value),
            Err(_) => Ok(settings),
        }
    }

    /// Load settings from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings: Self = config::load_json_file(path)?;
        settings.validated()
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(json).context("Failed to parse settings JSON")?;
        settings.validated()
    }

    /// Write these settings to the config directory
    pub fn save(&self) -> Result<()> {
        config::save_json(SETTINGS_FILE, self)
    }

    /// Check if a settings file exists in the config directory
    pub fn exists() -> bool {
        config::config_exists(SETTINGS_FILE)
    }

    /// Get the default settings file path (~/.config/mailbox/mailbox.json)
    pub fn default_settings_path() -> Option<PathBuf> {
        config::config_path(SETTINGS_FILE)
    }

    /// Apply a textual poll interval override
    fn with_interval_override(mut self, value: &str) -> Result<Self> {
        self.poll_interval_ms = value
            .trim()
            .parse()
            .with_context(|| format!("{} is not a number: {:?}", POLL_INTERVAL_ENV, value))?;
        self.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.poll_interval_ms == 0 {
            bail!("Poll interval must be greater than zero");
        }
        Ok(self)
    }
}
