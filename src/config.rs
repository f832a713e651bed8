//! Runtime configuration
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! the environment (`TELEGRAM_TOKEN`, `TELEGRAM_CHAT_ID`). Command-line
//! flags are applied last by the caller.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::BriefingError;

pub const TOKEN_ENV: &str = "TELEGRAM_TOKEN";
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

const APP_DIR: &str = "market-briefing";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub telegram_token: Option<String>,
    pub chat_id: Option<String>,
    pub send_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub capture_map: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_token: None,
            chat_id: None,
            send_delay_ms: 1500,
            request_timeout_secs: 15,
            capture_map: true,
        }
    }
}

/// Default config file location: `$XDG_CONFIG_HOME/market-briefing/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

impl Config {
    /// Load configuration from `path` (or the default location) and the
    /// process environment.
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading config from {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| BriefingError::Config(e.to_string()).into())
    }

    /// Overlay non-empty environment values.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(token) = non_empty(TOKEN_ENV) {
            self.telegram_token = Some(token.trim().to_string());
        }
        if let Some(chat_id) = non_empty(CHAT_ID_ENV) {
            self.chat_id = Some(chat_id.trim().to_string());
        }
    }

    /// The bot token, or the fatal missing-credential error.
    pub fn require_token(&self) -> Result<&str, BriefingError> {
        self.telegram_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(BriefingError::MissingToken)
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
