// Local configuration for the practice data core.
//
// Global config: `~/.lexflow/config.toml`, then environment overrides:
// LEXFLOW_REMOTE_URL, LEXFLOW_REMOTE_KEY, LEXFLOW_GOOGLE_CLIENT_ID,
// LEXFLOW_DATA_DIR.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::security::{ensure_owner_only_dir, ensure_owner_only_file};

pub const ENV_REMOTE_URL: &str = "LEXFLOW_REMOTE_URL";
pub const ENV_REMOTE_KEY: &str = "LEXFLOW_REMOTE_KEY";
pub const ENV_GOOGLE_CLIENT_ID: &str = "LEXFLOW_GOOGLE_CLIENT_ID";
pub const ENV_DATA_DIR: &str = "LEXFLOW_DATA_DIR";

pub const DEFAULT_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";
const LOCAL_DB_FILE: &str = "local.db";

/// Keys understood by [`GlobalConfig::get_key`] and [`GlobalConfig::set_key`].
pub const CONFIG_KEYS: [&str; 6] = [
    "data_dir",
    "remote.url",
    "remote.key",
    "calendar.client_id",
    "calendar.redirect_uri",
    "calendar.api_base",
];

/// Root directory for LexFlow state: `~/.lexflow/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".lexflow"))
}

/// Path to the global config file: `~/.lexflow/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

// ── Global config ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    /// Where the local store lives. Defaults to `~/.lexflow`.
    pub data_dir: Option<PathBuf>,
    /// Remote table service.
    pub remote: RemoteConfig,
    /// Calendar provider.
    pub calendar: CalendarConfig,
}

/// Remote table service credentials. Both must be present and valid for
/// the remote backend to be selected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    pub url: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalendarConfig {
    /// OAuth client id; the calendar mirror is unavailable without it.
    pub client_id: Option<String>,
    /// Override for the calendar API base (tests point this at a fake).
    pub api_base: Option<String>,
    /// Where the provider sends the browser after consent.
    pub redirect_uri: Option<String>,
}

impl CalendarConfig {
    pub fn is_configured(&self) -> bool {
        self.client_id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_CALENDAR_API)
    }
}

impl GlobalConfig {
    /// Load from `~/.lexflow/config.toml` plus environment overrides.
    /// An unreadable file is logged and replaced by defaults.
    pub fn load() -> Self {
        let file = match global_config_path() {
            Some(path) => Self::load_existing(&path).unwrap_or_else(|error| {
                warn!(path = %path.display(), %error, "ignoring config file, using defaults");
                Self::default()
            }),
            None => Self::default(),
        };
        file.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Like [`Self::load_from`], but a missing file yields defaults.
    pub fn load_existing(path: &Path) -> Result<Self, ConfigError> {
        match Self::load_from(path) {
            Err(ConfigError::Io(error)) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(url) = var(ENV_REMOTE_URL) {
            self.remote.url = Some(url);
        }
        if let Some(key) = var(ENV_REMOTE_KEY) {
            self.remote.key = Some(key);
        }
        if let Some(client_id) = var(ENV_GOOGLE_CLIENT_ID) {
            self.calendar.client_id = Some(client_id);
        }
        if let Some(dir) = var(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().or_else(global_dir).unwrap_or_else(|| PathBuf::from(".lexflow"))
    }

    /// Path of the local key-value database.
    pub fn local_db_path(&self) -> PathBuf {
        self.data_dir().join(LOCAL_DB_FILE)
    }

    pub fn get_key(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "data_dir" => self.data_dir.as_ref().map(|dir| dir.display().to_string()),
            "remote.url" => self.remote.url.clone(),
            "remote.key" => self.remote.key.clone(),
            "calendar.client_id" => self.calendar.client_id.clone(),
            "calendar.redirect_uri" => self.calendar.redirect_uri.clone(),
            "calendar.api_base" => self.calendar.api_base.clone(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// Set or, with `None` or a blank value, clear one key.
    pub fn set_key(&mut self, key: &str, value: Option<&str>) -> Result<(), ConfigError> {
        let value = value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string);
        match key {
            "data_dir" => self.data_dir = value.map(PathBuf::from),
            "remote.url" => self.remote.url = value,
            "remote.key" => self.remote.key = value,
            "calendar.client_id" => self.calendar.client_id = value,
            "calendar.redirect_uri" => self.calendar.redirect_uri = value,
            "calendar.api_base" => self.calendar.api_base = value,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
            ensure_owner_only_dir(parent)
                .map_err(|error| ConfigError::Io(std::io::Error::other(error.to_string())))?;
        }
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents).map_err(ConfigError::Io).and_then(|_| {
            ensure_owner_only_file(path)
                .map_err(|error| ConfigError::Io(std::io::Error::other(error.to_string())))
        })
    }
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(std::io::Error),
    #[error("config parse error: {0}")]
    Parse(toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(toml::ser::Error),
    #[error("unknown config key `{0}`")]
    UnknownKey(String),
}
