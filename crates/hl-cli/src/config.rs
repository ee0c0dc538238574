//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use hl_core::{UserId, UserRef};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Zone for users who never ran `hl settz`.
    pub default_timezone: String,
    /// Stable ID used when `--user` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Display name used when `--name` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Pins the current time instead of reading the system clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now: Option<DateTime<Utc>>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("default_timezone", &self.default_timezone)
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("now", &self.now)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("hourlog.db"),
            default_timezone: hl_core::DEFAULT_TIMEZONE.name().to_string(),
            user_id: None,
            display_name: None,
            now: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (HL_*)
        figment = figment.merge(Env::prefixed("HL_"));

        figment.extract()
    }

    /// Parses `default_timezone`.
    pub fn default_zone(&self) -> Result<Tz> {
        hl_core::zone::parse_zone(&self.default_timezone)
            .with_context(|| format!("invalid default_timezone in config: {}", self.default_timezone))
    }

    /// Resolves who is acting, with command-line values taking precedence.
    ///
    /// The display name falls back to the user ID.
    pub fn identity(&self, user: Option<&str>, name: Option<&str>) -> Result<UserRef> {
        let id = user
            .or(self.user_id.as_deref())
            .context("no user ID given: pass --user or set user_id in config")?;
        let id = UserId::new(id)?;
        let display_name = name
            .or(self.display_name.as_deref())
            .map_or_else(|| id.to_string(), String::from);
        Ok(UserRef::new(id, display_name))
    }

    /// Lock file guarding read-modify-write cycles on the database.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .database_path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| "hourlog.db".into());
        name.push(".lock");
        self.database_path.with_file_name(name)
    }
}

/// Returns the platform-specific config directory for hourlog.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hourlog"))
}

/// Returns the platform-specific data directory for hourlog.
///
/// On Linux: `~/.local/share/hourlog`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("hourlog"))
}
