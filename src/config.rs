// Application directories and preferences
//
// Everything the app owns lives under one `.weightlog` folder: the entry
// database, the photo directory and a small TOML preferences file. The
// folder defaults to the OS config directory and honors a `WEIGHTLOG_HOME`
// override for tests or portable setups.

use std::io;
use std::path::PathBuf;
use std::sync::{LazyLock, Mutex};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::units::WeightUnit;

/// Name of the application directory under the OS config root.
pub const APP_DIR_NAME: &str = ".weightlog";

/// Preferences file inside the application directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Entry database file inside the application directory.
pub const DB_FILE_NAME: &str = "entries.db";

/// Photo directory inside the application directory.
pub const PHOTOS_DIR_NAME: &str = "photos";

/// Environment override for the application directory's parent.
pub const HOME_ENV_VAR: &str = "WEIGHTLOG_HOME";

static BASE_OVERRIDE: LazyLock<Mutex<Option<PathBuf>>> = LazyLock::new(|| Mutex::new(None));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No suitable base directory available for application files")]
    NoBaseDir,

    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to read config at {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write config at {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to parse config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config for {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
}

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Unit history and charts are rendered in.
    pub display_unit: WeightUnit,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            display_unit: WeightUnit::Kilograms,
        }
    }
}

/// Returns the `.weightlog` directory, creating it if needed.
pub fn app_root_dir() -> Result<PathBuf, ConfigError> {
    let base = base_dir().ok_or(ConfigError::NoBaseDir)?;
    let path = base.join(APP_DIR_NAME);
    std::fs::create_dir_all(&path).map_err(|source| ConfigError::CreateDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Path of the entry database.
pub fn db_path() -> Result<PathBuf, ConfigError> {
    Ok(app_root_dir()?.join(DB_FILE_NAME))
}

/// Path of the photo directory.
pub fn photos_dir() -> Result<PathBuf, ConfigError> {
    Ok(app_root_dir()?.join(PHOTOS_DIR_NAME))
}

/// Path of the preferences file.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Loads preferences from disk, falling back to defaults when the file does
/// not exist yet.
pub fn load_or_default() -> Result<Config, ConfigError> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::ParseToml { path, source })
}

/// Persists preferences, overwriting any previous contents.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path()?;
    let text = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, text).map_err(|source| ConfigError::Write { path, source })
}

fn base_dir() -> Option<PathBuf> {
    if let Some(path) = BASE_OVERRIDE.lock().ok().and_then(|guard| guard.clone()) {
        return Some(path);
    }
    if let Ok(path) = std::env::var(HOME_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
}

#[cfg(test)]
fn set_base_override(path: PathBuf) {
    let mut guard = BASE_OVERRIDE.lock().expect("base override mutex poisoned");
    *guard = Some(path);
}

#[cfg(test)]
fn clear_base_override() {
    let mut guard = BASE_OVERRIDE.lock().expect("base override mutex poisoned");
    *guard = None;
}
