//! Settings file handling for flurry.
//!
//! Settings live in `config.toml` under the platform config directory
//! (for example `~/.config/flurry/config.toml` on Linux). Every key is
//! optional; anything missing falls back to the effect defaults.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use flurry_core::{ConfigError, ConfigOverrides, EffectConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "flurry.log";

/// Errors while reading or writing the settings file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Terminal host settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Target redraws per second.
    pub refresh_hz: u32,
    /// Show the key help bar.
    pub show_help: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_hz: 60,
            show_help: true,
        }
    }
}

/// Everything stored in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub effect: ConfigOverrides,
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Platform default location of the settings file.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, LoadError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&contents).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), LoadError> {
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(io_err)
    }

    /// The effect config these settings resolve to.
    pub fn effect_config(&self) -> EffectConfig {
        EffectConfig::default().merge(&self.effect)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.effect_config().validate()?;
        if self.display.refresh_hz == 0 {
            return Err(ConfigError::InvalidConfig {
                field: "refresh_hz",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Where the log file goes when logging is enabled.
pub fn log_file_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join(LOG_FILE))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "flurry")
}
