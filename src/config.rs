//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/nestree/nestree.toml`
//! 3. Local config: `<dir>/.nestree.toml` (usually the working directory)
//! 4. Environment variables: `NESTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, DocumentFormat};

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub format: Option<DocumentFormat>,
    pub pretty: Option<bool>,
    pub validate: Option<bool>,
    pub include_levels: Option<bool>,
}

/// Unified configuration for nestree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Document format for stdout and for files without a known extension
    pub format: DocumentFormat,
    /// Pretty-print serialized documents
    pub pretty: bool,
    /// Validate intervals before answering queries
    pub validate: bool,
    /// Keep `level` in exported records
    pub include_levels: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: DocumentFormat::Json,
            pretty: true,
            validate: true,
            include_levels: true,
        }
    }
}

/// Get the XDG config directory for nestree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "nestree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("nestree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".nestree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            format: overlay.format.unwrap_or(self.format),
            pretty: overlay.pretty.unwrap_or(self.pretty),
            validate: overlay.validate.unwrap_or(self.validate),
            include_levels: overlay.include_levels.unwrap_or(self.include_levels),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.nestree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local_dir)
    }

    /// Load settings from an explicit global config file.
    ///
    /// Missing files are skipped; unreadable or malformed ones are errors.
    pub fn load_from(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        // 4. Environment variables
        Self::apply_env_overrides(current)
    }

    /// Apply NESTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("NESTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("format") {
            settings.format = match val.to_ascii_lowercase().as_str() {
                "json" => DocumentFormat::Json,
                "toml" => DocumentFormat::Toml,
                other => {
                    return Err(ApplicationError::Config {
                        message: format!("NESTREE_FORMAT: unknown format '{other}'"),
                    })
                }
            };
        }
        if let Some(val) = env_bool(&config, "pretty")? {
            settings.pretty = val;
        }
        if let Some(val) = env_bool(&config, "validate")? {
            settings.validate = val;
        }
        if let Some(val) = env_bool(&config, "include_levels")? {
            settings.include_levels = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# nestree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/nestree/nestree.toml
#   Local:  ./.nestree.toml
#   Env:    NESTREE_* environment variables (e.g. NESTREE_FORMAT=toml)

# Document format for stdout and files without a .json/.toml extension
# format = "json"

# Pretty-print serialized documents
# pretty = true

# Validate nested-set intervals before answering queries
# validate = true

# Keep the level of each node in exported records
# include_levels = true
"#
        .to_string()
    }
}

/// A present env value that is not a boolean is a config error.
fn env_bool(config: &Config, key: &str) -> Result<Option<bool>, ApplicationError> {
    match config.get_bool(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
