//! Configuration for the modelgrant CLI.
//!
//! Provides the [`ModelgrantConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `MODELGRANT_CONFIG` environment variable
//! 3. XDG default: `~/.config/modelgrant/config.toml`
//! 4. Built-in defaults

use std::path::PathBuf;

use confyg::{Confygery, env};
use modelgrant_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "MODELGRANT_CONFIG";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "MODELGRANT";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the modelgrant CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelgrantConfig {
    /// Directory holding the controller snapshot and resource state.
    pub base_path: Option<String>,

    /// Local controller settings.
    pub controller: ControllerConfig,

    /// Resource state settings.
    pub state: StateConfig,
}

/// Local controller configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// JSON file holding the controller tables.
    pub snapshot_path: Option<String>,

    /// Models registered when no snapshot exists yet.
    pub models: Vec<String>,
}

/// Resource state configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// JSON file holding the access-model state.
    pub path: Option<String>,
}

// ============================================================================
// Config loading
// ============================================================================

impl ModelgrantConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// A config path that does not exist is skipped, leaving defaults and
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file or environment cannot be parsed.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level(ENV_PREFIX);
        env_opts.add_section("controller");
        env_opts.add_section("state");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        Self::resolve_config_path_with(explicit, std::env::var(CONFIG_ENV).ok())
    }

    fn resolve_config_path_with(explicit: Option<&str>, from_env: Option<String>) -> Option<PathBuf> {
        explicit
            .map(PathBuf::from)
            .or_else(|| from_env.map(PathBuf::from))
            .or_else(Self::default_config_path)
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("modelgrant").join("config.toml"))
    }

    /// Directory the default file locations are relative to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no base path is set and the working
    /// directory cannot be determined.
    pub fn base_path(&self) -> Result<PathBuf> {
        match &self.base_path {
            Some(p) => Ok(PathBuf::from(p)),
            None => std::env::current_dir()
                .map_err(|e| Error::config(format!("Could not determine base path: {e}"))),
        }
    }

    /// Location of the controller snapshot.
    ///
    /// # Errors
    ///
    /// See [`base_path`](Self::base_path).
    pub fn controller_snapshot_path(&self) -> Result<PathBuf> {
        match &self.controller.snapshot_path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(self.base_path()?.join("controller.json")),
        }
    }

    /// Location of the resource state file.
    ///
    /// # Errors
    ///
    /// See [`base_path`](Self::base_path).
    pub fn state_path(&self) -> Result<PathBuf> {
        match &self.state.path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(self.base_path()?.join("access_model.json")),
        }
    }

    /// Serialize this config to a pretty-printed TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into `MODELGRANT_`-prefixed environment variable pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the config cannot be converted to TOML.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, ENV_PREFIX, &mut vars);
        Ok(vars)
    }
}

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                flatten_toml_value(val, &format!("{prefix}_{}", key.to_uppercase()), out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}
