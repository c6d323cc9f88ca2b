//! Handler functions for `modelgrant config {path,get,init,export}`.

use std::path::PathBuf;

use modelgrant_core::{Error, Result};

use crate::cli::ConfigAction;
use crate::config::ModelgrantConfig;

/// Handle a config subcommand.
///
/// Receives the raw `--config` path (not a loaded config) because `path` and
/// `init` work before a config file exists.
///
/// # Errors
///
/// Returns [`Error::Config`] or an I/O error from the selected command.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Get { key } => {
            let config = ModelgrantConfig::load(config_path)?;
            println!("{}", config_value(&config, &key)?);
            Ok(())
        }
        ConfigAction::Init { file, force } => {
            let path = cmd_config_init(file.as_deref(), force)?;
            println!("Config file created at {}", path.display());
            Ok(())
        }
        ConfigAction::Export { docker_env } => {
            let config = ModelgrantConfig::load(config_path)?;
            for line in export_lines(&config, docker_env)? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    let path = ModelgrantConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(file does not exist; run `modelgrant config init` to create it)");
    }
    Ok(())
}

/// Writes a default config file and returns its path.
fn cmd_config_init(file: Option<&str>, force: bool) -> Result<PathBuf> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => ModelgrantConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, ModelgrantConfig::default().to_toml_string()?)?;
    Ok(path)
}

/// Look up a dotted key in the resolved configuration.
fn config_value(config: &ModelgrantConfig, key: &str) -> Result<String> {
    let value = toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))?;
    let found = key
        .split('.')
        .try_fold(&value, |current, part| current.as_table()?.get(part))
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))?;

    Ok(match found {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(found).unwrap_or_else(|_| found.to_string())
        }
        other => other.to_string(),
    })
}

fn export_lines(config: &ModelgrantConfig, docker_env: bool) -> Result<Vec<String>> {
    Ok(config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| {
            if docker_env {
                format!("--env {key}={value}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> ModelgrantConfig {
        let mut config = ModelgrantConfig {
            base_path: Some("/work".into()),
            ..Default::default()
        };
        config.controller.snapshot_path = Some("/work/ctl.json".into());
        config
    }

    #[test]
    fn test_config_value_nested() {
        assert_eq!(
            config_value(&sample(), "controller.snapshot_path").unwrap(),
            "/work/ctl.json"
        );
        assert_eq!(config_value(&sample(), "base_path").unwrap(), "/work");
    }

    #[test]
    fn test_config_value_missing() {
        let err = config_value(&sample(), "state.nope").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_init_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("modelgrant").join("config.toml");

        let written = cmd_config_init(Some(path.to_str().unwrap()), false).unwrap();
        assert_eq!(written, path);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[controller]"));
        assert!(toml::from_str::<ModelgrantConfig>(&content).is_ok());
    }

    #[test]
    fn test_init_no_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "existing").unwrap();

        let err = cmd_config_init(Some(path.to_str().unwrap()), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        assert!(cmd_config_init(Some(path.to_str().unwrap()), true).is_ok());
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "existing");
    }

    #[test]
    fn test_export_lines() {
        let plain = export_lines(&sample(), false).unwrap();
        assert!(plain.contains(&"MODELGRANT_BASE_PATH=/work".to_string()));

        let docker = export_lines(&sample(), true).unwrap();
        assert!(docker.contains(&"--env MODELGRANT_BASE_PATH=/work".to_string()));
    }
}
