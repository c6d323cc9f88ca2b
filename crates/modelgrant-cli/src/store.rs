//! JSON persistence for the controller snapshot and the resource state.
//!
//! Both files are rewritten whole after a successful handler run. A missing
//! file is an empty controller or an absent resource, not an error.

use std::path::Path;

use modelgrant_core::{ControllerSnapshot, Error, InMemoryController, Result};
use modelgrant_resource::{ACCESS_MODEL_TYPE, AccessModelState};
use serde::{Deserialize, Serialize};

use crate::config::ModelgrantConfig;

/// On-disk resource state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateFile {
    /// Resource type the state belongs to.
    pub resource_type: String,

    /// Version of the tool that last wrote the file.
    pub written_by: String,

    /// Current state, `None` when the resource does not exist.
    #[serde(default)]
    pub state: Option<AccessModelState>,
}

impl StateFile {
    /// Wraps a state for writing.
    pub fn new(state: Option<AccessModelState>) -> Self {
        Self {
            resource_type: ACCESS_MODEL_TYPE.to_string(),
            written_by: env!("CARGO_PKG_VERSION").to_string(),
            state,
        }
    }
}

/// Load the resource state, `None` if the file is absent or holds no resource.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or belongs to a
/// different resource type.
pub fn load_state(path: impl AsRef<Path>) -> Result<Option<AccessModelState>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)?;
    let file: StateFile = serde_json::from_str(&json).map_err(|e| {
        Error::serialization(format!("Failed to parse state {}: {e}", path.display()))
    })?;

    if file.resource_type != ACCESS_MODEL_TYPE {
        return Err(Error::state(format!(
            "{} holds a {} resource, expected {ACCESS_MODEL_TYPE}",
            path.display(),
            file.resource_type
        )));
    }

    Ok(file.state.filter(AccessModelState::exists))
}

/// Save the resource state, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_state(path: impl AsRef<Path>, state: Option<&AccessModelState>) -> Result<()> {
    let file = StateFile::new(state.filter(|s| s.exists()).cloned());
    write_json(path.as_ref(), &file)
}

/// Load the controller, seeding `config.controller.models` on first use.
///
/// # Errors
///
/// Returns an error if the snapshot exists but cannot be read or parsed.
pub async fn load_controller(config: &ModelgrantConfig) -> Result<InMemoryController> {
    let path = config.controller_snapshot_path()?;
    if path.exists() {
        let json = std::fs::read_to_string(&path)?;
        let snapshot: ControllerSnapshot = serde_json::from_str(&json).map_err(|e| {
            Error::serialization(format!("Failed to parse controller {}: {e}", path.display()))
        })?;
        return Ok(InMemoryController::from_snapshot(snapshot));
    }

    let controller = InMemoryController::new();
    for model in &config.controller.models {
        let uuid = controller.add_model(model.clone()).await;
        tracing::debug!("registered model {model} as {uuid}");
    }
    Ok(controller)
}

/// Save the controller tables.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn save_controller(config: &ModelgrantConfig, controller: &InMemoryController) -> Result<()> {
    let path = config.controller_snapshot_path()?;
    write_json(&path, &controller.snapshot().await)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
