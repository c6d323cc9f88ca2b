//! Change detection between stored state and declared configuration.

use serde::{Deserialize, Serialize};

use crate::model::{AccessModelConfig, AccessModelState};

/// What the host must do to reach the declared configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    /// Nothing exists yet; call Create.
    Create,
    /// `users` or `access` changed; call Update.
    Update,
    /// `model` changed; call Delete, then Create.
    Replace,
    /// Already up to date.
    NoOp,
}

/// Attribute-level changes between prior state and planned configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    /// `model` differs.
    pub model: bool,
    /// `users` differs, including order.
    pub users: bool,
    /// `access` differs.
    pub access: bool,
}

impl Changes {
    /// Compares stored state with the planned configuration.
    pub fn between(prior: &AccessModelState, planned: &AccessModelConfig) -> Self {
        Self {
            model: prior.model != planned.model,
            users: prior.users != planned.users,
            access: prior.access != planned.access,
        }
    }

    /// Whether any in-place updatable attribute changed.
    pub fn any_updatable(&self) -> bool {
        self.users || self.access
    }
}

/// Decides the action for a resource.
pub fn plan(prior: Option<&AccessModelState>, planned: &AccessModelConfig) -> PlanAction {
    let Some(prior) = prior.filter(|p| p.exists()) else {
        return PlanAction::Create;
    };

    let changes = Changes::between(prior, planned);
    if changes.model {
        PlanAction::Replace
    } else if changes.any_updatable() {
        PlanAction::Update
    } else {
        PlanAction::NoOp
    }
}
