//! Typed configuration and state of the access-model resource.
//!
//! [`AccessModelConfig`] is what the practitioner declares. [`AccessModelState`]
//! is what the host persists between calls and hands back to the next
//! handler; a state with no `id` means the resource does not exist.

use modelgrant_core::id::SEPARATOR;
use modelgrant_core::{AccessModelId, Error, Result};
use serde::{Deserialize, Serialize};

/// Declared configuration of an access-model resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessModelConfig {
    /// Model the grant applies to.
    pub model: String,

    /// Access level given to every listed user.
    pub access: String,

    /// Users holding the access level, in declaration order.
    pub users: Vec<String>,
}

impl AccessModelConfig {
    /// Creates a configuration.
    pub fn new<I, S>(model: impl Into<String>, access: impl Into<String>, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: model.into(),
            access: access.into(),
            users: users.into_iter().map(Into::into).collect(),
        }
    }

    /// Checks the declared values before any remote call is made.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `model` or `access` is empty or
    /// contains `:`, or if a user name is empty.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("model", &self.model), ("access", &self.access)] {
            if value.is_empty() {
                return Err(Error::invalid_config(format!("{name} must not be empty")));
            }
            if value.contains(SEPARATOR) {
                return Err(Error::invalid_config(format!(
                    "{name} {value:?} must not contain '{SEPARATOR}'"
                )));
            }
        }
        if self.users.iter().any(String::is_empty) {
            return Err(Error::invalid_config("users must not contain empty names"));
        }
        Ok(())
    }

    /// Identifier the grant will have once created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] if `model` or `access` cannot form one.
    pub fn id(&self) -> Result<AccessModelId> {
        Ok(AccessModelId::new(self.model.clone(), self.access.clone())?)
    }
}

/// Persisted state of an access-model resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessModelState {
    /// Identifier, `None` once the resource is deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AccessModelId>,

    /// Model the grant applies to.
    #[serde(default)]
    pub model: String,

    /// Access level held by the users.
    #[serde(default)]
    pub access: String,

    /// Users holding the access level.
    #[serde(default)]
    pub users: Vec<String>,
}

impl AccessModelState {
    /// Seed state for an imported resource: identifier fields only.
    pub fn from_id(id: AccessModelId) -> Self {
        Self {
            model: id.model().to_string(),
            access: id.access().to_string(),
            users: Vec::new(),
            id: Some(id),
        }
    }

    /// Whether the state describes an existing resource.
    pub fn exists(&self) -> bool {
        self.id.is_some()
    }

    /// The identifier, or an error if the resource does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::State`] when no identifier is stored.
    pub fn require_id(&self) -> Result<&AccessModelId> {
        self.id
            .as_ref()
            .ok_or_else(|| Error::state("resource has no identifier"))
    }

    /// The declared configuration this state corresponds to.
    pub fn to_config(&self) -> AccessModelConfig {
        AccessModelConfig {
            model: self.model.clone(),
            access: self.access.clone(),
            users: self.users.clone(),
        }
    }
}
