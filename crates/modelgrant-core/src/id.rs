//! The composite `model:access` resource identifier.
//!
//! The identifier always names the *current* access level of the grant, so
//! changing `access` produces a new identifier for the same model. Neither
//! component may be empty or contain the `:` separator; anything else is a
//! parse error rather than a best guess at where the model name ends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between the model name and the access level.
pub const SEPARATOR: char = ':';

/// Reasons an identifier cannot be parsed or built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// No `:` in the input.
    #[error("expected \"<model>:<access>\", got {0:?}")]
    MissingSeparator(String),

    /// More than one `:` in the input.
    #[error("{0:?} contains more than one ':'; model names and access levels may not contain ':'")]
    TooManySeparators(String),

    /// The model component is empty.
    #[error("model name is empty in {0:?}")]
    EmptyModel(String),

    /// The access component is empty.
    #[error("access level is empty in {0:?}")]
    EmptyAccess(String),
}

/// Identifier of an access-model grant: `"<model>:<access>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessModelId {
    model: String,
    access: String,
}

impl AccessModelId {
    /// Build an identifier from its components.
    ///
    /// # Errors
    ///
    /// Returns an [`IdError`] if either component is empty or contains `:`.
    pub fn new(model: impl Into<String>, access: impl Into<String>) -> Result<Self, IdError> {
        let model = model.into();
        let access = access.into();
        let raw = format!("{model}{SEPARATOR}{access}");

        if model.contains(SEPARATOR) || access.contains(SEPARATOR) {
            return Err(IdError::TooManySeparators(raw));
        }
        if model.is_empty() {
            return Err(IdError::EmptyModel(raw));
        }
        if access.is_empty() {
            return Err(IdError::EmptyAccess(raw));
        }

        Ok(Self { model, access })
    }

    /// Parse an identifier from its string form.
    ///
    /// # Errors
    ///
    /// Returns an [`IdError`] unless the input has exactly one `:` with a
    /// non-empty component on either side.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let mut parts = raw.split(SEPARATOR);
        let (model, access) = match (parts.next(), parts.next(), parts.next()) {
            (Some(model), Some(access), None) => (model, access),
            (_, Some(_), Some(_)) => return Err(IdError::TooManySeparators(raw.to_string())),
            _ => return Err(IdError::MissingSeparator(raw.to_string())),
        };

        if model.is_empty() {
            return Err(IdError::EmptyModel(raw.to_string()));
        }
        if access.is_empty() {
            return Err(IdError::EmptyAccess(raw.to_string()));
        }

        Ok(Self {
            model: model.to_string(),
            access: access.to_string(),
        })
    }

    /// The model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The access level.
    pub fn access(&self) -> &str {
        &self.access
    }

    /// Same model, different access level.
    ///
    /// # Errors
    ///
    /// Returns an [`IdError`] if `access` is empty or contains `:`.
    pub fn with_access(&self, access: impl Into<String>) -> Result<Self, IdError> {
        Self::new(self.model.clone(), access)
    }
}

impl fmt::Display for AccessModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.model, self.access)
    }
}

impl FromStr for AccessModelId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccessModelId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccessModelId> for String {
    fn from(id: AccessModelId) -> Self {
        id.to_string()
    }
}
