//! Controller client abstraction.
//!
//! The access-model resource never talks to a controller directly; it goes
//! through [`ModelAccessClient`], which is resolved once when the provider is
//! configured and shared by every handler.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::id::AccessModelId;

/// Operations the controller exposes for managing model access.
///
/// Implementations own the actual grant/revoke semantics, including whether a
/// multi-user update is applied atomically.
#[async_trait]
pub trait ModelAccessClient: Send + Sync {
    /// Resolve a model name to its UUID.
    async fn resolve_model_uuid(&self, name: &str) -> Result<String>;

    /// List every user with access to the model and the level they hold.
    async fn model_user_info(&self, uuid: &str) -> Result<Vec<ModelUserInfo>>;

    /// Grant one user an access level on the given models.
    async fn grant_model(&self, input: GrantModelInput) -> Result<()>;

    /// Apply a combined grant/revoke/access change to a model.
    async fn update_access_model(&self, input: UpdateAccessModelInput) -> Result<()>;

    /// Revoke the given users' access to a model.
    async fn destroy_access_model(&self, input: DestroyAccessModelInput) -> Result<()>;
}

/// One entry of a model's user listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUserInfo {
    /// User name.
    pub user_name: String,

    /// Access level held by the user.
    pub access: String,
}

impl ModelUserInfo {
    /// Creates a listing entry.
    pub fn new(user_name: impl Into<String>, access: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            access: access.into(),
        }
    }
}

/// Request to grant a single user access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantModelInput {
    /// User receiving access.
    pub user: String,

    /// Access level to grant.
    pub access: String,

    /// Models the grant applies to.
    pub model_uuids: Vec<String>,
}

/// Combined access change for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAccessModelInput {
    /// Identifier of the grant as it was before this change.
    pub model: AccessModelId,

    /// Users that should hold access after the change.
    pub grant: Vec<String>,

    /// Users whose access is removed.
    pub revoke: Vec<String>,

    /// New access level, `None` when the level is unchanged.
    pub access: Option<String>,
}

/// Request to revoke access for a set of users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyAccessModelInput {
    /// Identifier of the grant being destroyed.
    pub model: AccessModelId,

    /// Users whose access is removed.
    pub revoke: Vec<String>,

    /// Access level being revoked.
    pub access: String,
}
