//! In-memory controller for testing and local runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::client::{
    DestroyAccessModelInput, GrantModelInput, ModelAccessClient, ModelUserInfo,
    UpdateAccessModelInput,
};
use crate::{Error, Result};

/// Controller operations, used for call recording and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `resolve_model_uuid`
    ResolveModelUuid,
    /// `model_user_info`
    ModelUserInfo,
    /// `grant_model`
    GrantModel,
    /// `update_access_model`
    UpdateAccessModel,
    /// `destroy_access_model`
    DestroyAccessModel,
}

impl Operation {
    /// Whether the operation changes controller state.
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::GrantModel | Self::UpdateAccessModel | Self::DestroyAccessModel
        )
    }
}

/// A call received by the controller, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    /// Model name lookup.
    ResolveModelUuid(String),
    /// User listing for a model UUID.
    ModelUserInfo(String),
    /// Single-user grant.
    GrantModel(GrantModelInput),
    /// Combined update.
    UpdateAccessModel(UpdateAccessModelInput),
    /// Revocation.
    DestroyAccessModel(DestroyAccessModelInput),
}

impl ClientCall {
    /// The operation this call invoked.
    pub fn operation(&self) -> Operation {
        match self {
            Self::ResolveModelUuid(_) => Operation::ResolveModelUuid,
            Self::ModelUserInfo(_) => Operation::ModelUserInfo,
            Self::GrantModel(_) => Operation::GrantModel,
            Self::UpdateAccessModel(_) => Operation::UpdateAccessModel,
            Self::DestroyAccessModel(_) => Operation::DestroyAccessModel,
        }
    }
}

/// Serializable copy of the controller tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    /// Models keyed by name.
    #[serde(default)]
    pub models: BTreeMap<String, ModelRecord>,
}

/// One model and the users with access to it, in grant order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Model UUID.
    pub uuid: String,

    /// Users holding access.
    #[serde(default)]
    pub users: Vec<ModelUserInfo>,
}

impl ModelRecord {
    fn set_access(&mut self, user: &str, access: &str) {
        match self.users.iter_mut().find(|u| u.user_name == user) {
            Some(existing) => existing.access = access.to_string(),
            None => self.users.push(ModelUserInfo::new(user, access)),
        }
    }

    fn revoke(&mut self, user: &str) {
        self.users.retain(|u| u.user_name != user);
    }
}

/// Controller that keeps models and grants in memory.
///
/// Clones share the same tables, so a test can hand one clone to the resource
/// and inspect the other. Every call is recorded, including failed ones.
#[derive(Clone, Default)]
pub struct InMemoryController {
    inner: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    snapshot: ControllerSnapshot,
    calls: Vec<ClientCall>,
    operation_failures: HashMap<Operation, String>,
    grant_failures: HashMap<String, String>,
}

impl Tables {
    fn model_by_name(&mut self, name: &str) -> Result<&mut ModelRecord> {
        self.snapshot
            .models
            .get_mut(name)
            .ok_or_else(|| Error::not_found(format!("model {name:?}")))
    }

    fn model_by_uuid(&mut self, uuid: &str) -> Result<&mut ModelRecord> {
        self.snapshot
            .models
            .values_mut()
            .find(|m| m.uuid == uuid)
            .ok_or_else(|| Error::not_found(format!("model with UUID {uuid:?}")))
    }

    fn check(&self, operation: Operation) -> Result<()> {
        match self.operation_failures.get(&operation) {
            Some(msg) => Err(Error::remote(msg.clone())),
            None => Ok(()),
        }
    }
}

impl InMemoryController {
    /// Creates an empty controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a controller from previously saved tables.
    pub fn from_snapshot(snapshot: ControllerSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Tables {
                snapshot,
                ..Tables::default()
            })),
        }
    }

    /// Copy of the current tables.
    pub async fn snapshot(&self) -> ControllerSnapshot {
        self.inner.lock().await.snapshot.clone()
    }

    /// Adds a model with a fresh UUID and returns the UUID.
    ///
    /// An existing model of the same name keeps its UUID and grants.
    pub async fn add_model(&self, name: impl Into<String>) -> String {
        let mut tables = self.inner.lock().await;
        tables
            .snapshot
            .models
            .entry(name.into())
            .or_insert_with(|| ModelRecord {
                uuid: uuid::Uuid::new_v4().to_string(),
                users: Vec::new(),
            })
            .uuid
            .clone()
    }

    /// Grants access directly, bypassing the call log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the model does not exist.
    pub async fn seed_access(&self, model: &str, user: &str, access: &str) -> Result<()> {
        let mut tables = self.inner.lock().await;
        tables.model_by_name(model)?.set_access(user, access);
        Ok(())
    }

    /// Access level held by `user` on `model`, if any.
    pub async fn access_of(&self, model: &str, user: &str) -> Option<String> {
        let tables = self.inner.lock().await;
        tables
            .snapshot
            .models
            .get(model)?
            .users
            .iter()
            .find(|u| u.user_name == user)
            .map(|u| u.access.clone())
    }

    /// Makes every subsequent call of `operation` fail with `message`.
    pub async fn fail_operation(&self, operation: Operation, message: impl Into<String>) {
        self.inner
            .lock()
            .await
            .operation_failures
            .insert(operation, message.into());
    }

    /// Makes `grant_model` fail with `message` whenever it targets `user`.
    pub async fn fail_grant_for(&self, user: impl Into<String>, message: impl Into<String>) {
        self.inner
            .lock()
            .await
            .grant_failures
            .insert(user.into(), message.into());
    }

    /// Removes all injected failures.
    pub async fn clear_failures(&self) {
        let mut tables = self.inner.lock().await;
        tables.operation_failures.clear();
        tables.grant_failures.clear();
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<ClientCall> {
        self.inner.lock().await.calls.clone()
    }

    /// Number of calls that change controller state.
    pub async fn mutating_call_count(&self) -> usize {
        self.inner
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.operation().is_mutating())
            .count()
    }

    /// Forgets the recorded calls.
    pub async fn clear_calls(&self) {
        self.inner.lock().await.calls.clear();
    }
}

#[async_trait]
impl ModelAccessClient for InMemoryController {
    async fn resolve_model_uuid(&self, name: &str) -> Result<String> {
        let mut tables = self.inner.lock().await;
        tables.calls.push(ClientCall::ResolveModelUuid(name.to_string()));
        tables.check(Operation::ResolveModelUuid)?;

        Ok(tables.model_by_name(name)?.uuid.clone())
    }

    async fn model_user_info(&self, uuid: &str) -> Result<Vec<ModelUserInfo>> {
        let mut tables = self.inner.lock().await;
        tables.calls.push(ClientCall::ModelUserInfo(uuid.to_string()));
        tables.check(Operation::ModelUserInfo)?;

        Ok(tables.model_by_uuid(uuid)?.users.clone())
    }

    async fn grant_model(&self, input: GrantModelInput) -> Result<()> {
        let mut tables = self.inner.lock().await;
        tables.calls.push(ClientCall::GrantModel(input.clone()));
        tables.check(Operation::GrantModel)?;
        if let Some(msg) = tables.grant_failures.get(&input.user) {
            return Err(Error::remote(msg.clone()));
        }

        // Validate every target before touching any of them.
        for uuid in &input.model_uuids {
            tables.model_by_uuid(uuid)?;
        }
        for uuid in &input.model_uuids {
            tables
                .model_by_uuid(uuid)?
                .set_access(&input.user, &input.access);
        }
        log::debug!("granted {} access to {}", input.access, input.user);
        Ok(())
    }

    async fn update_access_model(&self, input: UpdateAccessModelInput) -> Result<()> {
        let mut tables = self.inner.lock().await;
        tables.calls.push(ClientCall::UpdateAccessModel(input.clone()));
        tables.check(Operation::UpdateAccessModel)?;

        let access = input
            .access
            .clone()
            .unwrap_or_else(|| input.model.access().to_string());
        let model = tables.model_by_name(input.model.model())?;
        for user in &input.revoke {
            model.revoke(user);
        }
        for user in &input.grant {
            model.set_access(user, &access);
        }
        Ok(())
    }

    async fn destroy_access_model(&self, input: DestroyAccessModelInput) -> Result<()> {
        let mut tables = self.inner.lock().await;
        tables.calls.push(ClientCall::DestroyAccessModel(input.clone()));
        tables.check(Operation::DestroyAccessModel)?;

        let model = tables.model_by_name(input.model.model())?;
        for user in &input.revoke {
            model.revoke(user);
        }
        Ok(())
    }
}
