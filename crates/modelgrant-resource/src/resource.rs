//! Lifecycle handlers of the access-model resource.
//!
//! Every handler is a straight sequence of controller calls. A failed call
//! ends the handler with that error; there are no retries, and nothing already
//! applied on the controller is rolled back. In particular a Create that fails
//! on the third user leaves the first two granted, and the returned error does
//! not say which grants succeeded. Whether a combined update is applied
//! atomically is up to the [`ModelAccessClient`] implementation.

use std::sync::Arc;

use log::{debug, info};
use modelgrant_core::{
    AccessModelId, DestroyAccessModelInput, Error, GrantModelInput, ModelAccessClient, Result,
    UpdateAccessModelInput,
};

use crate::diff::missing_users;
use crate::model::{AccessModelConfig, AccessModelState};
use crate::plan::{Changes, PlanAction, plan};
use crate::schema::{ResourceSchema, access_model_schema};

/// The access-model resource, bound to a configured controller client.
#[derive(Clone)]
pub struct AccessModelResource {
    client: Arc<dyn ModelAccessClient>,
}

impl AccessModelResource {
    /// Binds the resource to a client.
    pub fn new(client: Arc<dyn ModelAccessClient>) -> Self {
        Self { client }
    }

    /// The client the handlers call.
    pub fn client(&self) -> &Arc<dyn ModelAccessClient> {
        &self.client
    }

    /// Schema of the resource.
    pub fn schema(&self) -> ResourceSchema {
        access_model_schema()
    }

    /// Decides which handler reaches `planned` from `prior`.
    pub fn plan(&self, prior: Option<&AccessModelState>, planned: &AccessModelConfig) -> PlanAction {
        plan(prior, planned)
    }

    /// Grants `planned.access` on `planned.model` to each user, one call per user.
    ///
    /// # Errors
    ///
    /// Returns the first validation or controller error. Users granted before
    /// the failure keep their access.
    pub async fn create(&self, planned: &AccessModelConfig) -> Result<AccessModelState> {
        planned.validate()?;
        let id = planned.id()?;

        let uuid = self.client.resolve_model_uuid(&planned.model).await?;
        let model_uuids = vec![uuid];

        for user in &planned.users {
            debug!("granting {} access on {} to {user}", planned.access, planned.model);
            self.client
                .grant_model(GrantModelInput {
                    user: user.clone(),
                    access: planned.access.clone(),
                    model_uuids: model_uuids.clone(),
                })
                .await?;
        }

        info!("created access model {id} for {} user(s)", planned.users.len());
        Ok(AccessModelState {
            id: Some(id),
            model: planned.model.clone(),
            access: planned.access.clone(),
            users: planned.users.clone(),
        })
    }

    /// Rebuilds state from the controller's user listing.
    ///
    /// Only users whose access exactly equals the identifier's level are
    /// kept, in listing order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::State`] if `current` has no identifier, or the
    /// controller error unchanged.
    pub async fn read(&self, current: &AccessModelState) -> Result<AccessModelState> {
        let id = current.require_id()?;
        self.read_id(id).await
    }

    /// [`read`](Self::read) by identifier.
    ///
    /// # Errors
    ///
    /// Returns the controller error unchanged.
    pub async fn read_id(&self, id: &AccessModelId) -> Result<AccessModelState> {
        let uuid = self.client.resolve_model_uuid(id.model()).await?;
        let listing = self.client.model_user_info(&uuid).await?;

        let users: Vec<String> = listing
            .into_iter()
            .filter(|entry| entry.access == id.access())
            .map(|entry| entry.user_name)
            .collect();

        debug!("read access model {id}: {} user(s)", users.len());
        Ok(AccessModelState {
            id: Some(id.clone()),
            model: id.model().to_string(),
            access: id.access().to_string(),
            users,
        })
    }

    /// Applies changed `users` and/or `access` in one combined controller call.
    ///
    /// The call grants the full planned user list, revokes users dropped
    /// from the list, and carries the new access level only when it changed.
    /// When nothing changed no call is made and `prior` is returned as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::State`] if `prior` has no identifier or `model`
    /// changed (that requires replacement), a validation error, or the
    /// controller error unchanged.
    pub async fn update(
        &self,
        prior: &AccessModelState,
        planned: &AccessModelConfig,
    ) -> Result<AccessModelState> {
        let id = prior.require_id()?;
        planned.validate()?;

        let changes = Changes::between(prior, planned);
        if changes.model {
            return Err(Error::state(format!(
                "model cannot change from {:?} to {:?} in place; the resource must be replaced",
                prior.model, planned.model
            )));
        }
        if !changes.any_updatable() {
            debug!("access model {id} unchanged");
            return Ok(prior.clone());
        }

        let revoke = if changes.users {
            missing_users(&prior.users, &planned.users)
        } else {
            Vec::new()
        };
        let access = changes.access.then(|| planned.access.clone());

        debug!(
            "updating access model {id}: grant {:?}, revoke {revoke:?}, access {access:?}",
            planned.users
        );
        self.client
            .update_access_model(UpdateAccessModelInput {
                model: id.clone(),
                grant: planned.users.clone(),
                revoke,
                access: access.clone(),
            })
            .await?;

        let id = match access {
            Some(access) => id.with_access(access)?,
            None => id.clone(),
        };

        info!("updated access model {id}");
        Ok(AccessModelState {
            id: Some(id),
            model: planned.model.clone(),
            access: planned.access.clone(),
            users: planned.users.clone(),
        })
    }

    /// Revokes access for every stored user in one call and clears the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::State`] if `current` has no identifier, or the
    /// controller error unchanged (the identifier is then kept).
    pub async fn delete(&self, current: &AccessModelState) -> Result<AccessModelState> {
        let id = current.require_id()?;

        self.client
            .destroy_access_model(DestroyAccessModelInput {
                model: id.clone(),
                revoke: current.users.clone(),
                access: current.access.clone(),
            })
            .await?;

        info!("deleted access model {id}");
        Ok(AccessModelState {
            id: None,
            ..current.clone()
        })
    }

    /// Seed state for adopting an existing grant; follow with [`read`](Self::read).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] if `raw` is not `<model>:<access>`.
    pub fn import_state(&self, raw: &str) -> Result<AccessModelState> {
        let id = AccessModelId::parse(raw)?;
        debug!("importing access model {id}");
        Ok(AccessModelState::from_id(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use modelgrant_core::{ClientCall, InMemoryController, Operation};

    async fn setup() -> (AccessModelResource, InMemoryController) {
        let controller = InMemoryController::new();
        controller.add_model("model1").await;
        let resource = AccessModelResource::new(Arc::new(controller.clone()));
        (resource, controller)
    }

    fn created(access: &str, users: &[&str]) -> AccessModelState {
        AccessModelState {
            id: Some(AccessModelId::new("model1", access).unwrap()),
            model: "model1".into(),
            access: access.into(),
            users: users.iter().map(|u| (*u).to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_grants_each_user() {
        let (resource, controller) = setup().await;
        let planned = AccessModelConfig::new("model1", "write", ["alice", "bob"]);

        let state = resource.create(&planned).await.unwrap();

        assert_eq!(state.id.unwrap().to_string(), "model1:write");
        assert_eq!(state.users, vec!["alice", "bob"]);
        let grants = controller
            .calls()
            .await
            .into_iter()
            .filter(|c| c.operation() == Operation::GrantModel)
            .count();
        assert_eq!(grants, 2);
    }

    #[tokio::test]
    async fn test_create_unknown_model() {
        let (resource, controller) = setup().await;
        let planned = AccessModelConfig::new("nope", "read", ["alice"]);

        let err = resource.create(&planned).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(controller.mutating_call_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_config_before_calls() {
        let (resource, controller) = setup().await;
        let planned = AccessModelConfig::new("model1", "", ["alice"]);

        assert!(matches!(
            resource.create(&planned).await,
            Err(Error::InvalidConfig(_))
        ));
        assert!(controller.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_read_filters_by_access() {
        let (resource, controller) = setup().await;
        controller.seed_access("model1", "alice", "read").await.unwrap();
        controller.seed_access("model1", "bob", "admin").await.unwrap();
        controller.seed_access("model1", "carol", "read").await.unwrap();

        let state = resource.read(&created("read", &[])).await.unwrap();
        assert_eq!(state.users, vec!["alice", "carol"]);
        assert_eq!(state.model, "model1");
        assert_eq!(state.access, "read");
        assert_eq!(controller.mutating_call_count().await, 0);
    }

    #[tokio::test]
    async fn test_read_without_id() {
        let (resource, _) = setup().await;
        let err = resource.read(&AccessModelState::default()).await.unwrap_err();
        assert!(matches!(err, Error::State(_)));
    }

    #[tokio::test]
    async fn test_read_surfaces_client_error_verbatim() {
        let (resource, controller) = setup().await;
        controller
            .fail_operation(Operation::ModelUserInfo, "permission denied")
            .await;

        let err = resource.read(&created("read", &[])).await.unwrap_err();
        assert_eq!(err.to_string(), "permission denied");
    }

    #[tokio::test]
    async fn test_update_users_only() {
        let (resource, controller) = setup().await;
        let prior = created("read", &["alice", "bob"]);
        let planned = AccessModelConfig::new("model1", "read", ["bob", "carol"]);

        let state = resource.update(&prior, &planned).await.unwrap();

        assert_eq!(state.id.as_ref().unwrap().to_string(), "model1:read");
        let calls = controller.calls().await;
        assert_eq!(
            calls,
            vec![ClientCall::UpdateAccessModel(UpdateAccessModelInput {
                model: AccessModelId::new("model1", "read").unwrap(),
                grant: vec!["bob".into(), "carol".into()],
                revoke: vec!["alice".into()],
                access: None,
            })]
        );
    }

    #[tokio::test]
    async fn test_update_model_change_is_rejected() {
        let (resource, controller) = setup().await;
        let prior = created("read", &["alice"]);
        let planned = AccessModelConfig::new("model2", "read", ["alice"]);

        let err = resource.update(&prior, &planned).await.unwrap_err();
        assert!(matches!(err, Error::State(_)));
        assert!(controller.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_failure_keeps_prior_identity() {
        let (resource, controller) = setup().await;
        controller
            .fail_operation(Operation::UpdateAccessModel, "update rejected")
            .await;
        let prior = created("read", &["alice"]);
        let planned = AccessModelConfig::new("model1", "admin", ["alice"]);

        let err = resource.update(&prior, &planned).await.unwrap_err();
        assert_eq!(err.to_string(), "update rejected");
        assert_eq!(prior.id.unwrap().to_string(), "model1:read");
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_id() {
        let (resource, controller) = setup().await;
        controller
            .fail_operation(Operation::DestroyAccessModel, "controller unreachable")
            .await;

        let err = resource
            .delete(&created("read", &["alice"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "controller unreachable");
    }

    #[tokio::test]
    async fn test_delete_without_id() {
        let (resource, controller) = setup().await;
        assert!(resource.delete(&AccessModelState::default()).await.is_err());
        assert!(controller.calls().await.is_empty());
    }

    #[test]
    fn test_import_state() {
        let resource = AccessModelResource::new(Arc::new(InMemoryController::new()));
        let state = resource.import_state("model1:admin").unwrap();
        assert_eq!(state.model, "model1");
        assert_eq!(state.access, "admin");
        assert!(state.users.is_empty());

        assert!(matches!(
            resource.import_state("model1"),
            Err(Error::InvalidId(_))
        ));
    }

    #[test]
    fn test_plan_delegates() {
        let resource = AccessModelResource::new(Arc::new(InMemoryController::new()));
        let planned = AccessModelConfig::new("model1", "read", ["alice"]);
        assert_eq!(resource.plan(None, &planned), PlanAction::Create);
        assert_eq!(resource.schema().type_name, "modelgrant_access_model");
    }
}
