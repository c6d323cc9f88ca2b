//! The access-model resource.
//!
//! Maps declarative state (a model, an access level, and the users holding
//! it) onto controller calls through a [`ModelAccessClient`].
//!
//! # Key Abstractions
//!
//! - [`AccessModelResource`]: Create/Read/Update/Delete/Import handlers
//! - [`AccessModelConfig`] / [`AccessModelState`]: declared config and persisted state
//! - [`plan`]: which handler the host should call
//! - [`missing_users`]: users dropped between two lists
//!
//! [`ModelAccessClient`]: modelgrant_core::ModelAccessClient

pub mod diagnostics;
pub mod diff;
pub mod model;
pub mod plan;
pub mod resource;
pub mod schema;

pub use diagnostics::{Diagnostic, Severity};
pub use diff::missing_users;
pub use model::{AccessModelConfig, AccessModelState};
pub use plan::{Changes, PlanAction, plan};
pub use resource::AccessModelResource;
pub use schema::{ACCESS_MODEL_TYPE, Attribute, AttributeType, ResourceSchema, access_model_schema};
