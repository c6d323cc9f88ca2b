//! modelgrant core: shared types, errors, and the controller client trait.
//!
//! This crate has no internal modelgrant dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`id`]: The `model:access` resource identifier
//! - [`client`]: The [`ModelAccessClient`] trait and its request types
//! - [`memory`]: An in-memory controller implementing the trait

pub mod client;
pub mod error;
pub mod id;
pub mod memory;

// Re-export key types at crate root for convenience
pub use client::{
    DestroyAccessModelInput, GrantModelInput, ModelAccessClient, ModelUserInfo,
    UpdateAccessModelInput,
};
pub use error::{Error, Result};
pub use id::{AccessModelId, IdError};
pub use memory::{ClientCall, ControllerSnapshot, InMemoryController, ModelRecord, Operation};
