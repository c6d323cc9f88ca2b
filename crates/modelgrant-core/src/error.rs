//! Error types for modelgrant operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all modelgrant crates. Uses `thiserror` for derive macros.
//!
//! Every error is terminal for the operation that produced it: nothing here is
//! retried, downgraded to a warning, or compensated for.

use thiserror::Error;

use crate::id::IdError;

/// Errors that can occur in modelgrant operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Failure reported by the controller client, passed through verbatim.
    #[error("{0}")]
    Remote(String),

    /// A model or other remote entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed `model:access` identifier.
    #[error("Invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// Declared resource configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Local resource state is missing or inconsistent.
    #[error("State error: {0}")]
    State(String),

    /// Provider configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create a remote (client) error.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid resource configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a local state error.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Create a provider configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Whether the error came from the controller rather than local handling.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::NotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias using modelgrant's Error type.
pub type Result<T> = std::result::Result<T, Error>;
