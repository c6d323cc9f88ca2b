//! Command-line driver for the modelgrant access-model resource.
//!
//! Keeps the controller tables and the resource state in JSON files and
//! runs one resource handler per invocation.

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod store;

pub use app::ModelgrantCli;
pub use cli::{CliArgs, Command, ConfigAction, ConfigCommand};
pub use config::ModelgrantConfig;
