//! Core domain library for RawPaste (config, storage, identifiers, gateway).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Database access layer.
pub mod db;
/// Environment variable names and scoped overrides.
pub mod env;
/// Application error types (storage/domain).
pub mod error;
/// Snippet submission and retrieval policy.
pub mod gateway;
/// Short identifier allocation.
pub mod identifier;
/// Data models for API requests and persistence.
pub mod models;
/// Snippet store collaborator interface.
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::*;
pub use db::Database;
pub use error::{AppError, GatewayError};
pub use gateway::SnippetGateway;
pub use identifier::IdentifierAllocator;
pub use store::{InsertOutcome, SnippetStore};
