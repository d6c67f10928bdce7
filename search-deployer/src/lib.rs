//! # Search Deployer
//!
//! Search index lifecycle for the content deployer: creates and deletes the
//! index of a target, recreates it when a target is upgraded, and keeps it
//! consistent while content is deployed.
//!
//! ## Architecture
//!
//! The deployer plugs into an external deployment pipeline through three
//! components, all of which talk to the search backend through the narrow
//! capabilities of `search-deployer-repository`:
//!
//! 1. **Lifecycle hook**: creates/deletes the index when a target is created/deleted
//! 2. **Upgrade operation**: recreates the index of targets that index into OpenSearch
//! 3. **Indexing processor**: commits writes and finds documents that include a changed component
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`lifecycle`]: Index lifecycle hook
//! - [`upgrade`]: Index upgrade operation
//! - [`processor`]: Indexing processor
//! - [`errors`]: Error types for the deployer

pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod processor;
pub mod upgrade;

pub use config::Dependencies;
pub use errors::UpgradeError;

use search_deployer_repository::SearchError;
use search_deployer_shared::ConfigError;
use thiserror::Error;

/// Errors that can occur during deployer initialization or execution.
#[derive(Error, Debug)]
pub enum DeployerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Search backend error.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),

    /// Upgrade error.
    #[error("Upgrade error: {0}")]
    UpgradeError(#[from] UpgradeError),

    /// Invalid command line usage.
    #[error("Usage error: {0}")]
    UsageError(String),
}

impl DeployerError {
    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::UsageError(msg.into())
    }
}
