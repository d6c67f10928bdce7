//! Error types for the search deployer.

use search_deployer_repository::SearchError;
use search_deployer_shared::ConfigError;
use thiserror::Error;

/// Errors that abort an upgrade operation for a target.
///
/// Upgrade failures are always surfaced to the upgrade pipeline as a failed
/// step: an index left half-recreated must not be silently skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpgradeError {
    /// The target configuration is missing a required property.
    #[error("Upgrade of target '{target_id}' failed: {source}")]
    ConfigError {
        target_id: String,
        #[source]
        source: ConfigError,
    },

    /// The search backend was not ready or the index could not be recreated.
    #[error("Upgrade of target '{target_id}' failed: {source}")]
    SearchError {
        target_id: String,
        #[source]
        source: SearchError,
    },
}

impl UpgradeError {
    /// Create a configuration error.
    pub fn config(target_id: impl Into<String>, source: ConfigError) -> Self {
        Self::ConfigError {
            target_id: target_id.into(),
            source,
        }
    }

    /// Create a search error.
    pub fn search(target_id: impl Into<String>, source: SearchError) -> Self {
        Self::SearchError {
            target_id: target_id.into(),
            source,
        }
    }

    /// The target whose upgrade failed.
    pub fn target_id(&self) -> &str {
        match self {
            Self::ConfigError { target_id, .. } | Self::SearchError { target_id, .. } => target_id,
        }
    }
}
