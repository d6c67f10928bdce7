//! # Search Deployer Shared
//!
//! This crate defines the shared data structures used across the search
//! deployer crates: the hierarchical target configuration tree, target
//! descriptors and index identifier resolution.

pub mod errors;
pub mod types;

pub use errors::ConfigError;
pub use types::hierarchical_config::HierarchicalConfig;
pub use types::index_identity::{
    format_index_id, resolve_index_id, IndexIdentity, INDEX_ID_CONFIG_KEY, INDEX_ID_FORMAT_CONFIG_KEY,
};
pub use types::target::{TargetEnvironment, TargetUpgradeContext};
