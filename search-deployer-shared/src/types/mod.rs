//! This module defines the core data structures shared by the deployer crates.
//! It re-exports the configuration tree, target descriptors and index identity.

pub mod hierarchical_config;
pub mod index_identity;
pub mod target;

pub use hierarchical_config::HierarchicalConfig;
pub use index_identity::IndexIdentity;
pub use target::{TargetEnvironment, TargetUpgradeContext};
