//! Configuration module for the search deployer.
//!
//! Handles settings and dependency initialization.

mod dependencies;

pub use dependencies::{Dependencies, DeployerSettings};
