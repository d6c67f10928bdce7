//! Upgrade operations run once per target when the deployer is upgraded.

mod index_upgrade_operation;

pub use index_upgrade_operation::{
    contains_processor, IndexUpgradeOperation, PROCESSOR_NAME_CONFIG_KEY, PROCESSOR_NAME_PATTERN,
    TARGET_DEPLOYMENT_PIPELINE_CONFIG_KEY,
};

use std::fmt;

use async_trait::async_trait;
use search_deployer_shared::TargetUpgradeContext;

use crate::errors::UpgradeError;

/// Why an upgrade operation did not apply to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The target indexes into the other supported search backend.
    OtherSearchBackend,
    /// No processor of the target's deployment pipeline indexes into this backend.
    NoIndexingProcessor,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OtherSearchBackend => f.write_str("target uses another search backend"),
            Self::NoIndexingProcessor => f.write_str("no matching indexing processor in pipeline"),
        }
    }
}

/// Result of a successful upgrade operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// The target was left untouched.
    NotApplicable { reason: SkipReason },
    /// The index behind `alias` was recreated.
    Recreated { alias: String },
}

/// A one-shot migration step executed by an external upgrade pipeline.
///
/// The pipeline guarantees at-most-once execution per target and upgrade
/// version; an error marks the step as failed for that target.
#[async_trait]
pub trait UpgradeOperation: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Run the operation against `target`.
    async fn execute(&self, target: &TargetUpgradeContext) -> Result<UpgradeOutcome, UpgradeError>;
}
