//! Index recreation on upgrade.
//!
//! When the index schema changes between versions, the index of every target
//! that indexes into this backend has to be rebuilt. Targets are detected by
//! the processors of their deployment pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use search_deployer_repository::SearchAdminService;
use search_deployer_shared::{
    format_index_id, HierarchicalConfig, TargetUpgradeContext, INDEX_ID_FORMAT_CONFIG_KEY,
};
use tracing::{info, instrument};

use crate::errors::UpgradeError;
use crate::upgrade::{SkipReason, UpgradeOperation, UpgradeOutcome};

/// The list of processors of a target's deployment pipeline.
pub const TARGET_DEPLOYMENT_PIPELINE_CONFIG_KEY: &str = "target.deployment.pipeline";

/// The processor name property of a pipeline entry.
pub const PROCESSOR_NAME_CONFIG_KEY: &str = "processorName";

/// Older pipeline entries name their processor with `name`.
const LEGACY_PROCESSOR_NAME_CONFIG_KEY: &str = "name";

/// Names of the processors indexing into this backend: the authoring variant
/// (`authoringElasticsearchIndexingProcessor`) and the generic one
/// (`elasticsearchIndexingProcessor`). Matched case-sensitively against the
/// whole name; must follow the processor naming convention of the pipeline.
pub const PROCESSOR_NAME_PATTERN: &str = r"^(authoringE|e)lasticsearchIndexingProcessor$";

lazy_static! {
    static ref PROCESSOR_NAME_REGEXP: Regex = Regex::new(PROCESSOR_NAME_PATTERN).unwrap();
}

/// Whether any processor of the deployment pipeline in `config` indexes into
/// this backend.
pub fn contains_processor(config: &HierarchicalConfig) -> bool {
    config
        .configurations_at(TARGET_DEPLOYMENT_PIPELINE_CONFIG_KEY)
        .iter()
        .filter_map(|processor| {
            processor
                .get_string(PROCESSOR_NAME_CONFIG_KEY)
                .or_else(|| processor.get_string(LEGACY_PROCESSOR_NAME_CONFIG_KEY))
        })
        .any(|name| PROCESSOR_NAME_REGEXP.is_match(&name))
}

/// Recreates the aliased index of targets indexing into this backend.
///
/// The admin service is the one of the target being upgraded; it is waited on
/// until ready before the index is recreated.
pub struct IndexUpgradeOperation {
    admin: Arc<dyn SearchAdminService>,
}

impl IndexUpgradeOperation {
    pub fn new(admin: Arc<dyn SearchAdminService>) -> Self {
        Self { admin }
    }

    /// Decide whether the operation applies to `target`.
    pub fn check_applicable(target: &TargetUpgradeContext) -> Result<(), SkipReason> {
        if target.other_search_backend_enabled {
            return Err(SkipReason::OtherSearchBackend);
        }
        if !contains_processor(&target.configuration) {
            return Err(SkipReason::NoIndexingProcessor);
        }
        Ok(())
    }
}

#[async_trait]
impl UpgradeOperation for IndexUpgradeOperation {
    fn name(&self) -> &'static str {
        "indexUpgradeOperation"
    }

    #[instrument(skip(self, target), fields(target_id = %target.id))]
    async fn execute(&self, target: &TargetUpgradeContext) -> Result<UpgradeOutcome, UpgradeError> {
        if let Err(reason) = Self::check_applicable(target) {
            info!(reason = %reason, "Target does not use this search backend, skipping");
            return Ok(UpgradeOutcome::NotApplicable { reason });
        }

        let alias = target
            .configuration
            .get_required_string(INDEX_ID_FORMAT_CONFIG_KEY)
            .and_then(|format| format_index_id(&format, &target.site_name))
            .map_err(|e| UpgradeError::config(&target.id, e))?;

        self.admin
            .wait_until_ready()
            .await
            .map_err(|e| UpgradeError::search(&target.id, e))?;
        self.admin
            .recreate_index(&alias, target.is_env_authoring())
            .await
            .map_err(|e| UpgradeError::search(&target.id, e))?;

        info!(alias = %alias, authoring = target.is_env_authoring(), "Index recreated for target");
        Ok(UpgradeOutcome::Recreated { alias })
    }
}
