//! Index lifecycle hook.
//!
//! Creates the index of a target when the target is created and deletes it
//! when the target is deleted.

use std::sync::Arc;

use async_trait::async_trait;
use search_deployer_repository::{SearchAdminService, SearchError};
use search_deployer_shared::{ConfigError, HierarchicalConfig, IndexIdentity};
use tracing::{debug, info, instrument};

use crate::lifecycle::{LifecycleEvent, LifecycleHook};

/// Required settings of an [`IndexLifecycleHook`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHookConfig {
    /// The site whose content is indexed.
    pub site_name: String,
    /// Format with a single `%s` placeholder for the site name.
    pub index_id_format: String,
    /// Whether the index holds authoring content.
    pub authoring_index: bool,
}

impl IndexHookConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.site_name.trim().is_empty() {
            return Err(ConfigError::missing("siteName"));
        }
        if self.index_id_format.trim().is_empty() {
            return Err(ConfigError::missing("indexIdFormat"));
        }
        Ok(())
    }
}

/// Hook creating or deleting the index of a target.
///
/// The index id is resolved once, when the hook is initialized: the explicit
/// `indexId` of the target configuration if set, otherwise the index id
/// format applied to the site name.
pub struct IndexLifecycleHook {
    index_id: String,
    authoring_index: bool,
    admin: Arc<dyn SearchAdminService>,
}

impl IndexLifecycleHook {
    /// Initialize the hook for a target.
    ///
    /// # Arguments
    ///
    /// * `config` - The target configuration (read for the `indexId` override)
    /// * `hook_config` - Site name, index id format and index variant
    /// * `admin` - Admin capability of the target's search backend
    ///
    /// # Returns
    ///
    /// * `Ok(IndexLifecycleHook)` - A hook with its index id resolved
    /// * `Err(ConfigError)` - If a required setting is missing or the format is malformed
    pub fn init(
        config: &HierarchicalConfig,
        hook_config: IndexHookConfig,
        admin: Arc<dyn SearchAdminService>,
    ) -> Result<Self, ConfigError> {
        hook_config.validate()?;
        let index_id = IndexIdentity::from_config(
            config,
            hook_config.site_name,
            hook_config.index_id_format,
        )
        .resolve()?;

        debug!(index_id = %index_id, "Resolved index id");

        Ok(Self {
            index_id,
            authoring_index: hook_config.authoring_index,
            admin,
        })
    }

    /// The resolved index id.
    pub fn index_id(&self) -> &str {
        &self.index_id
    }

    /// Create the index of the target.
    ///
    /// Always delegated to the admin service, which skips indices that already
    /// exist on each write cluster. A retry after a partial failure therefore
    /// creates whatever is still missing.
    #[instrument(skip(self), fields(index_id = %self.index_id))]
    pub async fn on_target_created(&self) -> Result<(), SearchError> {
        self.admin
            .create_index(&self.index_id, self.authoring_index)
            .await?;
        info!(authoring = self.authoring_index, "Index created");
        Ok(())
    }

    /// Delete the index of the target.
    ///
    /// Always delegated to the admin service, which treats indices missing
    /// from a write cluster as already deleted.
    #[instrument(skip(self), fields(index_id = %self.index_id))]
    pub async fn on_target_deleted(&self) -> Result<(), SearchError> {
        self.admin.delete_index(&self.index_id).await?;
        info!("Index deleted");
        Ok(())
    }
}

#[async_trait]
impl LifecycleHook for IndexLifecycleHook {
    fn name(&self) -> &'static str {
        "indexLifecycleHook"
    }

    async fn execute(&self, event: LifecycleEvent) -> Result<(), SearchError> {
        match event {
            LifecycleEvent::TargetCreated => self.on_target_created().await,
            LifecycleEvent::TargetDeleted => self.on_target_deleted().await,
        }
    }
}
