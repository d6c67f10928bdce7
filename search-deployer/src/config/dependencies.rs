//! Dependency initialization and wiring for the search deployer.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use search_deployer_repository::{
    OpenSearchAdminService, OpenSearchClients, OpenSearchConfig, OpenSearchSearchService,
    ReadinessConfig,
};
use search_deployer_shared::{
    ConfigError, HierarchicalConfig, TargetEnvironment, TargetUpgradeContext,
    INDEX_ID_FORMAT_CONFIG_KEY,
};
use tracing::{info, warn};

use crate::lifecycle::{IndexHookConfig, IndexLifecycleHook};
use crate::processor::IndexingProcessor;
use crate::upgrade::IndexUpgradeOperation;
use crate::DeployerError;

/// Default index id format, the bare site name.
const DEFAULT_INDEX_ID_FORMAT: &str = "%s";

/// Default readiness timeout in seconds.
const DEFAULT_READINESS_TIMEOUT_SECS: u64 = 300;

/// Flag set on targets indexing into the other supported search backend.
pub const OTHER_SEARCH_BACKEND_CONFIG_KEY: &str = "target.search.crafterSearch.enabled";

/// Settings of one deployer run, usually read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployerSettings {
    /// Path of the target configuration YAML file.
    pub target_config_path: String,
    pub site_name: String,
    pub target_id: String,
    pub environment: TargetEnvironment,
    /// Overrides `target.search.indexIdFormat` when set.
    pub index_id_format: Option<String>,
    pub readiness_timeout: Duration,
}

impl DeployerSettings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TARGET_CONFIG_PATH`: Target configuration file (required)
    /// - `SITE_NAME`: Site of the target (required)
    /// - `TARGET_ENV`: "authoring" or "delivery" (default: delivery)
    /// - `TARGET_ID`: Target identifier (default: `<site>-<env>`)
    /// - `INDEX_ID_FORMAT`: Index id format (default: from the target configuration, else `%s`)
    /// - `READINESS_TIMEOUT_SECS`: Readiness wait bound in seconds (default: 300)
    pub fn from_env() -> Result<Self, ConfigError> {
        let target_config_path = required_env("TARGET_CONFIG_PATH")?;
        let site_name = required_env("SITE_NAME")?;
        let environment = match env::var("TARGET_ENV") {
            Ok(value) => value.parse()?,
            Err(_) => TargetEnvironment::Delivery,
        };
        let target_id =
            env::var("TARGET_ID").unwrap_or_else(|_| format!("{}-{}", site_name, environment));
        let index_id_format = env::var("INDEX_ID_FORMAT").ok().filter(|f| !f.is_empty());
        let readiness_timeout = match env::var("READINESS_TIMEOUT_SECS") {
            Ok(value) => match value.parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    warn!(value = %value, "Invalid READINESS_TIMEOUT_SECS, using default");
                    Duration::from_secs(DEFAULT_READINESS_TIMEOUT_SECS)
                }
            },
            Err(_) => Duration::from_secs(DEFAULT_READINESS_TIMEOUT_SECS),
        };

        Ok(Self {
            target_config_path,
            site_name,
            target_id,
            environment,
            index_id_format,
            readiness_timeout,
        })
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::missing(name))
}

/// The index id format used by the lifecycle hook.
///
/// The `INDEX_ID_FORMAT` override wins over `target.search.indexIdFormat`,
/// which wins over the bare site name. The upgrade operation always reads the
/// target configuration, so when the override disagrees with a configured
/// format the configured one is returned alongside.
fn resolve_index_id_format(
    settings: &DeployerSettings,
    config: &HierarchicalConfig,
) -> (String, Option<String>) {
    let configured = config
        .get_string(INDEX_ID_FORMAT_CONFIG_KEY)
        .filter(|format| !format.is_empty());

    match settings.index_id_format.clone() {
        Some(format) => {
            let conflict = configured.filter(|configured| *configured != format);
            (format, conflict)
        }
        None => (
            configured.unwrap_or_else(|| DEFAULT_INDEX_ID_FORMAT.to_string()),
            None,
        ),
    }
}

/// Container for all initialized dependencies of a target.
pub struct Dependencies {
    pub target: TargetUpgradeContext,
    /// Resolved index id of the target.
    pub index_id: String,
    pub lifecycle_hook: IndexLifecycleHook,
    pub upgrade_operation: IndexUpgradeOperation,
    pub indexing_processor: IndexingProcessor,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables and the target
    /// configuration file they point to.
    pub fn new() -> Result<Self, DeployerError> {
        let settings = DeployerSettings::from_env()?;
        let config = HierarchicalConfig::from_yaml_file(&settings.target_config_path)?;
        Self::build(&settings, config)
    }

    /// Wire the components of a target.
    ///
    /// Configuration errors (including an unusable cluster topology) fail here,
    /// before any request is sent to the search backend.
    pub fn build(
        settings: &DeployerSettings,
        config: HierarchicalConfig,
    ) -> Result<Self, DeployerError> {
        let opensearch_config = OpenSearchConfig::from_config(&config)?;

        info!(
            target_id = %settings.target_id,
            site_name = %settings.site_name,
            environment = %settings.environment,
            single_cluster = opensearch_config.use_single_cluster(),
            "Initializing dependencies"
        );

        let clients = Arc::new(OpenSearchClients::from_config(&opensearch_config)?);
        let admin = Arc::new(
            OpenSearchAdminService::new(clients.clone(), &opensearch_config)
                .with_readiness(ReadinessConfig::with_timeout(settings.readiness_timeout)),
        );
        let search = Arc::new(OpenSearchSearchService::new(clients));

        let (index_id_format, configured_format) = resolve_index_id_format(settings, &config);
        if let Some(configured_format) = configured_format {
            warn!(
                override_format = %index_id_format,
                configured_format = %configured_format,
                "INDEX_ID_FORMAT differs from {}; upgrades recreate the configured alias, not the hook's index",
                INDEX_ID_FORMAT_CONFIG_KEY
            );
        }

        let lifecycle_hook = IndexLifecycleHook::init(
            &config,
            IndexHookConfig {
                site_name: settings.site_name.clone(),
                index_id_format,
                authoring_index: settings.environment.is_authoring(),
            },
            admin.clone(),
        )?;
        let index_id = lifecycle_hook.index_id().to_string();

        let other_search_backend_enabled = config
            .get_bool(OTHER_SEARCH_BACKEND_CONFIG_KEY)?
            .unwrap_or(false);
        let target = TargetUpgradeContext::new(
            settings.target_id.clone(),
            settings.environment,
            settings.site_name.clone(),
            config,
        )
        .with_other_search_backend(other_search_backend_enabled);

        info!(index_id = %index_id, "Dependencies initialized");

        Ok(Self {
            target,
            index_id,
            lifecycle_hook,
            upgrade_operation: IndexUpgradeOperation::new(admin),
            indexing_processor: IndexingProcessor::new(search),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> DeployerSettings {
        DeployerSettings {
            target_config_path: "unused.yaml".to_string(),
            site_name: "mysite".to_string(),
            target_id: "mysite-authoring".to_string(),
            environment: TargetEnvironment::Authoring,
            index_id_format: None,
            readiness_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_build_resolves_index_id_from_config() {
        let config = HierarchicalConfig::from(json!({
            "target": { "search": {
                "indexIdFormat": "crafter-%s",
                "openSearch": { "urls": ["http://localhost:9200"] }
            } }
        }));

        let deps = Dependencies::build(&settings(), config).unwrap();
        assert_eq!(deps.index_id, "crafter-mysite");
        assert!(deps.target.is_env_authoring());
        assert!(!deps.target.other_search_backend_enabled);
    }

    #[test]
    fn test_settings_format_overrides_config() {
        let config = HierarchicalConfig::from(json!({
            "target": { "search": {
                "indexIdFormat": "crafter-%s",
                "openSearch": { "urls": ["http://localhost:9200"] }
            } }
        }));
        let mut settings = settings();
        settings.index_id_format = Some("%s-preview".to_string());

        let deps = Dependencies::build(&settings, config).unwrap();
        assert_eq!(deps.index_id, "mysite-preview");
    }

    #[test]
    fn test_index_id_format_override_conflict() {
        let config = HierarchicalConfig::from(json!({
            "target": { "search": { "indexIdFormat": "crafter-%s" } }
        }));
        let mut settings = settings();

        assert_eq!(
            resolve_index_id_format(&settings, &config),
            ("crafter-%s".to_string(), None)
        );

        settings.index_id_format = Some("%s-preview".to_string());
        assert_eq!(
            resolve_index_id_format(&settings, &config),
            ("%s-preview".to_string(), Some("crafter-%s".to_string()))
        );

        settings.index_id_format = Some("crafter-%s".to_string());
        assert_eq!(
            resolve_index_id_format(&settings, &config),
            ("crafter-%s".to_string(), None)
        );

        settings.index_id_format = Some("%s-preview".to_string());
        assert_eq!(
            resolve_index_id_format(&settings, &HierarchicalConfig::empty()),
            ("%s-preview".to_string(), None)
        );
        settings.index_id_format = None;
        assert_eq!(
            resolve_index_id_format(&settings, &HierarchicalConfig::empty()),
            ("%s".to_string(), None)
        );
    }

    #[test]
    fn test_build_fails_without_cluster() {
        let config = HierarchicalConfig::from(json!({ "target": { "search": {} } }));
        let result = Dependencies::build(&settings(), config);
        assert!(matches!(
            result,
            Err(DeployerError::ConfigError(ConfigError::InvalidTopology(_)))
        ));
    }

    #[test]
    fn test_other_search_backend_flag() {
        let config = HierarchicalConfig::from(json!({
            "target": { "search": {
                "crafterSearch": { "enabled": true },
                "openSearch": { "urls": ["http://localhost:9200"] }
            } }
        }));

        let deps = Dependencies::build(&settings(), config).unwrap();
        assert!(deps.target.other_search_backend_enabled);
        assert_eq!(deps.index_id, "mysite");
    }
}
