//! OpenSearch configuration and cluster topology resolution.
//!
//! A target either talks to a single (global) cluster for reads and writes, or
//! reads from one cluster and writes to several. The split topology is only
//! used when the read cluster and at least one write cluster have URLs;
//! otherwise everything falls back to the global cluster, which then must have
//! at least one URL.

use std::collections::BTreeMap;

use search_deployer_shared::{ConfigError, HierarchicalConfig};

use crate::opensearch::cluster_config::ClusterConfig;

/// The global cluster section, used for single-cluster targets.
pub const CONFIG_KEY_GLOBAL_CLUSTER: &str = "target.search.openSearch";

/// The read cluster section of a split topology.
pub const CONFIG_KEY_READ_CLUSTER: &str = "target.search.openSearch.readCluster";

/// The write cluster list of a split topology.
pub const CONFIG_KEY_WRITE_CLUSTERS: &str = "target.search.openSearch.writeClusters";

/// Mapping of locale codes to language analyzers.
pub const CONFIG_KEY_LOCALE_MAPPING: &str = "target.search.openSearch.locale.mapping";

/// List of `key`/`value` entries applied to every created index.
pub const CONFIG_KEY_INDEX_SETTINGS: &str = "target.search.openSearch.indexSettings";

const CONFIG_KEY_KEY: &str = "key";
const CONFIG_KEY_VALUE: &str = "value";

/// Index settings applied on index creation (setting key to value).
pub type IndexSettings = BTreeMap<String, String>;

/// Locale code to OpenSearch language analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleMapping {
    analyzers: BTreeMap<String, String>,
}

impl LocaleMapping {
    pub fn new(analyzers: BTreeMap<String, String>) -> Self {
        Self { analyzers }
    }

    /// The analyzer for `locale`.
    ///
    /// Lookups are case-insensitive and accept `-` or `_` as separator. A
    /// regional locale such as `en_US` falls back to its language (`en`) when
    /// it has no entry of its own.
    pub fn analyzer_for(&self, locale: &str) -> Option<&str> {
        let normalized = normalize_locale(locale);
        if let Some(analyzer) = self.find(&normalized) {
            return Some(analyzer);
        }
        let language = normalized.split('_').next()?;
        self.find(language)
    }

    fn find(&self, normalized: &str) -> Option<&str> {
        self.analyzers
            .iter()
            .find(|(locale, _)| normalize_locale(locale) == normalized)
            .map(|(_, analyzer)| analyzer.as_str())
    }

    /// Configured locales and their analyzers, ordered by locale.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.analyzers
            .iter()
            .map(|(locale, analyzer)| (locale.as_str(), analyzer.as_str()))
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }
}

fn normalize_locale(locale: &str) -> String {
    locale.trim().replace('-', "_").to_lowercase()
}

/// Resolved cluster topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology<'a> {
    /// One cluster serves reads and writes.
    Single(&'a ClusterConfig),
    /// Reads go to one cluster, writes are sent to every write cluster.
    Split {
        read: &'a ClusterConfig,
        writes: &'a [ClusterConfig],
    },
}

/// OpenSearch configuration of a target.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenSearchConfig {
    /// Used for reads and writes when a single cluster is in effect.
    pub global_cluster: ClusterConfig,
    /// Used for reads in a split topology.
    pub read_cluster: ClusterConfig,
    /// Used for writes in a split topology.
    pub write_clusters: Vec<ClusterConfig>,
    pub locale_mapping: LocaleMapping,
    pub index_settings: IndexSettings,
}

impl OpenSearchConfig {
    /// Load the OpenSearch configuration of a target.
    ///
    /// Read and write clusters inherit unset fields from the global cluster.
    /// Fails immediately when a single cluster is in effect but the global
    /// cluster has no URLs, or when a split topology mixes write clusters with
    /// and without URLs.
    ///
    /// # Example
    ///
    /// ```
    /// use search_deployer_repository::OpenSearchConfig;
    /// use search_deployer_shared::HierarchicalConfig;
    ///
    /// let config = HierarchicalConfig::from_yaml_str(
    ///     "target:\n  search:\n    openSearch:\n      urls: http://a:9200\n",
    /// )
    /// .expect("valid yaml");
    /// let opensearch = OpenSearchConfig::from_config(&config).expect("valid topology");
    /// assert!(opensearch.use_single_cluster());
    /// ```
    pub fn from_config(config: &HierarchicalConfig) -> Result<Self, ConfigError> {
        let global_cluster = if config.has_children(CONFIG_KEY_GLOBAL_CLUSTER) {
            ClusterConfig::from_config(
                config.configuration_at(CONFIG_KEY_GLOBAL_CLUSTER).as_ref(),
                None,
            )
            .map_err(|e| e.prefixed(CONFIG_KEY_GLOBAL_CLUSTER))?
        } else {
            ClusterConfig::inactive()
        };

        let read_cluster = if config.has_children(CONFIG_KEY_READ_CLUSTER) {
            ClusterConfig::from_config(
                config.configuration_at(CONFIG_KEY_READ_CLUSTER).as_ref(),
                Some(&global_cluster),
            )
            .map_err(|e| e.prefixed(CONFIG_KEY_READ_CLUSTER))?
        } else {
            ClusterConfig::inactive()
        };

        let write_clusters = config
            .configurations_at(CONFIG_KEY_WRITE_CLUSTERS)
            .iter()
            .map(|section| {
                ClusterConfig::from_config(Some(section), Some(&global_cluster))
                    .map_err(|e| e.prefixed(CONFIG_KEY_WRITE_CLUSTERS))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let locale_mapping = LocaleMapping::new(config.entries(CONFIG_KEY_LOCALE_MAPPING));

        let mut index_settings = IndexSettings::new();
        for setting in config.configurations_at(CONFIG_KEY_INDEX_SETTINGS) {
            let key = setting
                .get_required_string(CONFIG_KEY_KEY)
                .map_err(|e| e.prefixed(CONFIG_KEY_INDEX_SETTINGS))?;
            let value = setting.get_string(CONFIG_KEY_VALUE).unwrap_or_default();
            index_settings.insert(key, value);
        }

        let opensearch_config = Self {
            global_cluster,
            read_cluster,
            write_clusters,
            locale_mapping,
            index_settings,
        };
        opensearch_config.validate()?;
        Ok(opensearch_config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.use_single_cluster() {
            if !self.global_cluster.is_active() {
                return Err(ConfigError::topology(format!(
                    "Invalid OpenSearch configuration: '{}.urls' is required when no read cluster and write clusters are configured",
                    CONFIG_KEY_GLOBAL_CLUSTER
                )));
            }
        } else if let Some(position) = self.write_clusters.iter().position(|c| !c.is_active()) {
            return Err(ConfigError::topology(format!(
                "Invalid OpenSearch configuration: write cluster #{} has no urls while others do",
                position
            )));
        }
        Ok(())
    }

    /// Whether a single cluster is used, which is the case unless the read
    /// cluster and at least one write cluster have URLs.
    pub fn use_single_cluster(&self) -> bool {
        !self.read_cluster.is_active() || !self.write_clusters.iter().any(ClusterConfig::is_active)
    }

    /// The topology in effect.
    pub fn topology(&self) -> Topology<'_> {
        if self.use_single_cluster() {
            Topology::Single(&self.global_cluster)
        } else {
            Topology::Split {
                read: &self.read_cluster,
                writes: &self.write_clusters,
            }
        }
    }

    /// The cluster reads are sent to.
    pub fn read_cluster_config(&self) -> &ClusterConfig {
        match self.topology() {
            Topology::Single(cluster) => cluster,
            Topology::Split { read, .. } => read,
        }
    }

    /// The clusters writes are sent to.
    pub fn write_cluster_configs(&self) -> &[ClusterConfig] {
        match self.topology() {
            Topology::Single(cluster) => std::slice::from_ref(cluster),
            Topology::Split { writes, .. } => writes,
        }
    }
}
