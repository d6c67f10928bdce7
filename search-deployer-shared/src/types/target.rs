//! Deployment target descriptors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::hierarchical_config::HierarchicalConfig;

/// Environment a target deploys to.
///
/// Authoring targets index drafts for content editors, delivery targets index
/// published content only. The two use different index mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetEnvironment {
    Authoring,
    Delivery,
}

impl TargetEnvironment {
    pub fn is_authoring(self) -> bool {
        matches!(self, Self::Authoring)
    }
}

impl fmt::Display for TargetEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authoring => f.write_str("authoring"),
            Self::Delivery => f.write_str("delivery"),
        }
    }
}

impl FromStr for TargetEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "authoring" | "preview" => Ok(Self::Authoring),
            "delivery" | "default" => Ok(Self::Delivery),
            other => Err(ConfigError::invalid(
                "env",
                format!("unknown target environment '{}'", other),
            )),
        }
    }
}

/// Read-only view of a target while an upgrade operation runs against it.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetUpgradeContext {
    /// Target identifier, usually `<site>-<env>`.
    pub id: String,
    pub environment: TargetEnvironment,
    pub site_name: String,
    /// Set when the target indexes into the other supported search backend.
    pub other_search_backend_enabled: bool,
    pub configuration: HierarchicalConfig,
}

impl TargetUpgradeContext {
    /// Create a context for a target that does not use the other search backend.
    pub fn new(
        id: impl Into<String>,
        environment: TargetEnvironment,
        site_name: impl Into<String>,
        configuration: HierarchicalConfig,
    ) -> Self {
        Self {
            id: id.into(),
            environment,
            site_name: site_name.into(),
            other_search_backend_enabled: false,
            configuration,
        }
    }

    /// Flag the target as using the other search backend.
    pub fn with_other_search_backend(mut self, enabled: bool) -> Self {
        self.other_search_backend_enabled = enabled;
        self
    }

    pub fn is_env_authoring(&self) -> bool {
        self.environment.is_authoring()
    }
}
