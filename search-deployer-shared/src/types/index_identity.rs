//! Index identifier resolution.
//!
//! An index id is either set explicitly through the `indexId` property of a
//! target configuration or derived from the site name with a printf-style
//! format such as `crafter-%s`.

use crate::errors::ConfigError;
use crate::types::hierarchical_config::HierarchicalConfig;

/// Configuration key of the explicit index id override.
pub const INDEX_ID_CONFIG_KEY: &str = "indexId";

/// Configuration key of the index id format.
pub const INDEX_ID_FORMAT_CONFIG_KEY: &str = "target.search.indexIdFormat";

/// Everything needed to name the index of one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexIdentity {
    /// The site whose content is indexed.
    pub site_name: String,
    /// Format with a single `%s` placeholder for the site name.
    pub index_id_format: String,
    /// Explicit id taken verbatim when present.
    pub explicit_index_id: Option<String>,
}

impl IndexIdentity {
    /// Read the optional `indexId` override from `config`.
    ///
    /// An empty override is treated as absent.
    pub fn from_config(
        config: &HierarchicalConfig,
        site_name: impl Into<String>,
        index_id_format: impl Into<String>,
    ) -> Self {
        let explicit_index_id = config
            .get_string(INDEX_ID_CONFIG_KEY)
            .filter(|id| !id.is_empty());

        Self {
            site_name: site_name.into(),
            index_id_format: index_id_format.into(),
            explicit_index_id,
        }
    }

    /// Resolve the index id: the explicit override verbatim, otherwise the
    /// format applied to the site name.
    pub fn resolve(&self) -> Result<String, ConfigError> {
        match &self.explicit_index_id {
            Some(id) => Ok(id.clone()),
            None => format_index_id(&self.index_id_format, &self.site_name),
        }
    }
}

/// Resolve the index id for `site_name` from `config` and `format`.
///
/// # Example
///
/// ```
/// use search_deployer_shared::{resolve_index_id, HierarchicalConfig};
///
/// let config = HierarchicalConfig::empty();
/// let id = resolve_index_id(&config, "mysite", "crafter-%s").expect("valid format");
/// assert_eq!(id, "crafter-mysite");
/// ```
pub fn resolve_index_id(
    config: &HierarchicalConfig,
    site_name: &str,
    format: &str,
) -> Result<String, ConfigError> {
    IndexIdentity::from_config(config, site_name, format).resolve()
}

/// Substitute `value` into the single `%s` placeholder of `format`.
///
/// `%%` renders a literal percent sign. Any other conversion, a missing
/// placeholder or more than one placeholder is rejected.
pub fn format_index_id(format: &str, value: &str) -> Result<String, ConfigError> {
    let mut formatted = String::with_capacity(format.len() + value.len());
    let mut placeholders = 0;
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            formatted.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => {
                placeholders += 1;
                formatted.push_str(value);
            }
            Some('%') => formatted.push('%'),
            Some(other) => {
                return Err(ConfigError::invalid(
                    INDEX_ID_FORMAT_CONFIG_KEY,
                    format!("unsupported conversion '%{}' in '{}'", other, format),
                ))
            }
            None => {
                return Err(ConfigError::invalid(
                    INDEX_ID_FORMAT_CONFIG_KEY,
                    format!("dangling '%' in '{}'", format),
                ))
            }
        }
    }

    if placeholders != 1 {
        return Err(ConfigError::invalid(
            INDEX_ID_FORMAT_CONFIG_KEY,
            format!(
                "expected exactly one '%s' placeholder in '{}', found {}",
                format, placeholders
            ),
        ));
    }
    if formatted.is_empty() {
        return Err(ConfigError::invalid(
            INDEX_ID_FORMAT_CONFIG_KEY,
            "resolved index id is empty",
        ));
    }

    Ok(formatted)
}
