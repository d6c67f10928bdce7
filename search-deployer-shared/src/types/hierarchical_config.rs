//! Hierarchical target configuration.
//!
//! Target configuration files are YAML documents addressed with dotted keys
//! such as `target.search.openSearch.readCluster`. The tree is loaded once and
//! is read-only afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::errors::ConfigError;

/// Read-only view over a hierarchical configuration tree.
///
/// Every sub-tree returned by [`HierarchicalConfig::configuration_at`] or
/// [`HierarchicalConfig::configurations_at`] is itself a `HierarchicalConfig`
/// whose keys are relative to that sub-tree.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalConfig {
    root: Value,
}

impl Default for HierarchicalConfig {
    fn default() -> Self {
        Self::empty()
    }
}

impl HierarchicalConfig {
    /// Wrap an already parsed configuration tree.
    pub fn new(root: Value) -> Self {
        match root {
            Value::Null => Self::empty(),
            root => Self { root },
        }
    }

    /// An empty configuration, equivalent to an empty YAML document.
    pub fn empty() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Parse a configuration tree from a YAML document.
    ///
    /// # Example
    ///
    /// ```
    /// use search_deployer_shared::HierarchicalConfig;
    ///
    /// let config = HierarchicalConfig::from_yaml_str("target:\n  siteName: mysite\n")
    ///     .expect("valid yaml");
    /// assert_eq!(config.get_string("target.siteName").as_deref(), Some("mysite"));
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::empty());
        }
        let root: Value =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::parse(e.to_string()))?;
        Ok(Self::new(root))
    }

    /// Read and parse a YAML configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ConfigError::parse(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// The raw value at `key`, `None` when absent or explicitly null.
    ///
    /// An empty key addresses the root of the tree.
    pub fn get(&self, key: &str) -> Option<&Value> {
        if key.is_empty() {
            return Some(&self.root);
        }
        key.split('.')
            .try_fold(&self.root, |node, segment| node.as_object()?.get(segment))
            .filter(|value| !value.is_null())
    }

    /// Whether a non-null value exists at `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// String value at `key`. Numbers and booleans are rendered as strings.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// String value at `key`, failing when it is absent or empty.
    pub fn get_required_string(&self, key: &str) -> Result<String, ConfigError> {
        self.get_string(key)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::missing(key))
    }

    /// Boolean value at `key`. Accepts YAML booleans and `"true"`/`"false"` strings.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(ConfigError::invalid(key, format!("'{}' is not a boolean", s))),
            },
            Some(other) => Err(ConfigError::invalid(
                key,
                format!("{} is not a boolean", other),
            )),
        }
    }

    /// Integer value at `key`. Accepts YAML integers and numeric strings.
    pub fn get_i64(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| ConfigError::invalid(key, format!("{} is not an integer", n))),
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|e| ConfigError::invalid(key, format!("'{}': {}", s, e))),
            Some(other) => Err(ConfigError::invalid(
                key,
                format!("{} is not an integer", other),
            )),
        }
    }

    /// List of strings at `key`.
    ///
    /// A sequence yields its scalar items, a single string is split on commas.
    /// Blank items are dropped; an absent key yields an empty list.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        let items: Vec<String> = match self.get(key) {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|value| match value {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
            _ => Vec::new(),
        };

        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }

    /// The sub-tree at `key`, `None` unless it is a mapping.
    pub fn configuration_at(&self, key: &str) -> Option<HierarchicalConfig> {
        match self.get(key)? {
            value @ Value::Object(_) => Some(Self::new(value.clone())),
            _ => None,
        }
    }

    /// The sequence of sub-trees at `key`.
    ///
    /// A single mapping counts as a one-element sequence. Non-mapping items of
    /// a sequence are skipped.
    pub fn configurations_at(&self, key: &str) -> Vec<HierarchicalConfig> {
        match self.get(key) {
            Some(Value::Array(values)) => values
                .iter()
                .filter(|value| value.is_object())
                .map(|value| Self::new(value.clone()))
                .collect(),
            Some(value @ Value::Object(_)) => vec![Self::new(value.clone())],
            _ => Vec::new(),
        }
    }

    /// Whether `key` holds a non-empty mapping.
    pub fn has_children(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Object(map)) if !map.is_empty())
    }

    /// Scalar entries of the mapping at `key`, rendered as strings.
    pub fn entries(&self, key: &str) -> BTreeMap<String, String> {
        let Some(Value::Object(map)) = self.get(key) else {
            return BTreeMap::new();
        };

        map.iter()
            .filter_map(|(name, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((name.clone(), value))
            })
            .collect()
    }
}

impl From<Value> for HierarchicalConfig {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> HierarchicalConfig {
        HierarchicalConfig::from_yaml_str(
            r#"
indexId:
target:
  search:
    indexIdFormat: crafter-%s
    openSearch:
      urls:
        - http://a:9200
        - http://b:9200
      timeout:
        connect: 500
      keepAlive: "true"
      writeClusters:
        - urls: http://w1:9200
        - urls: http://w2:9200, http://w3:9200
      locale:
        mapping:
          en: english
          fr: french
  deployment:
    pipeline:
      processorName: gitPullProcessor
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_dotted_lookup() {
        let config = sample();
        assert_eq!(
            config.get_string("target.search.indexIdFormat").as_deref(),
            Some("crafter-%s")
        );
        assert!(config.get("target.search.missing").is_none());
        assert!(config.get("target.search.indexIdFormat.deeper").is_none());
    }

    #[test]
    fn test_null_is_absent() {
        let config = sample();
        assert!(!config.contains_key("indexId"));
        assert!(config.get_string("indexId").is_none());
    }

    #[test]
    fn test_required_string() {
        let config = sample();
        assert_eq!(
            config.get_required_string("target.search.indexIdFormat").unwrap(),
            "crafter-%s"
        );
        assert_eq!(
            config.get_required_string("target.search.nope"),
            Err(ConfigError::MissingProperty("target.search.nope".to_string()))
        );
    }

    #[test]
    fn test_typed_values() {
        let config = sample();
        assert_eq!(
            config.get_i64("target.search.openSearch.timeout.connect").unwrap(),
            Some(500)
        );
        assert_eq!(
            config.get_bool("target.search.openSearch.keepAlive").unwrap(),
            Some(true)
        );
        assert!(config
            .get_bool("target.search.indexIdFormat")
            .unwrap_err()
            .to_string()
            .contains("not a boolean"));
    }

    #[test]
    fn test_string_list_from_sequence_and_scalar() {
        let config = sample();
        assert_eq!(
            config.get_string_list("target.search.openSearch.urls"),
            vec!["http://a:9200", "http://b:9200"]
        );

        let writes = config.configurations_at("target.search.openSearch.writeClusters");
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[1].get_string_list("urls"), vec!["http://w2:9200", "http://w3:9200"]);
        assert!(config.get_string_list("target.search.none").is_empty());
    }

    #[test]
    fn test_single_mapping_is_one_element_list() {
        let config = sample();
        let pipeline = config.configurations_at("target.deployment.pipeline");
        assert_eq!(pipeline.len(), 1);
        assert_eq!(
            pipeline[0].get_string("processorName").as_deref(),
            Some("gitPullProcessor")
        );
    }

    #[test]
    fn test_entries_and_children() {
        let config = sample();
        let mapping = config.entries("target.search.openSearch.locale.mapping");
        assert_eq!(mapping.get("en").map(String::as_str), Some("english"));
        assert_eq!(mapping.len(), 2);
        assert!(config.has_children("target.search.openSearch"));
        assert!(!config.has_children("target.search.openSearch.readCluster"));
    }

    #[test]
    fn test_empty_document() {
        let config = HierarchicalConfig::from_yaml_str("").unwrap();
        assert_eq!(config, HierarchicalConfig::empty());

        let config = HierarchicalConfig::from(json!(null));
        assert!(config.configuration_at("target").is_none());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = HierarchicalConfig::from_yaml_str("target: [unclosed");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
