//! OpenSearch index naming, settings and mappings.
//!
//! Every logical index id is an alias pointing to a versioned physical index
//! (`<alias>_v1`), so that an index can be rebuilt behind a stable name.
//! Locales configured in the locale mapping get their own aliased index
//! (`<alias>-<locale>`) whose default analyzer is the locale's analyzer.

use serde_json::{json, Map, Value};

use crate::opensearch::config::IndexSettings;

/// Version of the physical index created behind a new alias.
pub const INITIAL_INDEX_VERSION: u32 = 1;

/// Get the versioned physical index name behind `alias`.
///
/// # Arguments
///
/// * `alias` - The logical index name
/// * `version` - The version number (defaults to [`INITIAL_INDEX_VERSION`] if None)
///
/// # Returns
///
/// The versioned index name (e.g., "crafter-mysite_v1")
pub fn get_versioned_index_name(alias: &str, version: Option<u32>) -> String {
    let v = version.unwrap_or(INITIAL_INDEX_VERSION);
    format!("{}_v{}", alias, v)
}

/// Get the alias of the index dedicated to `locale`.
pub fn get_locale_alias(alias: &str, locale: &str) -> String {
    format!("{}-{}", alias, locale.replace('_', "-").to_lowercase())
}

/// Get the body of an index creation request.
///
/// The body includes:
/// - **settings**: the configured index settings, plus the locale's analyzer
///   as default analyzer when `analyzer` is set
/// - **mappings**: keyword fields used for lookups (`localId`,
///   `includedDescriptors`, ...), dynamic templates for typed content fields,
///   and the authoring-only fields when `authoring` is set
/// - **aliases**: the logical name pointing to the new index
///
/// # Arguments
///
/// * `alias` - The alias the new index is reachable through
/// * `authoring` - Whether to use the authoring mappings
/// * `analyzer` - Default analyzer for locale specific indices
/// * `index_settings` - Settings from the target configuration
pub fn get_index_body(
    alias: &str,
    authoring: bool,
    analyzer: Option<&str>,
    index_settings: &IndexSettings,
) -> Value {
    let mut settings = Map::new();
    for (key, value) in index_settings {
        settings.insert(key.clone(), Value::String(value.clone()));
    }
    if let Some(analyzer) = analyzer {
        settings.insert(
            "analysis".to_string(),
            json!({ "analyzer": { "default": { "type": analyzer } } }),
        );
    }

    let mut properties = json!({
        "localId": { "type": "keyword" },
        "rootId": { "type": "keyword" },
        "crafterSite": { "type": "keyword" },
        "crafterPublishedDate": { "type": "date" },
        "content-type": { "type": "keyword" },
        "includedDescriptors": { "type": "keyword" },
        "internalName": { "type": "text", "fields": { "raw": { "type": "keyword" } } },
        "contentLength": { "type": "long" }
    });
    if authoring {
        if let Some(map) = properties.as_object_mut() {
            map.insert("lastEditedOn".to_string(), json!({ "type": "date" }));
            map.insert("lastEditedBy".to_string(), json!({ "type": "keyword" }));
            map.insert("workflowState".to_string(), json!({ "type": "keyword" }));
        }
    }

    let mut aliases = Map::new();
    aliases.insert(alias.to_string(), json!({}));

    json!({
        "settings": settings,
        "mappings": {
            "dynamic_templates": [
                { "strings_as_keywords": { "match": "*_s", "mapping": { "type": "keyword" } } },
                { "texts": { "match": "*_t", "mapping": { "type": "text" } } },
                { "html": { "match": "*_html", "mapping": { "type": "text" } } },
                { "integers": { "match": "*_i", "mapping": { "type": "integer" } } },
                { "longs": { "match": "*_l", "mapping": { "type": "long" } } },
                { "floats": { "match": "*_f", "mapping": { "type": "float" } } },
                { "booleans": { "match": "*_b", "mapping": { "type": "boolean" } } },
                { "dates": { "match": "*_dt", "mapping": { "type": "date" } } }
            ],
            "properties": properties
        },
        "aliases": aliases
    })
}
