//! Request types for search backend operations.

use serde_json::{json, Map, Value};

/// Exact-match filter on a single keyword field.
///
/// Rendered as a `bool` query with a single `term` filter, so it does not
/// contribute to scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermFilter {
    /// The field to match.
    pub field: String,
    /// The exact value the field must hold.
    pub value: String,
}

impl TermFilter {
    /// Create a new term filter.
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// The query DSL for this filter.
    pub fn to_query(&self) -> Value {
        let mut term = Map::new();
        term.insert(self.field.clone(), Value::String(self.value.clone()));

        json!({
            "bool": {
                "filter": [
                    { "term": term }
                ]
            }
        })
    }
}
