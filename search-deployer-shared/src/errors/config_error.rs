//! Configuration error types.
//!
//! Configuration errors are fatal: they surface when a target configuration is
//! loaded and are never retried.

use thiserror::Error;

/// Errors raised while reading or validating target configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required property is absent or empty.
    #[error("Missing required property: {0}")]
    MissingProperty(String),

    /// A property is present but its value cannot be used.
    #[error("Invalid property '{key}': {reason}")]
    InvalidProperty { key: String, reason: String },

    /// The configured clusters cannot form a usable topology.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// The configuration source could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    /// Create a missing property error.
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingProperty(key.into())
    }

    /// Create an invalid property error.
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProperty {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid topology error.
    pub fn topology(msg: impl Into<String>) -> Self {
        Self::InvalidTopology(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Qualify the property key with the path of the section it was read from.
    ///
    /// Errors raised against a sub-tree only know the relative key; this turns
    /// `urls` into `target.search.openSearch.readCluster.urls`.
    pub fn prefixed(self, prefix: &str) -> Self {
        if prefix.is_empty() {
            return self;
        }
        match self {
            Self::MissingProperty(key) => Self::MissingProperty(format!("{}.{}", prefix, key)),
            Self::InvalidProperty { key, reason } => Self::InvalidProperty {
                key: format!("{}.{}", prefix, key),
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_keys() {
        let err = ConfigError::invalid("urls", "bad url").prefixed("target.search.openSearch");
        assert_eq!(
            err,
            ConfigError::invalid("target.search.openSearch.urls", "bad url")
        );

        let err = ConfigError::topology("no clusters").prefixed("target");
        assert_eq!(err, ConfigError::topology("no clusters"));
    }
}
