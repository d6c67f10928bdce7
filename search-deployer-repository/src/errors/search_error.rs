//! Search error types.
//!
//! Backend failures are never reported bare: every operation wraps the
//! [`BackendError`] with the index id it was acting on (and, for dependency
//! queries, the component path) so callers can log and act on it.

use std::time::Duration;

use thiserror::Error;

/// Low-level failure talking to the search backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The request never got a response (DNS, TCP, TLS, timeout).
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The backend answered with a non-success status.
    #[error("Backend returned status {status}: {body}")]
    StatusError { status: u16, body: String },

    /// The backend answered with a body that could not be understood.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl BackendError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a status error.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::StatusError {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Whether the backend reported that the target does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::StatusError { status: 404, .. })
    }
}

impl From<opensearch::Error> for BackendError {
    fn from(err: opensearch::Error) -> Self {
        match err.status_code() {
            Some(status) => Self::status(status.as_u16(), err.to_string()),
            None => Self::connection(err.to_string()),
        }
    }
}

/// Errors from search administration, commit and query operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Creating, deleting or recreating an index failed.
    #[error("Search administration error for index '{index_id}': {source}")]
    AdminError {
        index_id: String,
        #[source]
        source: BackendError,
    },

    /// Refreshing an index after writes failed.
    #[error("Search commit error for index '{index_id}': {source}")]
    CommitError {
        index_id: String,
        #[source]
        source: BackendError,
    },

    /// Searching an index for documents including a component failed.
    #[error("Search query error for index '{index_id}' and component '{component_path}': {source}")]
    QueryError {
        index_id: String,
        component_path: String,
        #[source]
        source: BackendError,
    },

    /// The backend did not report ready within the allowed time.
    #[error("Search backend not ready after {waited:?}")]
    ReadinessTimeout { waited: Duration },

    /// A client for a configured cluster could not be built.
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl SearchError {
    /// Create an administration error.
    pub fn admin(index_id: impl Into<String>, source: BackendError) -> Self {
        Self::AdminError {
            index_id: index_id.into(),
            source,
        }
    }

    /// Create a commit error.
    pub fn commit(index_id: impl Into<String>, source: BackendError) -> Self {
        Self::CommitError {
            index_id: index_id.into(),
            source,
        }
    }

    /// Create a query error.
    pub fn query(
        index_id: impl Into<String>,
        component_path: impl Into<String>,
        source: BackendError,
    ) -> Self {
        Self::QueryError {
            index_id: index_id.into(),
            component_path: component_path.into(),
            source,
        }
    }

    /// Create a readiness timeout error.
    pub fn readiness_timeout(waited: Duration) -> Self {
        Self::ReadinessTimeout { waited }
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// The index id the failed operation was acting on, if any.
    pub fn index_id(&self) -> Option<&str> {
        match self {
            Self::AdminError { index_id, .. }
            | Self::CommitError { index_id, .. }
            | Self::QueryError { index_id, .. } => Some(index_id),
            Self::ReadinessTimeout { .. } | Self::ConnectionError(_) => None,
        }
    }
}
