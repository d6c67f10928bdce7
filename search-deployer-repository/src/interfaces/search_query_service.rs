//! Search query capability.

use async_trait::async_trait;

use crate::errors::BackendError;
use crate::types::TermFilter;

/// Data-plane operations used while indexing content.
///
/// Errors are reported as raw [`BackendError`]s; callers add the context of
/// the operation they were performing (commit or dependency lookup).
#[async_trait]
pub trait SearchQueryService: Send + Sync {
    /// Refresh `index_id` so that documents written so far become visible.
    async fn refresh(&self, index_id: &str) -> Result<(), BackendError>;

    /// Values of `field_name` for every document of `index_id` matching `filter`.
    ///
    /// Returns an empty vector when nothing matches.
    async fn search_field(
        &self,
        index_id: &str,
        field_name: &str,
        filter: &TermFilter,
    ) -> Result<Vec<String>, BackendError>;
}
