//! Search administration capability.

use async_trait::async_trait;

use crate::errors::SearchError;

/// Index administration operations of a search backend.
///
/// Index ids passed here are logical names (aliases); implementations decide
/// how they map onto physical indices. All failures are reported as
/// [`SearchError::AdminError`] carrying the id, except for the readiness wait
/// which reports [`SearchError::ReadinessTimeout`].
#[async_trait]
pub trait SearchAdminService: Send + Sync {
    /// Create the index `index_id` using the authoring or delivery mappings.
    ///
    /// Creating an index that already exists is not an error.
    async fn create_index(&self, index_id: &str, authoring: bool) -> Result<(), SearchError>;

    /// Delete the index `index_id`.
    ///
    /// Deleting an index that does not exist is not an error.
    async fn delete_index(&self, index_id: &str) -> Result<(), SearchError>;

    /// Whether an index or alias named `index_id` exists.
    ///
    /// A missing index is reported as `Ok(false)`, never as an error.
    async fn index_exists(&self, index_id: &str) -> Result<bool, SearchError>;

    /// Destroy every index behind `alias_name` and create it again.
    ///
    /// This is destructive: all documents in the previous index are lost.
    async fn recreate_index(&self, alias_name: &str, authoring: bool) -> Result<(), SearchError>;

    /// Block until the backend reports it is ready to serve requests.
    ///
    /// Implementations must bound the wait and return
    /// [`SearchError::ReadinessTimeout`] when it expires.
    async fn wait_until_ready(&self) -> Result<(), SearchError>;
}
