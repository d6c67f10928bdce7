//! Lifecycle hooks run by the deployment pipeline when a target is created or
//! deleted.

mod index_lifecycle_hook;

pub use index_lifecycle_hook::{IndexHookConfig, IndexLifecycleHook};

use async_trait::async_trait;
use search_deployer_repository::SearchError;

/// Target lifecycle transitions a hook can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    TargetCreated,
    TargetDeleted,
}

/// A hook executed by the external pipeline on a target lifecycle transition.
///
/// An error aborts the transition that triggered the hook.
#[async_trait]
pub trait LifecycleHook: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Run the hook for `event`.
    async fn execute(&self, event: LifecycleEvent) -> Result<(), SearchError>;
}
