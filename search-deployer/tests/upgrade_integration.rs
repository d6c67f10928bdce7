//! Integration tests for the index upgrade operation.
//!
//! These tests use the real IndexUpgradeOperation with a mock admin service
//! recording every call, so no search backend is needed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use search_deployer::upgrade::{IndexUpgradeOperation, SkipReason, UpgradeOperation, UpgradeOutcome};
use search_deployer::UpgradeError;
use search_deployer_repository::{BackendError, SearchAdminService, SearchError};
use search_deployer_shared::{ConfigError, HierarchicalConfig, TargetEnvironment, TargetUpgradeContext};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AdminCall {
    Create(String, bool),
    Delete(String),
    Exists(String),
    Recreate(String, bool),
    WaitUntilReady,
}

// Mock admin service for testing
#[derive(Default)]
struct MockAdminService {
    calls: Mutex<Vec<AdminCall>>,
    never_ready: bool,
    recreate_error: Option<BackendError>,
}

impl MockAdminService {
    fn new() -> Self {
        Self::default()
    }

    fn never_ready() -> Self {
        Self {
            never_ready: true,
            ..Self::default()
        }
    }

    fn failing_recreate(error: BackendError) -> Self {
        Self {
            recreate_error: Some(error),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<AdminCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchAdminService for MockAdminService {
    async fn create_index(&self, index_id: &str, authoring: bool) -> Result<(), SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push(AdminCall::Create(index_id.to_string(), authoring));
        Ok(())
    }

    async fn delete_index(&self, index_id: &str) -> Result<(), SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push(AdminCall::Delete(index_id.to_string()));
        Ok(())
    }

    async fn index_exists(&self, index_id: &str) -> Result<bool, SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push(AdminCall::Exists(index_id.to_string()));
        Ok(false)
    }

    async fn recreate_index(&self, alias_name: &str, authoring: bool) -> Result<(), SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push(AdminCall::Recreate(alias_name.to_string(), authoring));
        match &self.recreate_error {
            Some(e) => Err(SearchError::admin(alias_name, e.clone())),
            None => Ok(()),
        }
    }

    async fn wait_until_ready(&self) -> Result<(), SearchError> {
        self.calls.lock().unwrap().push(AdminCall::WaitUntilReady);
        if self.never_ready {
            return Err(SearchError::readiness_timeout(Duration::from_secs(300)));
        }
        Ok(())
    }
}

fn target_config(processors: &[&str]) -> HierarchicalConfig {
    let pipeline: String = processors
        .iter()
        .map(|name| format!("      - processorName: {}\n", name))
        .collect();
    HierarchicalConfig::from_yaml_str(&format!(
        "target:\n  search:\n    indexIdFormat: crafter-%s\n  deployment:\n    pipeline:\n{}",
        pipeline
    ))
    .unwrap()
}

fn target(environment: TargetEnvironment, config: HierarchicalConfig) -> TargetUpgradeContext {
    TargetUpgradeContext::new(format!("mysite-{}", environment), environment, "mysite", config)
}

#[tokio::test]
async fn test_authoring_processor_is_applicable() {
    let admin = Arc::new(MockAdminService::new());
    let operation = IndexUpgradeOperation::new(admin.clone());
    let target = target(
        TargetEnvironment::Authoring,
        target_config(&["gitPullProcessor", "authoringElasticsearchIndexingProcessor"]),
    );

    let outcome = operation.execute(&target).await.unwrap();

    assert_eq!(
        outcome,
        UpgradeOutcome::Recreated {
            alias: "crafter-mysite".to_string()
        }
    );
    assert_eq!(
        admin.calls(),
        vec![
            AdminCall::WaitUntilReady,
            AdminCall::Recreate("crafter-mysite".to_string(), true)
        ]
    );
}

#[tokio::test]
async fn test_delivery_target_recreates_delivery_index() {
    let admin = Arc::new(MockAdminService::new());
    let operation = IndexUpgradeOperation::new(admin.clone());
    let target = target(
        TargetEnvironment::Delivery,
        target_config(&["elasticsearchIndexingProcessor"]),
    );

    operation.execute(&target).await.unwrap();

    assert_eq!(
        admin.calls(),
        vec![
            AdminCall::WaitUntilReady,
            AdminCall::Recreate("crafter-mysite".to_string(), false)
        ]
    );
}

#[tokio::test]
async fn test_no_matching_processor_is_not_applicable() {
    let admin = Arc::new(MockAdminService::new());
    let operation = IndexUpgradeOperation::new(admin.clone());
    let target = target(
        TargetEnvironment::Delivery,
        target_config(&["gitPullProcessor", "searchIndexingProcessor"]),
    );

    let outcome = operation.execute(&target).await.unwrap();

    assert_eq!(
        outcome,
        UpgradeOutcome::NotApplicable {
            reason: SkipReason::NoIndexingProcessor
        }
    );
    assert!(admin.calls().is_empty());
}

#[tokio::test]
async fn test_other_search_backend_is_not_applicable() {
    let admin = Arc::new(MockAdminService::new());
    let operation = IndexUpgradeOperation::new(admin.clone());
    let target = target(
        TargetEnvironment::Authoring,
        target_config(&["authoringElasticsearchIndexingProcessor"]),
    )
    .with_other_search_backend(true);

    let outcome = operation.execute(&target).await.unwrap();

    assert_eq!(
        outcome,
        UpgradeOutcome::NotApplicable {
            reason: SkipReason::OtherSearchBackend
        }
    );
    assert!(admin.calls().is_empty());
}

#[tokio::test]
async fn test_missing_index_id_format_fails_before_backend_calls() {
    let admin = Arc::new(MockAdminService::new());
    let operation = IndexUpgradeOperation::new(admin.clone());
    let config = HierarchicalConfig::from_yaml_str(
        "target:\n  deployment:\n    pipeline:\n      - processorName: elasticsearchIndexingProcessor\n",
    )
    .unwrap();
    let target = target(TargetEnvironment::Delivery, config);

    let err = operation.execute(&target).await.unwrap_err();

    assert_eq!(
        err,
        UpgradeError::config(
            "mysite-delivery",
            ConfigError::missing("target.search.indexIdFormat")
        )
    );
    assert!(admin.calls().is_empty());
}

#[tokio::test]
async fn test_readiness_timeout_aborts_upgrade() {
    let admin = Arc::new(MockAdminService::never_ready());
    let operation = IndexUpgradeOperation::new(admin.clone());
    let target = target(
        TargetEnvironment::Authoring,
        target_config(&["authoringElasticsearchIndexingProcessor"]),
    );

    let err = operation.execute(&target).await.unwrap_err();

    assert!(matches!(
        err,
        UpgradeError::SearchError {
            source: SearchError::ReadinessTimeout { .. },
            ..
        }
    ));
    assert_eq!(err.target_id(), "mysite-authoring");
    assert_eq!(admin.calls(), vec![AdminCall::WaitUntilReady]);
}

#[tokio::test]
async fn test_recreate_failure_is_surfaced() {
    let admin = Arc::new(MockAdminService::failing_recreate(BackendError::status(
        403,
        "security_exception",
    )));
    let operation = IndexUpgradeOperation::new(admin.clone());
    let target = target(
        TargetEnvironment::Delivery,
        target_config(&["elasticsearchIndexingProcessor"]),
    );

    let err = operation.execute(&target).await.unwrap_err();

    assert_eq!(
        err,
        UpgradeError::search(
            "mysite-delivery",
            SearchError::admin("crafter-mysite", BackendError::status(403, "security_exception"))
        )
    );
}
