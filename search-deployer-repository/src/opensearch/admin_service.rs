//! OpenSearch index administration.
//!
//! Index administration is applied to every write cluster of the target's
//! topology, so that all of them hold the same indices. Logical index ids are
//! aliases; the physical indices behind them are versioned (see
//! [`index_config`](crate::opensearch::index_config)).

use std::sync::Arc;

use async_trait::async_trait;
use opensearch::cluster::ClusterHealthParts;
use opensearch::indices::{
    IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesGetAliasParts,
};
use opensearch::OpenSearch;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::config::ReadinessConfig;
use crate::errors::{BackendError, SearchError};
use crate::interfaces::SearchAdminService;
use crate::opensearch::client::OpenSearchClients;
use crate::opensearch::config::{IndexSettings, LocaleMapping, OpenSearchConfig};
use crate::opensearch::index_config::{get_index_body, get_locale_alias, get_versioned_index_name};
use crate::utils::{check_response, is_already_exists};

/// The part of a cluster health response readiness depends on.
#[derive(Debug, Deserialize)]
struct ClusterHealth {
    status: String,
}

/// OpenSearch implementation of [`SearchAdminService`].
///
/// # Example
///
/// ```ignore
/// let config = OpenSearchConfig::from_config(&target_config)?;
/// let clients = Arc::new(OpenSearchClients::from_config(&config)?);
/// let admin = OpenSearchAdminService::new(clients, &config);
///
/// admin.wait_until_ready().await?;
/// admin.create_index("crafter-mysite", true).await?;
/// ```
pub struct OpenSearchAdminService {
    clients: Arc<OpenSearchClients>,
    locale_mapping: LocaleMapping,
    index_settings: IndexSettings,
    readiness: ReadinessConfig,
}

impl OpenSearchAdminService {
    /// Create an admin service using the locale mapping and index settings of
    /// `config` and the default readiness bounds.
    pub fn new(clients: Arc<OpenSearchClients>, config: &OpenSearchConfig) -> Self {
        Self {
            clients,
            locale_mapping: config.locale_mapping.clone(),
            index_settings: config.index_settings.clone(),
            readiness: ReadinessConfig::default(),
        }
    }

    /// Replace the readiness bounds.
    pub fn with_readiness(mut self, readiness: ReadinessConfig) -> Self {
        self.readiness = readiness;
        self
    }

    /// The base alias followed by the alias of every mapped locale, with the
    /// analyzer each one should use.
    fn aliases_for(&self, index_id: &str) -> Vec<(String, Option<String>)> {
        std::iter::once((index_id.to_string(), None))
            .chain(self.locale_mapping.iter().map(|(locale, analyzer)| {
                (get_locale_alias(index_id, locale), Some(analyzer.to_string()))
            }))
            .collect()
    }

    async fn exists(client: &OpenSearch, name: &str) -> Result<bool, BackendError> {
        let response = client
            .indices()
            .exists(IndicesExistsParts::Index(&[name]))
            .send()
            .await?;

        match response.status_code().as_u16() {
            404 => Ok(false),
            _ => check_response(response).await.map(|_| true),
        }
    }

    /// The physical indices behind `name`: the alias targets when `name` is
    /// an alias, `name` itself when it is a concrete index, nothing otherwise.
    async fn physical_indices(client: &OpenSearch, name: &str) -> Result<Vec<String>, BackendError> {
        let response = client
            .indices()
            .get_alias(IndicesGetAliasParts::Name(&[name]))
            .send()
            .await?;

        if response.status_code().as_u16() == 404 {
            return if Self::exists(client, name).await? {
                Ok(vec![name.to_string()])
            } else {
                Ok(Vec::new())
            };
        }

        let body = check_response(response)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| BackendError::parse(e.to_string()))?;

        Ok(body
            .as_object()
            .map(|indices| indices.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn create_one(
        &self,
        client: &OpenSearch,
        alias: &str,
        authoring: bool,
        analyzer: Option<&str>,
    ) -> Result<(), BackendError> {
        if Self::exists(client, alias).await? {
            debug!(alias = %alias, "Index already exists, skipping creation");
            return Ok(());
        }

        let index_name = get_versioned_index_name(alias, None);
        let body = get_index_body(alias, authoring, analyzer, &self.index_settings);
        let response = client
            .indices()
            .create(IndicesCreateParts::Index(&index_name))
            .body(body)
            .send()
            .await?;

        match check_response(response).await {
            Ok(_) => {
                info!(alias = %alias, index = %index_name, authoring, "Created index");
                Ok(())
            }
            // Lost a race with another creator of the same index.
            Err(e) if is_already_exists(&e) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn delete_one(client: &OpenSearch, name: &str) -> Result<(), BackendError> {
        for index in Self::physical_indices(client, name).await? {
            let response = client
                .indices()
                .delete(IndicesDeleteParts::Index(&[index.as_str()]))
                .send()
                .await?;

            match check_response(response).await {
                Ok(_) => info!(alias = %name, index = %index, "Deleted index"),
                Err(e) if e.is_not_found() => debug!(index = %index, "Index already deleted"),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn is_ready(client: &OpenSearch) -> Result<bool, BackendError> {
        let response = client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await?;
        let health = check_response(response)
            .await?
            .json::<ClusterHealth>()
            .await
            .map_err(|e| BackendError::parse(e.to_string()))?;

        Ok(matches!(health.status.as_str(), "green" | "yellow"))
    }
}

#[async_trait]
impl SearchAdminService for OpenSearchAdminService {
    #[instrument(skip(self))]
    async fn create_index(&self, index_id: &str, authoring: bool) -> Result<(), SearchError> {
        for client in self.clients.writes() {
            for (alias, analyzer) in self.aliases_for(index_id) {
                self.create_one(client, &alias, authoring, analyzer.as_deref())
                    .await
                    .map_err(|e| {
                        error!(index_id = %index_id, alias = %alias, error = %e, "Index creation failed");
                        SearchError::admin(index_id, e)
                    })?;
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index_id: &str) -> Result<(), SearchError> {
        for client in self.clients.writes() {
            for (alias, _) in self.aliases_for(index_id) {
                Self::delete_one(client, &alias).await.map_err(|e| {
                    error!(index_id = %index_id, alias = %alias, error = %e, "Index deletion failed");
                    SearchError::admin(index_id, e)
                })?;
            }
        }
        Ok(())
    }

    async fn index_exists(&self, index_id: &str) -> Result<bool, SearchError> {
        Self::exists(self.clients.read(), index_id)
            .await
            .map_err(|e| SearchError::admin(index_id, e))
    }

    #[instrument(skip(self))]
    async fn recreate_index(&self, alias_name: &str, authoring: bool) -> Result<(), SearchError> {
        warn!(alias = %alias_name, "Recreating index, existing documents will be lost");
        self.delete_index(alias_name).await?;
        self.create_index(alias_name, authoring).await?;
        info!(alias = %alias_name, "Index recreated");
        Ok(())
    }

    async fn wait_until_ready(&self) -> Result<(), SearchError> {
        let started = Instant::now();
        let mut backoff = self.readiness.initial_backoff;

        loop {
            let mut ready = true;
            for client in self.clients.all() {
                // A backend that accepts connections but never answers must not
                // outlast the readiness bound.
                let remaining = self.readiness.timeout.saturating_sub(started.elapsed());
                match timeout(remaining, Self::is_ready(client)).await {
                    Ok(Ok(true)) => {}
                    Ok(Ok(false)) => {
                        ready = false;
                        break;
                    }
                    Ok(Err(e)) => {
                        warn!(error = %e, "Search backend health check failed");
                        ready = false;
                        break;
                    }
                    Err(_) => {
                        warn!("Search backend health check timed out");
                        ready = false;
                        break;
                    }
                }
            }
            if ready {
                info!(waited_ms = started.elapsed().as_millis() as u64, "Search backend is ready");
                return Ok(());
            }

            let elapsed = started.elapsed();
            if elapsed >= self.readiness.timeout {
                error!(
                    timeout_secs = self.readiness.timeout.as_secs(),
                    "Search backend did not become ready"
                );
                return Err(SearchError::readiness_timeout(elapsed));
            }

            let delay = backoff.min(self.readiness.timeout - elapsed);
            debug!(retry_in_ms = delay.as_millis() as u64, "Search backend not ready, retrying...");
            sleep(delay).await;
            backoff = self.readiness.next_backoff(backoff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_deployer_shared::HierarchicalConfig;
    use serde_json::json;
    use std::time::Duration;

    /// An admin service pointed at a port nothing listens on.
    fn unreachable_service(locales: Value) -> OpenSearchAdminService {
        service_at(json!({
            "urls": ["http://127.0.0.1:1"],
            "timeout": { "socket": 2000 },
            "locale": { "mapping": locales }
        }))
    }

    fn service_at(open_search: Value) -> OpenSearchAdminService {
        let config = OpenSearchConfig::from_config(&HierarchicalConfig::from(json!({
            "target": { "search": { "openSearch": open_search } }
        })))
        .unwrap();
        let clients = Arc::new(OpenSearchClients::from_config(&config).unwrap());
        OpenSearchAdminService::new(clients, &config).with_readiness(ReadinessConfig {
            timeout: Duration::from_millis(200),
            initial_backoff: Duration::from_millis(20),
            max_backoff: Duration::from_millis(50),
        })
    }

    #[test]
    fn test_aliases_include_locales() {
        let service = unreachable_service(json!({ "en": "english", "fr": "french" }));
        let aliases = service.aliases_for("crafter-mysite");
        assert_eq!(
            aliases,
            vec![
                ("crafter-mysite".to_string(), None),
                ("crafter-mysite-en".to_string(), Some("english".to_string())),
                ("crafter-mysite-fr".to_string(), Some("french".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_wait_until_ready_times_out() {
        let service = unreachable_service(json!({}));
        let result = service.wait_until_ready().await;
        match result {
            Err(SearchError::ReadinessTimeout { waited }) => {
                assert!(waited >= Duration::from_millis(200));
            }
            other => panic!("expected readiness timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wait_until_ready_bounds_unanswered_health_check() {
        // Accepts connections and never replies; no socket timeout configured.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut connections = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                connections.push(socket);
            }
        });
        let service = service_at(json!({ "urls": [format!("http://{}", address)] }));

        let result = tokio::time::timeout(Duration::from_secs(10), service.wait_until_ready())
            .await
            .expect("readiness wait must end within its own bound");

        match result {
            Err(SearchError::ReadinessTimeout { waited }) => {
                assert!(waited >= Duration::from_millis(200));
                assert!(waited < Duration::from_secs(5));
            }
            other => panic!("expected readiness timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_admin_error() {
        let service = unreachable_service(json!({}));
        let err = service.delete_index("crafter-mysite").await.unwrap_err();
        assert_eq!(err.index_id(), Some("crafter-mysite"));
        assert!(matches!(err, SearchError::AdminError { .. }));
    }
}
