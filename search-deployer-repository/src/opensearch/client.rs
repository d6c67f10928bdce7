//! OpenSearch client construction.

use opensearch::auth::Credentials;
use opensearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use opensearch::OpenSearch;
use tracing::{debug, info};

use crate::errors::SearchError;
use crate::opensearch::cluster_config::ClusterConfig;
use crate::opensearch::config::OpenSearchConfig;

/// Clients for every cluster of a target's topology.
///
/// Built once per target configuration and shared (behind an `Arc`) by the
/// admin and search services. Services only borrow the clients per request;
/// they never close or reconfigure them.
pub struct OpenSearchClients {
    read: OpenSearch,
    writes: Vec<OpenSearch>,
}

impl OpenSearchClients {
    /// Build clients for the topology described by `config`.
    ///
    /// Under a single-cluster topology the read client and the only write
    /// client point at the global cluster.
    pub fn from_config(config: &OpenSearchConfig) -> Result<Self, SearchError> {
        let read = Self::build_client(config.read_cluster_config())?;
        let writes = config
            .write_cluster_configs()
            .iter()
            .map(Self::build_client)
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            single_cluster = config.use_single_cluster(),
            write_clusters = writes.len(),
            "Created OpenSearch clients"
        );

        Ok(Self { read, writes })
    }

    /// Build a client for one cluster.
    ///
    /// Only credentials and the request timeout are applied; see
    /// [`ClusterConfig`] for the fields the transport does not take.
    // TODO: spread requests over every configured url once the transport's
    // multi-node connection pool is adopted; only the first node is used.
    pub fn build_client(cluster: &ClusterConfig) -> Result<OpenSearch, SearchError> {
        let url = cluster
            .urls
            .first()
            .cloned()
            .ok_or_else(|| SearchError::connection("cluster has no urls"))?;

        if cluster.thread_count.is_some() || cluster.keep_alive {
            debug!(
                url = %url,
                thread_count = ?cluster.thread_count,
                keep_alive = cluster.keep_alive,
                "Thread count and keep-alive are managed by the transport, not applied"
            );
        }

        let conn_pool = SingleNodeConnectionPool::new(url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some((username, password)) = cluster.credentials() {
            builder = builder.auth(Credentials::Basic(username.to_string(), password.to_string()));
        }
        if let Some(timeout) = cluster.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let transport = builder
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Ok(OpenSearch::new(transport))
    }

    /// The client reads are sent to.
    pub fn read(&self) -> &OpenSearch {
        &self.read
    }

    /// The clients writes are sent to.
    pub fn writes(&self) -> &[OpenSearch] {
        &self.writes
    }

    /// The read client followed by every write client.
    pub fn all(&self) -> impl Iterator<Item = &OpenSearch> {
        std::iter::once(&self.read).chain(self.writes.iter())
    }
}
