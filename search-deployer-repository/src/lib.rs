//! # Search Deployer Repository
//!
//! This crate provides the narrow capabilities the deployer needs from a
//! search backend (index administration and index queries), the errors they
//! report, and a concrete implementation for OpenSearch including cluster
//! topology resolution.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;
pub mod utils;

pub use config::ReadinessConfig;
pub use errors::{BackendError, SearchError};
pub use interfaces::{SearchAdminService, SearchQueryService};
pub use crate::opensearch::{
    ClusterConfig, IndexSettings, LocaleMapping, OpenSearchAdminService, OpenSearchClients,
    OpenSearchConfig, OpenSearchSearchService, Topology,
};
pub use types::TermFilter;
