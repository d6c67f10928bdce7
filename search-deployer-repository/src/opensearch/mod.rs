//! OpenSearch implementation of the search backend capabilities.
//!
//! This module resolves the cluster topology of a target, builds clients for
//! it and implements `SearchAdminService` and `SearchQueryService` on top of
//! the OpenSearch Rust crate.

mod admin_service;
mod client;
mod cluster_config;
pub mod config;
pub mod index_config;
mod search_service;

pub use admin_service::OpenSearchAdminService;
pub use client::OpenSearchClients;
pub use cluster_config::ClusterConfig;
pub use config::{IndexSettings, LocaleMapping, OpenSearchConfig, Topology};
pub use search_service::OpenSearchSearchService;
