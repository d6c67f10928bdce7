//! Interface definitions for the search backend capabilities.
//!
//! The deployer only ever needs two narrow capabilities from a search backend:
//! administering indices and querying them. Keeping them as traits allows
//! swapping the backend and testing every component against an in-memory fake.

mod search_admin_service;
mod search_query_service;

pub use search_admin_service::SearchAdminService;
pub use search_query_service::SearchQueryService;
