//! Error types for the search deployer repository.
//!
//! This module provides the error taxonomy for every backend operation.

mod search_error;

pub use search_error::{BackendError, SearchError};
