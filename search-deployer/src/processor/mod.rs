//! Processor module for the search deployer.
//!
//! Commits index writes and finds the documents to re-index when a shared
//! component changes.

mod indexing_processor;

pub use indexing_processor::{
    IndexingProcessor, SearchIndexingProcessor, INCLUDED_DESCRIPTORS_FIELD, LOCAL_ID_FIELD,
};
