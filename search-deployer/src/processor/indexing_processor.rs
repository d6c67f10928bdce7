//! Indexing processor implementation.
//!
//! The deployment pipeline writes the documents of a batch itself; this
//! processor makes them visible (commit) and tells the pipeline which other
//! documents embed a changed component, so that they get re-indexed too.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use search_deployer_repository::{SearchError, SearchQueryService, TermFilter};
use tracing::{debug, instrument};

/// Field holding the logical id (path) of an indexed document.
pub const LOCAL_ID_FIELD: &str = "localId";

/// Field listing the paths of every component a document includes.
pub const INCLUDED_DESCRIPTORS_FIELD: &str = "includedDescriptors";

/// Contract between the deployment pipeline and a search indexing processor.
#[async_trait]
pub trait SearchIndexingProcessor: Send + Sync {
    /// Make the documents written to `index_id` so far visible to searches.
    async fn do_commit(&self, index_id: &str) -> Result<(), SearchError>;

    /// Logical ids of the documents of `index_id` that include `component_path`.
    ///
    /// Returns an empty vector when no document includes the component.
    async fn get_items_that_include_component(
        &self,
        index_id: &str,
        component_path: &str,
    ) -> Result<Vec<String>, SearchError>;

    /// Every document that directly or transitively includes one of
    /// `changed_paths`, excluding the changed paths themselves.
    ///
    /// Dependents are followed breadth-first so that a component included by
    /// another component cascades to the pages including the latter. Each
    /// path is looked up at most once, which also stops inclusion cycles.
    async fn find_dependents(
        &self,
        index_id: &str,
        changed_paths: &[String],
    ) -> Result<BTreeSet<String>, SearchError> {
        let mut visited: BTreeSet<String> = changed_paths.iter().cloned().collect();
        let mut pending: VecDeque<String> = visited.iter().cloned().collect();
        let mut dependents = BTreeSet::new();

        while let Some(path) = pending.pop_front() {
            for item in self.get_items_that_include_component(index_id, &path).await? {
                if visited.insert(item.clone()) {
                    dependents.insert(item.clone());
                    pending.push_back(item);
                }
            }
        }

        Ok(dependents)
    }
}

/// Indexing processor backed by a [`SearchQueryService`].
///
/// Stateless apart from the injected service, which may be shared between
/// targets.
pub struct IndexingProcessor {
    search: Arc<dyn SearchQueryService>,
}

impl IndexingProcessor {
    /// Create a new indexing processor.
    pub fn new(search: Arc<dyn SearchQueryService>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl SearchIndexingProcessor for IndexingProcessor {
    #[instrument(skip(self))]
    async fn do_commit(&self, index_id: &str) -> Result<(), SearchError> {
        self.search
            .refresh(index_id)
            .await
            .map_err(|e| SearchError::commit(index_id, e))?;
        debug!("Committed index changes");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_items_that_include_component(
        &self,
        index_id: &str,
        component_path: &str,
    ) -> Result<Vec<String>, SearchError> {
        let filter = TermFilter::new(INCLUDED_DESCRIPTORS_FIELD, component_path);
        let items = self
            .search
            .search_field(index_id, LOCAL_ID_FIELD, &filter)
            .await
            .map_err(|e| SearchError::query(index_id, component_path, e))?;

        debug!(dependents = items.len(), "Found items including component");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_deployer_repository::BackendError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock search service answering field searches from an inclusion table.
    #[derive(Default)]
    struct MockSearchService {
        /// component path -> local ids of the documents including it
        includes: HashMap<String, Vec<String>>,
        refreshed: Mutex<Vec<String>>,
        searches: Mutex<Vec<(String, String, TermFilter)>>,
        fail_with: Option<BackendError>,
    }

    impl MockSearchService {
        fn with_includes(includes: &[(&str, &[&str])]) -> Self {
            Self {
                includes: includes
                    .iter()
                    .map(|(component, items)| {
                        (
                            component.to_string(),
                            items.iter().map(|i| i.to_string()).collect(),
                        )
                    })
                    .collect(),
                ..Self::default()
            }
        }

        fn failing(error: BackendError) -> Self {
            Self {
                fail_with: Some(error),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl SearchQueryService for MockSearchService {
        async fn refresh(&self, index_id: &str) -> Result<(), BackendError> {
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            self.refreshed.lock().unwrap().push(index_id.to_string());
            Ok(())
        }

        async fn search_field(
            &self,
            index_id: &str,
            field_name: &str,
            filter: &TermFilter,
        ) -> Result<Vec<String>, BackendError> {
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            self.searches.lock().unwrap().push((
                index_id.to_string(),
                field_name.to_string(),
                filter.clone(),
            ));
            Ok(self.includes.get(&filter.value).cloned().unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_do_commit_refreshes_index() {
        let search = Arc::new(MockSearchService::default());
        let processor = IndexingProcessor::new(search.clone());

        processor.do_commit("crafter-mysite").await.unwrap();
        assert_eq!(*search.refreshed.lock().unwrap(), vec!["crafter-mysite"]);
    }

    #[tokio::test]
    async fn test_do_commit_failure_is_commit_error() {
        let search = Arc::new(MockSearchService::failing(BackendError::status(503, "unavailable")));
        let processor = IndexingProcessor::new(search);

        let err = processor.do_commit("crafter-mysite").await.unwrap_err();
        assert_eq!(
            err,
            SearchError::commit("crafter-mysite", BackendError::status(503, "unavailable"))
        );
    }

    #[tokio::test]
    async fn test_items_including_component() {
        let search = Arc::new(MockSearchService::with_includes(&[(
            "/site/components/header.xml",
            &["/site/website/index.xml", "/site/website/about/index.xml"],
        )]));
        let processor = IndexingProcessor::new(search.clone());

        let items = processor
            .get_items_that_include_component("crafter-mysite", "/site/components/header.xml")
            .await
            .unwrap();
        assert_eq!(items, vec!["/site/website/index.xml", "/site/website/about/index.xml"]);

        let searches = search.searches.lock().unwrap();
        assert_eq!(searches.len(), 1);
        let (index_id, field, filter) = &searches[0];
        assert_eq!(index_id, "crafter-mysite");
        assert_eq!(field, LOCAL_ID_FIELD);
        assert_eq!(
            filter,
            &TermFilter::new(INCLUDED_DESCRIPTORS_FIELD, "/site/components/header.xml")
        );
    }

    #[tokio::test]
    async fn test_no_dependents_is_empty() {
        let processor = IndexingProcessor::new(Arc::new(MockSearchService::default()));
        let items = processor
            .get_items_that_include_component("crafter-mysite", "/site/components/unused.xml")
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_query_failure_is_query_error() {
        let processor =
            IndexingProcessor::new(Arc::new(MockSearchService::failing(BackendError::connection("refused"))));
        let err = processor
            .get_items_that_include_component("crafter-mysite", "/site/components/header.xml")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::query(
                "crafter-mysite",
                "/site/components/header.xml",
                BackendError::connection("refused")
            )
        );
    }

    #[tokio::test]
    async fn test_find_dependents_cascades() {
        let search = Arc::new(MockSearchService::with_includes(&[
            ("/site/components/button.xml", &["/site/components/header.xml"]),
            (
                "/site/components/header.xml",
                &["/site/website/index.xml", "/site/components/button.xml"],
            ),
            ("/site/components/footer.xml", &["/site/website/index.xml"]),
        ]));
        let processor = IndexingProcessor::new(search);

        let changed = vec![
            "/site/components/button.xml".to_string(),
            "/site/components/footer.xml".to_string(),
        ];
        let dependents = processor
            .find_dependents("crafter-mysite", &changed)
            .await
            .unwrap();

        assert_eq!(
            dependents.into_iter().collect::<Vec<_>>(),
            vec!["/site/components/header.xml", "/site/website/index.xml"]
        );
    }
}
