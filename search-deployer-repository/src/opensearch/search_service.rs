//! OpenSearch data-plane operations used while indexing.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use opensearch::indices::IndicesRefreshParts;
use opensearch::SearchParts;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::BackendError;
use crate::interfaces::SearchQueryService;
use crate::opensearch::client::OpenSearchClients;
use crate::types::TermFilter;
use crate::utils::check_response;

/// Number of hits requested per search page.
const DEFAULT_PAGE_SIZE: usize = 1000;

/// OpenSearch implementation of [`SearchQueryService`].
///
/// Refreshes go to every write cluster, searches to the read cluster. Field
/// searches page with `search_after` on `_doc`, so they are not limited by
/// the index's `max_result_window`.
pub struct OpenSearchSearchService {
    clients: Arc<OpenSearchClients>,
    page_size: usize,
}

impl OpenSearchSearchService {
    pub fn new(clients: Arc<OpenSearchClients>) -> Self {
        Self {
            clients,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Change the number of hits requested per page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Build the body of one search page, starting after `search_after`.
    fn search_body(
        filter: &TermFilter,
        field_name: &str,
        size: usize,
        search_after: Option<&Value>,
    ) -> Value {
        let mut body = json!({
            "query": filter.to_query(),
            "_source": [field_name],
            "size": size,
            "sort": ["_doc"]
        });
        if let Some(cursor) = search_after {
            body["search_after"] = cursor.clone();
        }
        body
    }
}

/// Extract the values of `field_name` from a search response.
///
/// Multi-valued fields contribute every value. Returns the values and the
/// number of hits in the page.
fn extract_field_values(response: &Value, field_name: &str) -> (Vec<String>, usize) {
    let Some(hits) = response["hits"]["hits"].as_array() else {
        return (Vec::new(), 0);
    };

    let values = hits
        .iter()
        .flat_map(|hit| match &hit["_source"][field_name] {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        })
        .collect();

    (values, hits.len())
}

/// The sort values of the last hit of a page, which the next page starts after.
fn last_sort_values(response: &Value) -> Option<Value> {
    response["hits"]["hits"]
        .as_array()?
        .last()
        .map(|hit| hit["sort"].clone())
        .filter(|sort| sort.is_array())
}

/// Collect `field_name` over every page returned by `fetch_page`.
///
/// `fetch_page` is called with the page size and the cursor to start after
/// (`None` for the first page). Paging ends with the first page shorter than
/// the page size. A full page without sort values, or one that does not move
/// the cursor forward, is a parse error rather than a truncated result.
async fn collect_field_values<F, Fut>(
    field_name: &str,
    page_size: usize,
    mut fetch_page: F,
) -> Result<Vec<String>, BackendError>
where
    F: FnMut(usize, Option<Value>) -> Fut,
    Fut: Future<Output = Result<Value, BackendError>>,
{
    let mut values = Vec::new();
    let mut cursor: Option<Value> = None;

    loop {
        let response = fetch_page(page_size, cursor.clone()).await?;
        let (page, hits) = extract_field_values(&response, field_name);
        values.extend(page);
        if hits < page_size {
            return Ok(values);
        }

        let next = last_sort_values(&response).ok_or_else(|| {
            BackendError::parse("search page has no sort values to continue from")
        })?;
        if cursor.as_ref() == Some(&next) {
            return Err(BackendError::parse(format!(
                "search cursor did not advance past {}",
                next
            )));
        }
        cursor = Some(next);
    }
}

#[async_trait]
impl SearchQueryService for OpenSearchSearchService {
    async fn refresh(&self, index_id: &str) -> Result<(), BackendError> {
        for client in self.clients.writes() {
            let response = client
                .indices()
                .refresh(IndicesRefreshParts::Index(&[index_id]))
                .send()
                .await?;
            check_response(response).await?;
        }
        debug!(index_id = %index_id, "Index refreshed");
        Ok(())
    }

    async fn search_field(
        &self,
        index_id: &str,
        field_name: &str,
        filter: &TermFilter,
    ) -> Result<Vec<String>, BackendError> {
        let client = self.clients.read();
        let values = collect_field_values(field_name, self.page_size, |size, cursor| async move {
            let response = client
                .search(SearchParts::Index(&[index_id]))
                .body(Self::search_body(filter, field_name, size, cursor.as_ref()))
                .send()
                .await?;
            check_response(response)
                .await?
                .json::<Value>()
                .await
                .map_err(|e| BackendError::parse(e.to_string()))
        })
        .await?;

        debug!(
            index_id = %index_id,
            field = %field_name,
            filter_field = %filter.field,
            matches = values.len(),
            "Field search completed"
        );
        Ok(values)
    }
}
