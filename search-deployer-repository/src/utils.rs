//! Utility functions for talking to the search backend.

use opensearch::http::response::Response;

use crate::errors::BackendError;

/// Turn a non-success response into a [`BackendError::StatusError`].
///
/// The response body is read and kept as the error message, which is where
/// OpenSearch explains what went wrong.
pub async fn check_response(response: Response) -> Result<Response, BackendError> {
    let status = response.status_code();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::status(status.as_u16(), body))
}

/// Whether an index creation failed only because the index already exists.
pub fn is_already_exists(error: &BackendError) -> bool {
    matches!(
        error,
        BackendError::StatusError { status: 400, body }
            if body.contains("resource_already_exists_exception")
    )
}
