use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::object_store::ObjectStoreError;
use crate::uploads;
use crate::AppState;

/// Serve previously uploaded bytes, read-only.
/// Route: GET /uploads/:key
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(key): axum::extract::Path<String>,
) -> Result<Response, ApiError> {
    let data = state.object_store.get(&key).await.map_err(|e| match e {
        ObjectStoreError::NotFound(_) => ApiError::not_found("File not found"),
        ObjectStoreError::InvalidKey(_) => ApiError::bad_request("Invalid file name"),
        _ => {
            tracing::error!(key = %key, error = %e, "Failed to read uploaded file");
            ApiError::internal("Failed to retrieve file")
        }
    })?;

    let mime_type = mime_guess::from_path(&key)
        .first_or_octet_stream()
        .to_string();

    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        mime_type
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );

    // Only names in the generated-upload charset are safe to quote into the header
    if uploads::sanitize_file_name(&key) == key {
        if let Ok(value) = format!("inline; filename=\"{key}\"").parse() {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
    }

    // Stored keys are never rewritten, only deleted
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use bytes::Bytes;

    use crate::testutil::{test_server, test_state};

    #[tokio::test]
    async fn serves_stored_bytes_with_guessed_type() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let server = test_server(&state);

        state
            .object_store
            .put("1-abcd1234-notes.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        let response = server.get("/uploads/1-abcd1234-notes.txt").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "hello");
        assert_eq!(
            response.header(header::CONTENT_TYPE),
            "text/plain"
        );
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "inline; filename=\"1-abcd1234-notes.txt\""
        );
    }

    #[tokio::test]
    async fn quoted_key_gets_no_content_disposition() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let server = test_server(&state);

        state
            .object_store
            .put("a\";b.txt", Bytes::from_static(b"odd"))
            .await
            .unwrap();

        let response = server.get("/uploads/a%22%3Bb.txt").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "odd");
        assert!(response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .is_none());
    }

    #[tokio::test]
    async fn missing_upload_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let server = test_server(&state);

        let response = server.get("/uploads/nope.pdf").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn backslash_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let server = test_server(&state);

        let response = server.get("/uploads/..%5Csecret").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), r#"{"message":"Invalid file name"}"#);
    }
}
