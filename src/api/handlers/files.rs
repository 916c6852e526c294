use axum::extract::{Multipart, Path, State};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::internal;
use crate::api::response::{required, ApiError, AppJson, MessageResponse};
use crate::storage::models::FileRecord;
use crate::uploads;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct FileResponse {
    pub id: String,
    pub title: String,
    pub url: String,
    pub course: String,
}

#[derive(Debug, Deserialize)]
pub struct AddFileRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
}

impl From<&FileRecord> for FileResponse {
    fn from(file: &FileRecord) -> Self {
        Self {
            id: file.id.clone(),
            title: file.title.clone(),
            url: file.url.clone(),
            course: file.course.clone(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_course_files(
    State(state): State<Arc<AppState>>,
    Path(course): Path<String>,
) -> Result<Json<Vec<FileResponse>>, ApiError> {
    let files = state
        .db
        .list_files_by_course(&course)
        .map_err(internal("Failed to fetch files"))?;

    Ok(Json(files.iter().map(FileResponse::from).collect()))
}

pub async fn add_file(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AddFileRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (Some(title), Some(url), Some(course)) =
        (required(req.title), required(req.url), required(req.course))
    else {
        return Err(ApiError::bad_request("Missing fields"));
    };

    ensure_course(&state, &course, "Error adding file")?;

    let file = state
        .db
        .create_file(&title, &url, &course)
        .map_err(internal("Error adding file"))?;

    tracing::debug!(file_id = %file.id, course = %file.course, "Created file");
    Ok(MessageResponse::ok("File added successfully"))
}

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut file_data: Option<Bytes> = None;
    let mut file_name: Option<String> = None;
    let mut title: Option<String> = None;
    let mut course: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;

                if data.len() as u64 > state.config.max_upload_size {
                    return Err(ApiError::payload_too_large(format!(
                        "File exceeds maximum upload size of {} bytes",
                        state.config.max_upload_size
                    )));
                }

                file_data = Some(data);
            }
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid title: {e}")))?,
                );
            }
            "course" => {
                course = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid course: {e}")))?,
                );
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let (Some(title), Some(course), Some(file_data)) = (required(title), required(course), file_data)
    else {
        return Err(ApiError::bad_request("Missing fields or file"));
    };

    // Phase 1: write bytes under the upload root; nothing is recorded if this fails
    let url = uploads::store_upload(state.object_store.as_ref(), file_name.as_deref(), file_data)
        .await
        .map_err(internal("Error uploading file"))?;

    // Phase 2: ensure the course and record the file
    let recorded = ensure_course(&state, &course, "Error uploading file").and_then(|()| {
        state
            .db
            .create_file(&title, &url, &course)
            .map_err(internal("Error uploading file"))
    });
    let file = match recorded {
        Ok(file) => file,
        Err(e) => {
            // Best-effort cleanup of the stored bytes
            uploads::remove_stored_bytes(state.object_store.as_ref(), &url).await;
            return Err(e);
        }
    };

    tracing::debug!(file_id = %file.id, url = %file.url, course = %file.course, "Uploaded file");
    Ok(MessageResponse::ok("File uploaded successfully"))
}

pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let file = state
        .db
        .get_file(&id)
        .map_err(internal("Error deleting file"))?
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    // Phase 1: remove the record
    let deleted = state
        .db
        .delete_file(&id)
        .map_err(internal("Error deleting file"))?;
    if !deleted {
        // Removed by a concurrent request between lookup and delete
        return Err(ApiError::not_found("File not found"));
    }

    // Phase 2: remove uploaded bytes (best-effort)
    uploads::remove_stored_bytes(state.object_store.as_ref(), &file.url).await;

    tracing::debug!(file_id = %id, "Deleted file");
    Ok(MessageResponse::ok("File deleted successfully"))
}

// ============================================================================
// Helpers
// ============================================================================

/// Make sure the named course exists, creating it when a file refers to it first.
fn ensure_course(state: &AppState, name: &str, failure: &'static str) -> Result<(), ApiError> {
    let (course, created) = state.db.ensure_course(name).map_err(internal(failure))?;
    if created {
        tracing::debug!(course_id = %course.id, name = %course.name, "Created course for file");
    }
    Ok(())
}
