use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::internal;
use crate::api::response::{required, ApiError, AppJson, MessageResponse};
use crate::storage::models::CourseRecord;
use crate::storage::DatabaseError;
use crate::uploads;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CourseResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCourseRequest {
    #[serde(default)]
    pub name: Option<String>,
}

impl From<&CourseRecord> for CourseResponse {
    fn from(course: &CourseRecord) -> Self {
        Self {
            id: course.id.clone(),
            name: course.name.clone(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = state
        .db
        .list_courses()
        .map_err(internal("Failed to fetch courses"))?;

    Ok(Json(courses.iter().map(CourseResponse::from).collect()))
}

pub async fn add_course(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AddCourseRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let name = required(req.name).ok_or_else(|| ApiError::bad_request("Course name required"))?;

    match state.db.create_course(&name) {
        Ok(course) => {
            tracing::debug!(course_id = %course.id, name = %course.name, "Created course");
            Ok(MessageResponse::ok("Course added successfully"))
        }
        Err(DatabaseError::DuplicateName(_)) => Err(ApiError::bad_request("Course already exists")),
        Err(e) => Err(internal("Error adding course")(e)),
    }
}

pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    // Phase 1: remove the course and its file records in one transaction
    let (course, files) = state
        .db
        .delete_course_cascade(&id)
        .map_err(internal("Error deleting course"))?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    // Phase 2: remove uploaded bytes (best-effort)
    for file in &files {
        uploads::remove_stored_bytes(state.object_store.as_ref(), &file.url).await;
    }

    tracing::debug!(
        course_id = %course.id,
        name = %course.name,
        files = files.len(),
        "Deleted course"
    );
    Ok(MessageResponse::ok("Course and files deleted successfully"))
}
