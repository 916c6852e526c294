mod courses;
mod files;
mod health;
mod static_files;

use std::fmt::Display;

use crate::api::response::ApiError;

pub use courses::{add_course, delete_course, list_courses};
pub use files::{add_file, delete_file, list_course_files, upload_file};
pub use health::health;
pub use static_files::serve_upload;

/// Map a storage or I/O failure to a 500, logging the cause and returning a fixed message.
fn internal<E: Display>(message: &'static str) -> impl FnOnce(E) -> ApiError {
    move |e| {
        tracing::error!(error = %e, "{message}");
        ApiError::internal(message)
    }
}
