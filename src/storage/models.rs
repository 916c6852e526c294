use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of every `url` that points into the upload root.
pub const UPLOAD_URL_PREFIX: &str = "uploads/";

/// A course record stored in redb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl CourseRecord {
    pub fn new(name: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A file record stored in redb. `course` holds the owning course's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    pub course: String,
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(title: &str, url: &str, course: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            url: url.to_string(),
            course: course.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Extract the object store key from an internal `uploads/<key>` url.
pub fn upload_key(url: &str) -> Option<&str> {
    url.strip_prefix(UPLOAD_URL_PREFIX)
        .filter(|key| !key.is_empty())
}
