//! Upload handling: naming, persisting and removing uploaded bytes.
//!
//! Uploaded bytes are stored in the object store under a generated key and
//! recorded on the file as `uploads/<key>`.

use bytes::Bytes;
use chrono::Utc;

use crate::object_store::{ObjectStore, ObjectStoreError};
use crate::storage::models::{upload_key, UPLOAD_URL_PREFIX};

const FALLBACK_NAME: &str = "upload";

/// Reduce a client-supplied file name to a safe, flat file name.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}

/// Generate a storage key: `{unix-millis}-{random hex}-{sanitized name}`.
pub fn generate_key(original_name: Option<&str>) -> String {
    let name = original_name
        .map(sanitize_file_name)
        .unwrap_or_else(|| FALLBACK_NAME.to_string());
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", Utc::now().timestamp_millis(), &suffix[..8], name)
}

/// Relative URL recorded for a stored key.
pub fn url_for_key(key: &str) -> String {
    format!("{UPLOAD_URL_PREFIX}{key}")
}

/// Persist uploaded bytes and return the relative URL to record on the file.
pub async fn store_upload(
    store: &dyn ObjectStore,
    original_name: Option<&str>,
    data: Bytes,
) -> Result<String, ObjectStoreError> {
    let key = generate_key(original_name);
    store.put(&key, data).await?;
    Ok(url_for_key(&key))
}

/// Remove the stored bytes behind a file url, if it points into the upload root.
/// Best-effort: bytes that are already gone are a no-op, other failures are
/// logged and never abort the caller.
pub async fn remove_stored_bytes(store: &dyn ObjectStore, url: &str) {
    let Some(key) = upload_key(url) else {
        return;
    };

    if let Err(e) = store.delete(key).await {
        tracing::warn!(key = %key, error = %e, "Failed to delete uploaded bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_plain_names() {
        assert_eq!(sanitize_file_name("lecture-1.pdf"), "lecture-1.pdf");
        assert_eq!(sanitize_file_name("notes_v2.tar.gz"), "notes_v2.tar.gz");
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\slides.pptx"), "slides.pptx");
    }

    #[test]
    fn sanitize_replaces_odd_characters() {
        assert_eq!(sanitize_file_name("week 1 (intro).pdf"), "week_1__intro_.pdf");
        assert_eq!(sanitize_file_name("résumé.pdf"), "r_sum_.pdf");
    }

    #[test]
    fn sanitize_falls_back_for_empty_names() {
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name("dir/"), "upload");
    }

    #[test]
    fn generated_keys_are_distinct_and_flat() {
        let a = generate_key(Some("same.pdf"));
        let b = generate_key(Some("same.pdf"));
        assert_ne!(a, b);
        assert!(a.ends_with("-same.pdf"));
        assert!(!a.contains('/'));
        assert!(crate::object_store::validate_key(&a).is_ok());
    }

    #[test]
    fn upload_key_only_for_internal_urls() {
        assert_eq!(upload_key(&url_for_key("123-abc-a.pdf")), Some("123-abc-a.pdf"));
        assert_eq!(upload_key("https://example.com/a.pdf"), None);
        assert_eq!(upload_key("uploads/"), None);
    }
}
