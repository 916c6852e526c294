//! course-share - a small course file sharing API
//!
//! This crate provides:
//! - Courses identified by unique name, and files grouped under them
//! - redb embedded database for course and file records (ACID, crash-safe)
//! - Uploads persisted to a local upload root and served read-only
//! - REST API with JSON bodies and multipart upload support

pub mod api;
pub mod config;
pub mod object_store;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod uploads;

use std::sync::Arc;

use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub object_store: Arc<dyn object_store::ObjectStore>,
}
