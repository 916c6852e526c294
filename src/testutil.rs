//! Shared test helpers for handler tests.

use std::sync::Arc;

use axum_test::TestServer;

use crate::config::{Config, ServerConfig, StorageConfig};
use crate::object_store::LocalStore;
use crate::storage::Database;
use crate::AppState;

/// Create a test AppState with a temporary database and upload root.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");
    let upload_dir = temp_dir.path().join("uploads");

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        storage: StorageConfig {
            data_dir: data_dir.to_string_lossy().to_string(),
            upload_dir: upload_dir.to_string_lossy().to_string(),
        },
        max_upload_size: 1024 * 1024, // 1MB for tests
    };

    let db = Database::open(&data_dir).expect("Failed to open test database");
    let object_store = LocalStore::new(&upload_dir).expect("Failed to create test upload root");

    Arc::new(AppState {
        config,
        db,
        object_store: Arc::new(object_store),
    })
}

/// Build a TestServer over the full router.
pub fn test_server(state: &Arc<AppState>) -> TestServer {
    TestServer::new(crate::api::create_router(Arc::clone(state)))
        .expect("Failed to create test server")
}
