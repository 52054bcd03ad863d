//! Test storage utilities
//!
//! Each call opens an isolated in-memory SQLite database.

use odoo_gateway::config::{DatabaseConfig, StorageConfig};
use odoo_gateway::storage::StorageLayer;
use std::sync::Arc;

/// Migrated in-memory storage
pub async fn test_storage() -> Arc<StorageLayer> {
    let config = StorageConfig {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connection_timeout: 5,
        },
    };

    let storage = StorageLayer::new(&config)
        .await
        .expect("Failed to create in-memory test database");
    storage
        .migrate()
        .await
        .expect("Failed to run database migrations");
    Arc::new(storage)
}
