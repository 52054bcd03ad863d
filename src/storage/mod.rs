//! Storage layer for the Gateway
//!
//! Persists API keys, audit entries and the managed-model allow-list.

/// Database storage module
pub mod database;

use crate::config::StorageConfig;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Main storage layer that owns the database handle
#[derive(Debug, Clone)]
pub struct StorageLayer {
    /// Database connection pool
    pub database: Arc<database::Database>,
}

impl StorageLayer {
    /// Create a new storage layer
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        info!("Initializing storage layer");
        let database = Arc::new(database::Database::new(&config.database).await?);
        Ok(Self { database })
    }

    /// Database handle
    pub fn db(&self) -> &database::Database {
        &self.database
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        self.database.migrate().await
    }

    /// Whether the database answers a trivial query
    pub async fn health_check(&self) -> bool {
        match self.database.health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Database health check failed: {}", e);
                false
            }
        }
    }
}
