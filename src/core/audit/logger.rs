//! Audit log writer and reader

use super::types::{AuditPage, DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT};
use crate::config::models::audit::AuditConfig;
use crate::core::models::{AuditEntry, AuditQuery, AuditStats, StatusBreakdown};
use crate::storage::StorageLayer;
use crate::utils::error::{GatewayError, Result};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Append-only audit log backed by the storage layer
#[derive(Debug, Clone)]
pub struct AuditLogger {
    storage: Arc<StorageLayer>,
    config: AuditConfig,
}

impl AuditLogger {
    pub fn new(storage: Arc<StorageLayer>, config: AuditConfig) -> Self {
        Self { storage, config }
    }

    /// Append one entry.
    ///
    /// Storage failures are logged and swallowed: auditing never fails the
    /// call being audited. Returns the row id when the entry was written.
    pub async fn record(&self, entry: AuditEntry) -> Option<i64> {
        if !self.config.enabled {
            return None;
        }

        match self.storage.db().insert_request_log(&entry).await {
            Ok(id) => {
                debug!(
                    id,
                    request_id = %entry.request_id,
                    operation = %entry.operation,
                    status = entry.response_status,
                    "audit entry recorded"
                );
                Some(id)
            }
            Err(e) => {
                error!(
                    request_id = %entry.request_id,
                    operation = %entry.operation,
                    error = %e,
                    "failed to record audit entry"
                );
                None
            }
        }
    }

    /// Filtered page of entries, newest first
    pub async fn query(
        &self,
        filters: &AuditQuery,
        limit: Option<u64>,
        offset: u64,
    ) -> Result<AuditPage> {
        let limit = limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        if !(1..=MAX_QUERY_LIMIT).contains(&limit) {
            return Err(GatewayError::invalid_field(
                "limit",
                format!("limit must be between 1 and {}", MAX_QUERY_LIMIT),
            ));
        }
        if let (Some(start), Some(end)) = (filters.start, filters.end) {
            if start > end {
                return Err(GatewayError::invalid_field("start", "start must not be after end"));
            }
        }

        let (entries, total) = self
            .storage
            .db()
            .query_request_logs(filters, limit, offset)
            .await?;
        Ok(AuditPage {
            entries,
            total,
            limit,
            offset,
        })
    }

    /// Aggregate counts, mean latency and status classes
    pub async fn stats(&self) -> Result<AuditStats> {
        let db = self.storage.db();
        let (total, average_latency) = db.request_log_summary().await?;
        let last_24h = db.count_request_logs_since(Utc::now() - Duration::hours(24)).await?;

        let mut by_status = StatusBreakdown::default();
        for (status, count) in db.request_log_status_counts().await? {
            by_status.add_count(u16::try_from(status).unwrap_or(0), count);
        }

        let average_latency_ms = average_latency.map_or(0, |avg| avg.max(0.0).round() as u64);

        Ok(AuditStats {
            total,
            last_24h,
            average_latency_ms,
            by_status,
        })
    }

    /// Delete entries strictly older than `retention_days`
    pub async fn prune(&self, retention_days: u32) -> Result<u64> {
        let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
        let removed = self.storage.db().delete_request_logs_before(cutoff).await?;
        if removed > 0 {
            info!(removed, retention_days, "pruned audit entries");
        }
        Ok(removed)
    }

    /// Prune with the configured retention
    pub async fn prune_expired(&self) -> Result<u64> {
        self.prune(self.config.retention_days).await
    }
}
