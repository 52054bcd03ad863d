use crate::core::models::{AuditEntry, AuditQuery};
use crate::utils::error::{GatewayError, Result};
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, request_log};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Append one audit entry, returning its row id
    pub async fn insert_request_log(&self, entry: &AuditEntry) -> Result<i64> {
        let result = entities::RequestLog::insert(request_log::Model::from_domain(entry))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(result.last_insert_id)
    }

    /// Filtered page of entries (newest first) plus the filtered total
    pub async fn query_request_logs(
        &self,
        filters: &AuditQuery,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<AuditEntry>, u64)> {
        let mut query = entities::RequestLog::find();

        if let Some(api_key_id) = &filters.api_key_id {
            query = query.filter(request_log::Column::ApiKeyId.eq(api_key_id.as_str()));
        }
        if let Some(identity) = &filters.identity {
            query = query.filter(request_log::Column::Identity.eq(identity.as_str()));
        }
        if let Some(owner) = &filters.owner {
            query = query.filter(request_log::Column::Owner.eq(owner.as_str()));
        }
        if let Some(operation) = &filters.operation {
            query = query.filter(request_log::Column::Operation.contains(operation.as_str()));
        }
        if let Some(start) = filters.start {
            let start: DateTimeWithTimeZone = start.into();
            query = query.filter(request_log::Column::CreatedAt.gte(start));
        }
        if let Some(end) = filters.end {
            let end: DateTimeWithTimeZone = end.into();
            query = query.filter(request_log::Column::CreatedAt.lte(end));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        let models = query
            .order_by_desc(request_log::Column::CreatedAt)
            .order_by_desc(request_log::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok((models.iter().map(request_log::Model::to_domain).collect(), total))
    }

    /// Entry count and mean latency over the whole log
    pub async fn request_log_summary(&self) -> Result<(u64, Option<f64>)> {
        // AVG over an integer column is NUMERIC on Postgres
        let summary = entities::RequestLog::find()
            .select_only()
            .column_as(Expr::col(request_log::Column::Id).count(), "total")
            .column_as(
                SimpleExpr::from(Func::avg(Expr::col(request_log::Column::LatencyMs)))
                    .cast_as(Alias::new("DOUBLE PRECISION")),
                "average_latency",
            )
            .into_tuple::<(i64, Option<f64>)>()
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(summary
            .map(|(total, average)| (u64::try_from(total).unwrap_or(0), average))
            .unwrap_or((0, None)))
    }

    /// Entry counts grouped by response status
    pub async fn request_log_status_counts(&self) -> Result<Vec<(i32, u64)>> {
        let rows = entities::RequestLog::find()
            .select_only()
            .column(request_log::Column::ResponseStatus)
            .column_as(Expr::col(request_log::Column::Id).count(), "count")
            .group_by(request_log::Column::ResponseStatus)
            .into_tuple::<(i32, i64)>()
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(rows
            .into_iter()
            .map(|(status, count)| (status, u64::try_from(count).unwrap_or(0)))
            .collect())
    }

    /// Number of entries written at or after `since`
    pub async fn count_request_logs_since(&self, since: DateTime<Utc>) -> Result<u64> {
        let since: DateTimeWithTimeZone = since.into();
        entities::RequestLog::find()
            .filter(request_log::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .map_err(GatewayError::Database)
    }

    /// Delete entries strictly older than `cutoff`
    pub async fn delete_request_logs_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        debug!("Deleting request logs older than {}", cutoff);

        let cutoff: DateTimeWithTimeZone = cutoff.into();
        let result = entities::RequestLog::delete_many()
            .filter(request_log::Column::CreatedAt.lt(cutoff))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(result.rows_affected)
    }
}
