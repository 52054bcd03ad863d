//! Audit log endpoints (gated)

use super::json_result;
use crate::core::models::AuditQuery;
use crate::server::middleware::caller_context;
use crate::server::state::AppState;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/logs")
            .route("", web::get().to(query_logs))
            .route("/stats", web::get().to(log_stats)),
    );
}

/// Query string of `GET /api/logs`; time bounds are RFC 3339
#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
    pub api_key_id: Option<String>,
    pub identity: Option<String>,
    pub owner: Option<String>,
    pub operation: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl LogsQuery {
    fn filters(&self) -> AuditQuery {
        AuditQuery {
            api_key_id: self.api_key_id.clone(),
            identity: self.identity.clone(),
            owner: self.owner.clone(),
            operation: self.operation.clone(),
            start: self.start,
            end: self.end,
        }
    }
}

async fn query_logs(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<LogsQuery>,
) -> HttpResponse {
    let result = state
        .gateway
        .query_logs(&caller_context(&req), query.filters(), query.limit, query.offset)
        .await;
    json_result(&state, &req, result)
}

async fn log_stats(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let result = state.gateway.log_stats(&caller_context(&req)).await;
    json_result(&state, &req, result)
}
