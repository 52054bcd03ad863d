//! Health check and public configuration endpoints

use super::ApiResponse;
use crate::core::upstream::SessionSnapshot;
use crate::server::state::AppState;
use actix_web::{HttpResponse, web};
use std::borrow::Cow;
use tracing::debug;

/// Service health, including the upstream session as currently negotiated
#[derive(Debug, Clone, serde::Serialize)]
struct HealthStatus {
    status: Cow<'static, str>,
    timestamp: chrono::DateTime<chrono::Utc>,
    version: Cow<'static, str>,
    build_time: Cow<'static, str>,
    git_hash: Cow<'static, str>,
    database: bool,
    upstream: SessionSnapshot,
}

/// Basic health check endpoint
///
/// Reports `degraded` when the database does not answer. Never contacts
/// the upstream system; the session snapshot reflects the last negotiation.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    debug!("Health check requested");

    let database = state.gateway.storage().health_check().await;
    let health = HealthStatus {
        status: Cow::Borrowed(if database { "ok" } else { "degraded" }),
        timestamp: chrono::Utc::now(),
        version: Cow::Borrowed(env!("CARGO_PKG_VERSION")),
        build_time: Cow::Borrowed(env!("BUILD_TIME")),
        git_hash: Cow::Borrowed(env!("GIT_HASH")),
        database,
        upstream: state.gateway.upstream().snapshot().await,
    };

    if database {
        HttpResponse::Ok().json(health)
    } else {
        HttpResponse::ServiceUnavailable().json(health)
    }
}

/// Secret-free configuration readback
pub async fn public_config(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(state.config.gateway.public()))
}
