//! API key management endpoints
//!
//! These routes are open: key administration is expected to sit behind
//! network-level access control.

use super::{ApiResponse, error_response, json_result};
use crate::auth::IssueKeyRequest;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use tracing::info;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/keys")
            .route("", web::post().to(issue_key))
            .route("", web::get().to(list_keys))
            .route("/{id}", web::get().to(get_key))
            .route("/{id}", web::delete().to(delete_key))
            .route("/{id}/revoke", web::post().to(revoke_key)),
    );
}

#[derive(Debug, Deserialize)]
pub struct ListKeysQuery {
    pub owner: Option<String>,
}

/// Issue a key; the plaintext is returned exactly once
async fn issue_key(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<IssueKeyRequest>,
) -> HttpResponse {
    match state.gateway.api_keys().issue(body.into_inner()).await {
        Ok(issued) => {
            info!(key_id = %issued.record.id, "API key issued");
            HttpResponse::Created().json(ApiResponse::success(issued))
        }
        Err(e) => error_response(&state, &req, &e),
    }
}

async fn list_keys(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ListKeysQuery>,
) -> HttpResponse {
    match state.gateway.api_keys().list(query.owner.as_deref()).await {
        Ok(keys) => {
            let count = keys.len();
            HttpResponse::Ok().json(ApiResponse::success(keys).with_count(count))
        }
        Err(e) => error_response(&state, &req, &e),
    }
}

async fn get_key(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    let result = state
        .gateway
        .api_keys()
        .find(&id)
        .await
        .and_then(|found| found.ok_or_else(|| key_not_found(&id)));
    json_result(&state, &req, result)
}

async fn revoke_key(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    let result = match state.gateway.api_keys().revoke(&id).await {
        Ok(true) => {
            info!(key_id = %id, "API key revoked");
            Ok(serde_json::json!({ "id": id, "revoked": true }))
        }
        Ok(false) => Err(key_not_found(&id)),
        Err(e) => Err(e),
    };
    json_result(&state, &req, result)
}

async fn delete_key(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    let result = match state.gateway.api_keys().delete(&id).await {
        Ok(true) => {
            info!(key_id = %id, "API key deleted");
            Ok(serde_json::json!({ "id": id, "deleted": true }))
        }
        Ok(false) => Err(key_not_found(&id)),
        Err(e) => Err(e),
    };
    json_result(&state, &req, result)
}

fn key_not_found(id: &str) -> GatewayError {
    GatewayError::not_found(format!("API key '{}' not found", id))
}
