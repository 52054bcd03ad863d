//! Managed-model allow-list administration (gated)

use super::json_result;
use crate::core::models::NewManagedModel;
use crate::server::middleware::caller_context;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::{HttpRequest, HttpResponse, web};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/managed-models")
            .route("", web::get().to(list_managed_models))
            .route("", web::post().to(upsert_managed_model))
            .route("/{model}", web::delete().to(delete_managed_model)),
    );
}

async fn list_managed_models(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let result = state
        .gateway
        .list_managed_models(&caller_context(&req))
        .await;
    json_result(&state, &req, result)
}

async fn upsert_managed_model(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<NewManagedModel>,
) -> HttpResponse {
    let result = state
        .gateway
        .upsert_managed_model(&caller_context(&req), body.into_inner())
        .await;
    json_result(&state, &req, result)
}

async fn delete_managed_model(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let model = path.into_inner();
    let result = match state
        .gateway
        .delete_managed_model(&caller_context(&req), &model)
        .await
    {
        Ok(true) => Ok(serde_json::json!({ "model": model, "deleted": true })),
        Ok(false) => Err(GatewayError::not_found(format!(
            "managed model '{}' not found",
            model
        ))),
        Err(e) => Err(e),
    };
    json_result(&state, &req, result)
}
