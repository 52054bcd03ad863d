//! HTTP route modules
//!
//! Open routes (health, config, key management, tool catalog) and gated
//! routes that go through the gateway pipeline.

pub mod health;
pub mod keys;
pub mod logs;
pub mod managed_models;
pub mod models;
pub mod tools;

use crate::core::gateway::OperationResult;
use crate::server::middleware::request_id;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;

/// Configure every route of the HTTP surface
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .route("/config", web::get().to(health::public_config))
                .configure(keys::configure_routes)
                .configure(tools::configure_routes)
                .configure(models::configure_routes)
                .configure(logs::configure_routes)
                .configure(managed_models::configure_routes),
        );
}

/// Largest accepted JSON body
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Malformed bodies become normalized validation errors
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, req| {
            let message = format!("invalid JSON body: {}", err);
            InternalError::from_response(err, extractor_error(req, "body", message)).into()
        })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req| {
        let message = format!("invalid query string: {}", err);
        InternalError::from_response(err, extractor_error(req, "query", message)).into()
    })
}

fn extractor_error(req: &HttpRequest, field: &str, message: String) -> HttpResponse {
    let dev_mode = req
        .app_data::<web::Data<AppState>>()
        .is_some_and(|state| state.dev_mode());
    GatewayError::invalid_field(field, message).to_http_response(dev_mode, request_id(req))
}

/// Standard success envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    /// Item count for list-shaped data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// Normalized error body for `err`, tagged with the request's correlation id
pub(crate) fn error_response(
    state: &AppState,
    req: &HttpRequest,
    err: &GatewayError,
) -> HttpResponse {
    err.to_http_response(state.dev_mode(), request_id(req))
}

/// 200 with the success envelope, or the normalized error
pub(crate) fn json_result<T: Serialize>(
    state: &AppState,
    req: &HttpRequest,
    result: Result<T>,
) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(ApiResponse::success(data)),
        Err(e) => error_response(state, req, &e),
    }
}

/// Envelope for an upstream operation result
pub(crate) fn operation_response(
    state: &AppState,
    req: &HttpRequest,
    status: StatusCode,
    result: Result<OperationResult>,
) -> HttpResponse {
    match result {
        Ok(result) => {
            let count = result.count();
            let mut body = ApiResponse::success(result);
            body.count = count;
            HttpResponse::build(status).json(body)
        }
        Err(e) => error_response(state, req, &e),
    }
}
