//! Tool catalog and tool invocation over HTTP

use super::ApiResponse;
use crate::core::tools::{self, ToolCall};
use crate::server::middleware::caller_context;
use crate::server::state::AppState;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::Value;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tools")
            .route("", web::get().to(list_tools))
            .route("/{name}", web::post().to(call_tool)),
    );
}

async fn list_tools() -> HttpResponse {
    let catalog = tools::catalog();
    let count = catalog.len();
    HttpResponse::Ok().json(ApiResponse::success(catalog).with_count(count))
}

/// The body is the tool's argument object. Tool failures are reported in
/// the result (`isError`), not through the HTTP status.
async fn call_tool(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: Option<web::Json<Value>>,
) -> HttpResponse {
    let call = ToolCall {
        name: path.into_inner(),
        arguments: body.map(web::Json::into_inner).unwrap_or(Value::Null),
    };

    let result = tools::call_tool(&state.gateway, &caller_context(&req), &call).await;
    HttpResponse::Ok().json(ApiResponse {
        success: !result.is_error,
        data: result,
        count: None,
    })
}
