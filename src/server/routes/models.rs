//! Record endpoints: gated upstream CRUD on one model

use super::{error_response, operation_response};
use crate::core::gateway::GatewayOperation;
use crate::core::tools::arguments;
use crate::core::upstream::Record;
use crate::server::middleware::caller_context;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::{Map, Value};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // `/{model}/fields` must be registered before `/{model}/{id}`
    cfg.service(
        web::scope("/models")
            .route("", web::get().to(list_models))
            .route("/{model}/fields", web::get().to(model_fields))
            .route("/{model}/search", web::post().to(search_records))
            .route("/{model}/count", web::post().to(count_records))
            .route("/{model}/create", web::post().to(create_record))
            .route("/{model}/{id}", web::get().to(read_record))
            .route("/{model}/{id}", web::put().to(update_record))
            .route("/{model}/{id}", web::delete().to(delete_record)),
    );
}

#[derive(Debug, Deserialize)]
pub struct ReadQuery {
    /// Comma-separated field names
    pub fields: Option<String>,
}

/// Run `operation` through the gateway, or answer with the validation error
async fn run(
    state: &AppState,
    req: &HttpRequest,
    operation: Result<GatewayOperation>,
) -> HttpResponse {
    let operation = match operation {
        Ok(operation) => operation,
        Err(e) => return error_response(state, req, &e),
    };

    let status = StatusCode::from_u16(operation.success_status()).unwrap_or(StatusCode::OK);
    let result = state
        .gateway
        .execute(&caller_context(req), operation)
        .await;
    operation_response(state, req, status, result)
}

async fn list_models(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    run(&state, &req, Ok(GatewayOperation::ListModels)).await
}

async fn model_fields(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let operation = model_name(&path).map(|model| GatewayOperation::GetModelFields { model });
    run(&state, &req, operation).await
}

async fn search_records(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let operation = search_operation(&path, &body);
    run(&state, &req, operation).await
}

async fn count_records(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let operation = count_operation(&path, &body);
    run(&state, &req, operation).await
}

/// The whole body is the new record's values
async fn create_record(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let operation = model_name(&path).and_then(|model| {
        Ok(GatewayOperation::CreateRecord {
            model,
            values: record_values(&body)?,
        })
    });
    run(&state, &req, operation).await
}

async fn read_record(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    query: web::Query<ReadQuery>,
) -> HttpResponse {
    let fields = query.fields.as_deref().map(|fields| {
        fields
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    });
    let operation = record_path(&path).map(|(model, id)| GatewayOperation::ReadRecords {
        model,
        ids: vec![id],
        fields: fields.filter(|fields| !fields.is_empty()),
    });
    run(&state, &req, operation).await
}

async fn update_record(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> HttpResponse {
    let operation = record_path(&path).and_then(|(model, id)| {
        Ok(GatewayOperation::UpdateRecords {
            model,
            ids: vec![id],
            values: record_values(&body)?,
        })
    });
    run(&state, &req, operation).await
}

async fn delete_record(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let operation = record_path(&path).map(|(model, id)| GatewayOperation::DeleteRecords {
        model,
        ids: vec![id],
    });
    run(&state, &req, operation).await
}

fn search_operation(model: &str, body: &[u8]) -> Result<GatewayOperation> {
    let model = model_name(model)?;
    let args = object_body(body)?;
    Ok(GatewayOperation::SearchRecords {
        model,
        options: arguments::search_options(&args)?,
    })
}

fn count_operation(model: &str, body: &[u8]) -> Result<GatewayOperation> {
    let model = model_name(model)?;
    let args = object_body(body)?;
    Ok(GatewayOperation::CountRecords {
        model,
        domain: arguments::domain(args.get("domain"))?,
    })
}

fn record_values(body: &[u8]) -> Result<Record> {
    arguments::values(Some(&Value::Object(object_body(body)?)))
}

fn model_name(raw: &str) -> Result<String> {
    let model = raw.trim();
    if model.is_empty() {
        return Err(GatewayError::invalid_field("model", "model is required"));
    }
    Ok(model.to_string())
}

fn record_path((model, id): &(String, String)) -> Result<(String, i64)> {
    let id = id
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| GatewayError::invalid_field("id", "id must be a positive integer"))?;
    Ok((model_name(model)?, id))
}

/// Parse a JSON object body; an empty body is an empty object
fn object_body(body: &[u8]) -> Result<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(GatewayError::invalid_field("body", "body must be a JSON object")),
        Err(e) => Err(GatewayError::invalid_field(
            "body",
            format!("invalid JSON body: {}", e),
        )),
    }
}
