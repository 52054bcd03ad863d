//! The gated call pipeline: authenticate, rate-limit, dispatch, audit

use super::types::{CallerContext, CallerIdentity, GatewayOperation, OperationResult};
use crate::auth::ApiKeyHandler;
use crate::config::models::gateway::GatewayConfig;
use crate::core::audit::{AuditLogger, AuditPage};
use crate::core::models::{AuditEntry, AuditQuery, AuditStats, ManagedModel, NewManagedModel};
use crate::core::rate_limiter::RateLimiter;
use crate::core::upstream::{ModelInfo, ProtocolClient};
use crate::storage::StorageLayer;
use crate::utils::error::{GatewayError, Result};
use crate::utils::{generate_request_id, truncate_chars};
use chrono::Utc;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Main gateway that owns every component on the call path
#[derive(Debug, Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    storage: Arc<StorageLayer>,
    api_keys: Arc<ApiKeyHandler>,
    rate_limiter: Arc<RateLimiter>,
    upstream: Arc<ProtocolClient>,
    audit: Arc<AuditLogger>,
}

impl Gateway {
    /// Assemble a gateway from its storage and upstream client
    pub fn new(
        config: GatewayConfig,
        storage: Arc<StorageLayer>,
        upstream: Arc<ProtocolClient>,
    ) -> Self {
        let api_keys = ApiKeyHandler::new(storage.clone(), config.rate_limit.default_rpm);
        let rate_limiter = RateLimiter::new(config.rate_limit.clone());
        let audit = AuditLogger::new(storage.clone(), config.audit.clone());

        Self {
            config: Arc::new(config),
            storage,
            api_keys: Arc::new(api_keys),
            rate_limiter: Arc::new(rate_limiter),
            upstream,
            audit: Arc::new(audit),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<StorageLayer> {
        &self.storage
    }

    pub fn api_keys(&self) -> &ApiKeyHandler {
        &self.api_keys
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn upstream(&self) -> &ProtocolClient {
        &self.upstream
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Run one upstream operation through the full pipeline
    pub async fn execute(
        &self,
        ctx: &CallerContext,
        operation: GatewayOperation,
    ) -> Result<OperationResult> {
        let name = operation.name();
        let payload = operation.payload();
        let status = operation.success_status();

        self.run(ctx, name, Some(payload), status, |_| async move {
            self.perform(&operation).await
        })
        .await
    }

    /// Run a local operation through the same authenticate, rate-limit and
    /// audit steps as upstream calls
    pub async fn gated<T, F, Fut>(
        &self,
        ctx: &CallerContext,
        operation: &str,
        payload: Option<Value>,
        f: F,
    ) -> Result<T>
    where
        F: FnOnce(CallerIdentity) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run(ctx, operation, payload, 200, f).await
    }

    async fn run<T, F, Fut>(
        &self,
        ctx: &CallerContext,
        operation: &str,
        payload: Option<Value>,
        success_status: u16,
        f: F,
    ) -> Result<T>
    where
        F: FnOnce(CallerIdentity) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let request_id = ctx.request_id.clone().unwrap_or_else(generate_request_id);

        let mut caller = None;
        let result = match self.authenticate(ctx).await {
            Ok(resolved) => {
                let admitted = self.admit(&resolved);
                caller = Some(resolved.clone());
                match admitted {
                    Ok(()) => f(resolved).await,
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };

        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let response_status = match &result {
            Ok(_) => success_status,
            Err(e) => e.status_code().as_u16(),
        };

        match &result {
            Ok(_) => info!(%request_id, operation, latency_ms, "gated call succeeded"),
            Err(e) if e.is_local() => {
                debug!(%request_id, operation, error = %e, "gated call rejected")
            }
            Err(e) => warn!(%request_id, operation, latency_ms, error = %e, "gated call failed"),
        }

        let entry = AuditEntry {
            id: None,
            request_id,
            operation: operation.to_string(),
            identity: caller
                .as_ref()
                .map(|c| c.identity.clone())
                .unwrap_or_else(|| ctx.anonymous_identity()),
            api_key_id: caller.as_ref().and_then(|c| c.api_key_id().map(str::to_string)),
            owner: caller.as_ref().and_then(|c| c.owner().map(str::to_string)),
            source_ip: ctx.source_ip.clone(),
            user_agent: ctx.user_agent.clone(),
            request_payload: payload
                .map(|p| truncate_chars(&p.to_string(), self.config.audit.max_payload_chars)),
            response_status,
            latency_ms,
            error_message: result.as_ref().err().map(|e| e.to_string()),
            created_at: Utc::now(),
        };
        self.audit.record(entry).await;

        result
    }

    /// Resolve the caller from the presented key
    pub async fn authenticate(&self, ctx: &CallerContext) -> Result<CallerIdentity> {
        let presented = ctx
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty());

        match presented {
            Some(key) => match self.api_keys.verify(key).await? {
                Some(record) => Ok(CallerIdentity::keyed(record)),
                None => Err(GatewayError::unauthenticated(
                    "invalid, expired or revoked API key",
                )),
            },
            None if self.config.auth.require_api_keys => {
                Err(GatewayError::unauthenticated("API key required"))
            }
            None => Ok(CallerIdentity::anonymous(
                ctx.anonymous_identity(),
                self.rate_limiter.default_budget(),
            )),
        }
    }

    fn admit(&self, caller: &CallerIdentity) -> Result<()> {
        let decision = self.rate_limiter.check(&caller.identity, caller.budget);
        if decision.allowed {
            return Ok(());
        }
        Err(GatewayError::rate_limited(
            format!("{} requests per minute allowed", decision.limit),
            decision.reset_at,
        ))
    }

    async fn perform(&self, operation: &GatewayOperation) -> Result<OperationResult> {
        if let Some(model) = operation.model() {
            self.ensure_model_allowed(model).await?;
        }

        let mut retries_left = if operation.is_read() {
            self.config.upstream.read_retries
        } else {
            0
        };
        loop {
            match self.dispatch(operation).await {
                Err(GatewayError::UpstreamTimeout(message)) if retries_left > 0 => {
                    retries_left -= 1;
                    warn!(
                        operation = operation.name(),
                        retries_left, "upstream timed out, retrying: {}", message
                    );
                }
                other => return other,
            }
        }
    }

    async fn dispatch(&self, operation: &GatewayOperation) -> Result<OperationResult> {
        let upstream = &self.upstream;
        Ok(match operation {
            GatewayOperation::SearchRecords { model, options } => {
                OperationResult::Records(upstream.search_read(model, options).await?)
            }
            GatewayOperation::ReadRecords { model, ids, fields } => {
                OperationResult::Records(upstream.read(model, ids, fields.as_deref()).await?)
            }
            GatewayOperation::CountRecords { model, domain } => {
                OperationResult::Count(upstream.search_count(model, domain).await?)
            }
            GatewayOperation::CreateRecord { model, values } => OperationResult::Created {
                id: upstream.create(model, values.clone()).await?,
            },
            GatewayOperation::UpdateRecords { model, ids, values } => OperationResult::Updated {
                updated: upstream.write(model, ids, values.clone()).await?,
            },
            GatewayOperation::DeleteRecords { model, ids } => OperationResult::Deleted {
                deleted: upstream.unlink(model, ids).await?,
            },
            GatewayOperation::GetModelFields { model } => {
                OperationResult::Fields(upstream.fields_get(model).await?)
            }
            GatewayOperation::ListModels => OperationResult::Models(self.list_models().await),
        })
    }

    /// Upstream catalog plus enabled managed models it lacks
    async fn list_models(&self) -> Vec<ModelInfo> {
        let mut models = self.upstream.get_available_models().await;
        match self.storage.db().list_managed_models(true).await {
            Ok(managed) => {
                for entry in managed {
                    if !models.iter().any(|m| m.model == entry.model) {
                        models.push(ModelInfo::new(entry.model, entry.name));
                    }
                }
            }
            Err(e) => warn!(error = %e, "failed to load managed models"),
        }
        models
    }

    async fn ensure_model_allowed(&self, model: &str) -> Result<()> {
        if !self.config.upstream.enforce_model_allow_list {
            return Ok(());
        }
        match self.storage.db().find_managed_model(model).await? {
            Some(entry) if entry.enabled => Ok(()),
            _ => Err(GatewayError::invalid_field(
                "model",
                format!("model '{}' is not in the allow-list", model),
            )),
        }
    }

    /// Page through the audit log
    pub async fn query_logs(
        &self,
        ctx: &CallerContext,
        filters: AuditQuery,
        limit: Option<u64>,
        offset: u64,
    ) -> Result<AuditPage> {
        let payload = json!({ "filters": filters, "limit": limit, "offset": offset });
        self.gated(ctx, "query_logs", Some(payload), |_| async move {
            self.audit.query(&filters, limit, offset).await
        })
        .await
    }

    pub async fn log_stats(&self, ctx: &CallerContext) -> Result<AuditStats> {
        self.gated(ctx, "log_stats", None, |_| async move { self.audit.stats().await })
            .await
    }

    pub async fn list_managed_models(&self, ctx: &CallerContext) -> Result<Vec<ManagedModel>> {
        self.gated(ctx, "list_managed_models", None, |_| async move {
            self.storage.db().list_managed_models(false).await
        })
        .await
    }

    pub async fn upsert_managed_model(
        &self,
        ctx: &CallerContext,
        input: NewManagedModel,
    ) -> Result<ManagedModel> {
        let payload = serde_json::to_value(&input).ok();
        self.gated(ctx, "upsert_managed_model", payload, |_| async move {
            let model = input.model.trim();
            if model.is_empty() {
                return Err(GatewayError::invalid_field("model", "model is required"));
            }
            let input = NewManagedModel {
                model: model.to_string(),
                ..input
            };
            self.storage.db().upsert_managed_model(&input).await
        })
        .await
    }

    pub async fn delete_managed_model(&self, ctx: &CallerContext, model: &str) -> Result<bool> {
        let payload = json!({ "model": model });
        self.gated(ctx, "delete_managed_model", Some(payload), |_| async move {
            self.storage.db().delete_managed_model(model).await
        })
        .await
    }

    /// Spawn the periodic housekeeping: idle rate buckets every minute, and
    /// expired audit entries every `audit.prune_interval_hours`. Keys are
    /// only ever removed by an explicit delete.
    pub fn start_maintenance(self: Arc<Self>) -> JoinHandle<()> {
        self.rate_limiter.clone().start_cleanup_task();
        let interval_hours = self.config.audit.prune_interval_hours.max(1);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_hours * 3600));
            // The first tick completes immediately; startup already pruned
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = self.audit.prune_expired().await {
                    error!(error = %e, "audit pruning failed");
                }
            }
        })
    }
}
