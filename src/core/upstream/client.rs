//! Dual-protocol upstream client

use super::legacy::XmlRpcTransport;
use super::modern::JsonTransport;
use super::session::{ActiveSession, Session, SessionSnapshot, SessionState};
use super::transport::{Credentials, ProtocolTransport, TransportError, build_http_client};
use super::types::{
    AuthOutcome, DomainTerm, FieldValue, ModelInfo, Protocol, Record, RpcCall, SearchOptions,
    UpstreamMethod, domain_value, fallback_models,
};
use crate::config::models::upstream::UpstreamConfig;
use crate::utils::error::{GatewayError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Client for the upstream object model.
///
/// Authentication happens lazily on the first call. The modern JSON protocol
/// is tried first; if the upstream turns out not to support it the client
/// switches to XML-RPC for the rest of its lifetime.
pub struct ProtocolClient {
    modern: Arc<dyn ProtocolTransport>,
    legacy: Arc<dyn ProtocolTransport>,
    session: RwLock<Session>,
    negotiation: Mutex<()>,
    timeout: Duration,
}

impl std::fmt::Debug for ProtocolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ProtocolClient {
    /// Create a client speaking HTTP to the configured upstream
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http = build_http_client(config.timeout())?;
        let credentials = Credentials::from_config(config);
        let modern = JsonTransport::new(http.clone(), config.base_url(), credentials.clone());
        let legacy = XmlRpcTransport::new(http, config.base_url(), credentials);

        Ok(Self::with_transports(
            Arc::new(modern),
            Arc::new(legacy),
            config.timeout(),
        ))
    }

    /// Create a client over arbitrary transports
    pub fn with_transports(
        modern: Arc<dyn ProtocolTransport>,
        legacy: Arc<dyn ProtocolTransport>,
        timeout: Duration,
    ) -> Self {
        Self {
            modern,
            legacy,
            session: RwLock::new(Session::new()),
            negotiation: Mutex::new(()),
            timeout,
        }
    }

    pub async fn state(&self) -> SessionState {
        self.session.read().await.state.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&*self.session.read().await)
    }

    /// Protocol of the current session, if authenticated
    pub async fn protocol(&self) -> Option<Protocol> {
        self.session.read().await.state.protocol()
    }

    pub async fn is_downgraded(&self) -> bool {
        self.session.read().await.downgraded
    }

    /// Search for record ids
    pub async fn search(&self, model: &str, options: &SearchOptions) -> Result<Vec<i64>> {
        let call = RpcCall::new(model, UpstreamMethod::Search, vec![domain_value(&options.domain)])
            .with_kwargs(options.kwargs(false));
        decode_ids(self.call(call).await?)
    }

    /// Read records by id
    pub async fn read(
        &self,
        model: &str,
        ids: &[i64],
        fields: Option<&[String]>,
    ) -> Result<Vec<Record>> {
        let mut kwargs = Record::new();
        if let Some(fields) = fields {
            kwargs.insert("fields".to_string(), FieldValue::from(fields.to_vec()));
        }
        let call = RpcCall::new(model, UpstreamMethod::Read, vec![FieldValue::from(ids.to_vec())])
            .with_kwargs(kwargs);
        decode_records(self.call(call).await?)
    }

    /// Search and read matching records in one round trip
    pub async fn search_read(&self, model: &str, options: &SearchOptions) -> Result<Vec<Record>> {
        let call = RpcCall::new(
            model,
            UpstreamMethod::SearchRead,
            vec![domain_value(&options.domain)],
        )
        .with_kwargs(options.kwargs(true));
        decode_records(self.call(call).await?)
    }

    /// Count records matching a domain
    pub async fn search_count(&self, model: &str, domain: &[DomainTerm]) -> Result<u64> {
        let call = RpcCall::new(model, UpstreamMethod::SearchCount, vec![domain_value(domain)]);
        let value = self.call(call).await?;
        value
            .as_i64()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| unexpected_shape("a count"))
    }

    /// Create one record and return its id
    pub async fn create(&self, model: &str, values: Record) -> Result<i64> {
        let call = RpcCall::new(model, UpstreamMethod::Create, vec![FieldValue::Map(values)]);
        let value = self.call(call).await?;
        // Newer upstreams answer with a list of ids even for a single record
        match &value {
            FieldValue::List(items) => items.first().and_then(FieldValue::as_i64),
            other => other.as_i64(),
        }
        .ok_or_else(|| unexpected_shape("a record id"))
    }

    /// Update records
    pub async fn write(&self, model: &str, ids: &[i64], values: Record) -> Result<bool> {
        let call = RpcCall::new(
            model,
            UpstreamMethod::Write,
            vec![FieldValue::from(ids.to_vec()), FieldValue::Map(values)],
        );
        Ok(self.call(call).await?.is_truthy())
    }

    /// Delete records
    pub async fn unlink(&self, model: &str, ids: &[i64]) -> Result<bool> {
        let call = RpcCall::new(
            model,
            UpstreamMethod::Unlink,
            vec![FieldValue::from(ids.to_vec())],
        );
        Ok(self.call(call).await?.is_truthy())
    }

    /// Field definitions of a model
    pub async fn fields_get(&self, model: &str) -> Result<Record> {
        let call = RpcCall::new(model, UpstreamMethod::FieldsGet, Vec::new());
        match self.call(call).await? {
            FieldValue::Map(fields) => Ok(fields),
            _ => Err(unexpected_shape("a field map")),
        }
    }

    /// Enumerate the upstream model catalog. Never fails.
    pub async fn get_available_models(&self) -> Vec<ModelInfo> {
        let options = SearchOptions {
            domain: vec![DomainTerm::condition("transient", "=", false)],
            fields: Some(vec!["model".to_string(), "name".to_string()]),
            order: Some("name".to_string()),
            ..Default::default()
        };

        match self.search_read("ir.model", &options).await {
            Ok(rows) => {
                let models: Vec<ModelInfo> = rows
                    .iter()
                    .filter_map(|row| {
                        let model = row.get("model")?.as_str()?;
                        let name = row.get("name").and_then(FieldValue::as_str).unwrap_or(model);
                        Some(ModelInfo::new(model, name))
                    })
                    .collect();
                if models.is_empty() {
                    warn!("upstream returned an empty model catalog, using fallback list");
                    fallback_models()
                } else {
                    models
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to enumerate upstream models, using fallback list");
                fallback_models()
            }
        }
    }

    /// Dispatch one call through the negotiated protocol
    pub async fn call(&self, call: RpcCall) -> Result<FieldValue> {
        let session = self.ensure_session().await?;

        match self.dispatch(&session, &call).await {
            Ok(value) => Ok(value),
            Err(TransportError::NotFound(message)) if session.protocol == Protocol::Modern => {
                self.downgrade(&call, &message).await;
                let legacy = self.ensure_session().await?;
                match self.dispatch(&legacy, &call).await {
                    Ok(value) => Ok(value),
                    Err(e) => Err(self.settle_failure(&legacy, e).await),
                }
            }
            Err(TransportError::Unauthorized(message)) => {
                self.invalidate(&session).await;
                if !call.method.is_read() {
                    return Err(GatewayError::upstream_call(format!(
                        "upstream rejected the session credential: {}",
                        message
                    )));
                }
                debug!(method = call.method.as_str(), "retrying read after renegotiation");
                let renewed = self.ensure_session().await?;
                match self.dispatch(&renewed, &call).await {
                    Ok(value) => Ok(value),
                    Err(e) => Err(self.settle_failure(&renewed, e).await),
                }
            }
            Err(e) => Err(classify_call_error(e)),
        }
    }

    async fn dispatch(
        &self,
        session: &ActiveSession,
        call: &RpcCall,
    ) -> std::result::Result<FieldValue, TransportError> {
        let transport = match session.protocol {
            Protocol::Modern => &self.modern,
            Protocol::Legacy => &self.legacy,
        };
        tokio::time::timeout(self.timeout, transport.execute(&session.auth, call))
            .await
            .map_err(|_| TransportError::Timeout)?
    }

    /// Switch to the legacy protocol for good
    async fn downgrade(&self, call: &RpcCall, reason: &str) {
        // Serialized with negotiation so no modern session is installed afterwards
        let _negotiating = self.negotiation.lock().await;
        if (*self.session.write().await).downgrade() {
            warn!(
                model = %call.model,
                method = call.method.as_str(),
                reason,
                "modern protocol unsupported, downgrading to legacy permanently"
            );
        }
    }

    async fn invalidate(&self, session: &ActiveSession) {
        if self.session.write().await.invalidate(session.generation) {
            info!(protocol = %session.protocol, "upstream session invalidated");
        }
    }

    /// Classify a failure after the one permitted retry
    async fn settle_failure(&self, session: &ActiveSession, err: TransportError) -> GatewayError {
        if matches!(err, TransportError::Unauthorized(_)) {
            self.invalidate(session).await;
        }
        classify_call_error(err)
    }

    /// Return the current session, negotiating one if needed
    async fn ensure_session(&self) -> Result<ActiveSession> {
        if let Some(active) = self.session.read().await.active() {
            return Ok(active);
        }

        let _negotiating = self.negotiation.lock().await;
        // Another caller may have finished negotiating while we waited
        let downgraded = {
            let session = self.session.read().await;
            if let Some(active) = session.active() {
                return Ok(active);
            }
            session.downgraded
        };

        let (protocol, outcome) = if downgraded {
            (Protocol::Legacy, self.authenticate_legacy().await?)
        } else {
            self.negotiate().await?
        };

        let active = self.session.write().await.establish(protocol, outcome);
        info!(protocol = %active.protocol, uid = active.auth.uid, "upstream session established");
        Ok(active)
    }

    async fn negotiate(&self) -> Result<(Protocol, AuthOutcome)> {
        match tokio::time::timeout(self.timeout, self.modern.authenticate()).await {
            Ok(Ok(outcome)) if outcome.bearer.is_some() => return Ok((Protocol::Modern, outcome)),
            Ok(Ok(_)) => debug!("modern authentication returned no bearer, trying legacy"),
            Ok(Err(e)) => debug!(error = %e, "modern authentication failed, trying legacy"),
            Err(_) => debug!("modern authentication timed out, trying legacy"),
        }
        Ok((Protocol::Legacy, self.authenticate_legacy().await?))
    }

    async fn authenticate_legacy(&self) -> Result<AuthOutcome> {
        match tokio::time::timeout(self.timeout, self.legacy.authenticate()).await {
            Ok(Ok(outcome)) if outcome.uid > 0 => Ok(outcome),
            Ok(Ok(_)) => Err(GatewayError::upstream_auth("invalid credentials")),
            Ok(Err(TransportError::Timeout)) | Err(_) => Err(GatewayError::upstream_timeout(
                format!("authentication did not complete within {:?}", self.timeout),
            )),
            Ok(Err(e)) => Err(GatewayError::upstream_auth(e.to_string())),
        }
    }
}

/// Map a data-call failure onto the gateway's error kinds
fn classify_call_error(err: TransportError) -> GatewayError {
    match err {
        TransportError::Timeout => GatewayError::upstream_timeout("upstream call timed out"),
        TransportError::Fault { message, .. } | TransportError::Upstream(message) => {
            GatewayError::upstream_call(message)
        }
        TransportError::Unauthorized(message) => GatewayError::upstream_call(format!(
            "upstream rejected the session credential: {}",
            message
        )),
        other => GatewayError::upstream_call(other.to_string()),
    }
}

fn unexpected_shape(expected: &str) -> GatewayError {
    GatewayError::upstream_call(format!("unexpected upstream response, expected {}", expected))
}

fn decode_ids(value: FieldValue) -> Result<Vec<i64>> {
    match value {
        FieldValue::List(items) => items
            .iter()
            .map(|item| item.as_i64().ok_or_else(|| unexpected_shape("a list of ids")))
            .collect(),
        _ => Err(unexpected_shape("a list of ids")),
    }
}

fn decode_records(value: FieldValue) -> Result<Vec<Record>> {
    match value {
        FieldValue::List(items) => items
            .into_iter()
            .map(|item| match item {
                FieldValue::Map(record) => Ok(record),
                _ => Err(unexpected_shape("a list of records")),
            })
            .collect(),
        _ => Err(unexpected_shape("a list of records")),
    }
}
