//! Scripted upstream transport

use async_trait::async_trait;
use odoo_gateway::core::upstream::{
    AuthOutcome, FieldValue, Protocol, ProtocolTransport, RpcCall, TransportError,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

type Answer = dyn Fn(&RpcCall) -> Result<FieldValue, TransportError> + Send + Sync;

/// Transport that answers from a closure and records every call
pub struct ScriptedUpstream {
    protocol: Protocol,
    auth: Result<AuthOutcome, TransportError>,
    answer: Box<Answer>,
    auth_calls: AtomicUsize,
    calls: Mutex<Vec<RpcCall>>,
}

impl ScriptedUpstream {
    pub fn modern() -> Self {
        Self::new(
            Protocol::Modern,
            Ok(AuthOutcome {
                uid: 2,
                bearer: Some("test-token".to_string()),
            }),
        )
    }

    pub fn legacy() -> Self {
        Self::new(Protocol::Legacy, Ok(AuthOutcome { uid: 2, bearer: None }))
    }

    fn new(protocol: Protocol, auth: Result<AuthOutcome, TransportError>) -> Self {
        Self {
            protocol,
            auth,
            answer: Box::new(|_| Ok(FieldValue::List(Vec::new()))),
            auth_calls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn answering<F>(mut self, answer: F) -> Self
    where
        F: Fn(&RpcCall) -> Result<FieldValue, TransportError> + Send + Sync + 'static,
    {
        self.answer = Box::new(answer);
        self
    }

    /// Every data call fails with the "endpoint not found" signal
    pub fn without_json_api(self) -> Self {
        self.answering(|call| {
            Err(TransportError::NotFound(format!(
                "/json/2/{}/{}",
                call.model,
                call.method.as_str()
            )))
        })
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn exec_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RpcCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProtocolTransport for ScriptedUpstream {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    async fn authenticate(&self) -> Result<AuthOutcome, TransportError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        self.auth.clone()
    }

    async fn execute(
        &self,
        _auth: &AuthOutcome,
        call: &RpcCall,
    ) -> Result<FieldValue, TransportError> {
        self.calls.lock().unwrap().push(call.clone());
        (self.answer)(call)
    }
}
