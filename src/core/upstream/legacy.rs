//! XML-RPC transport, available on every upstream version

use super::transport::{Credentials, ProtocolTransport, TransportError, status_error};
use super::types::{AuthOutcome, FieldValue, Protocol, Record, RpcCall};
use super::xmlrpc::{self, MethodResponse};
use async_trait::async_trait;
use tracing::debug;

/// Legacy protocol transport
#[derive(Debug, Clone)]
pub struct XmlRpcTransport {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl XmlRpcTransport {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    async fn call(
        &self,
        service: &str,
        method: &str,
        params: &[FieldValue],
    ) -> Result<MethodResponse, TransportError> {
        let url = format!("{}/xmlrpc/2/{}", self.base_url, service);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(xmlrpc::encode_call(method, params))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        xmlrpc::decode_response(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Faults raised when the upstream refuses the credential
fn is_access_denied(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    lowered.contains("accessdenied") || lowered.contains("access denied")
}

#[async_trait]
impl ProtocolTransport for XmlRpcTransport {
    fn protocol(&self) -> Protocol {
        Protocol::Legacy
    }

    async fn authenticate(&self) -> Result<AuthOutcome, TransportError> {
        let params = [
            FieldValue::from(self.credentials.database.as_str()),
            FieldValue::from(self.credentials.username.as_str()),
            FieldValue::from(self.credentials.secret.as_str()),
            FieldValue::Map(Record::new()),
        ];

        match self.call("common", "authenticate", &params).await? {
            MethodResponse::Success(value) => match value.as_i64() {
                Some(uid) if uid > 0 => {
                    debug!(uid, "legacy authentication succeeded");
                    Ok(AuthOutcome { uid, bearer: None })
                }
                _ => Err(TransportError::Unauthorized(
                    "invalid credentials".to_string(),
                )),
            },
            MethodResponse::Fault { code, message } => Err(TransportError::Fault { code, message }),
        }
    }

    async fn execute(
        &self,
        auth: &AuthOutcome,
        call: &RpcCall,
    ) -> Result<FieldValue, TransportError> {
        let params = [
            FieldValue::from(self.credentials.database.as_str()),
            FieldValue::Int(auth.uid),
            FieldValue::from(self.credentials.secret.as_str()),
            FieldValue::from(call.model.as_str()),
            FieldValue::from(call.method.as_str()),
            FieldValue::List(call.args.clone()),
            FieldValue::Map(call.kwargs.clone()),
        ];

        match self.call("object", "execute_kw", &params).await? {
            MethodResponse::Success(value) => Ok(value),
            MethodResponse::Fault { message, .. } if is_access_denied(&message) => {
                Err(TransportError::Unauthorized(message))
            }
            MethodResponse::Fault { code, message } => Err(TransportError::Fault { code, message }),
        }
    }
}
