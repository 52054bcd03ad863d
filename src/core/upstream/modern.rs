//! JSON transport for upstream versions that expose the `/json/2` API

use super::transport::{Credentials, ProtocolTransport, TransportError, status_error};
use super::types::{AuthOutcome, FieldValue, Protocol, RpcCall};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

/// Modern protocol transport
#[derive(Debug, Clone)]
pub struct JsonTransport {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl JsonTransport {
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

    async fn post(
        &self,
        url: &str,
        body: &Value,
        bearer: Option<&str>,
    ) -> Result<Value, TransportError> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Pull the upstream's error message out of a JSON body, if it carries one
fn error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    if error.is_null() {
        return None;
    }
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .unwrap_or("upstream reported an error");
    Some(message.to_string())
}

#[async_trait]
impl ProtocolTransport for JsonTransport {
    fn protocol(&self) -> Protocol {
        Protocol::Modern
    }

    async fn authenticate(&self) -> Result<AuthOutcome, TransportError> {
        let url = format!("{}/json/2/auth", self.base_url);
        let body = json!({
            "db": self.credentials.database,
            "login": self.credentials.username,
            "password": self.credentials.secret,
        });

        let response = self.post(&url, &body, None).await?;
        if let Some(message) = error_message(&response) {
            return Err(TransportError::Unauthorized(message));
        }

        let token = response
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TransportError::Decode("response carries no access token".to_string()))?;
        let uid = response
            .get("uid")
            .and_then(Value::as_i64)
            .filter(|uid| *uid > 0)
            .ok_or_else(|| TransportError::Decode("response carries no valid uid".to_string()))?;

        debug!(uid, "modern authentication succeeded");
        Ok(AuthOutcome {
            uid,
            bearer: Some(token.to_string()),
        })
    }

    async fn execute(
        &self,
        auth: &AuthOutcome,
        call: &RpcCall,
    ) -> Result<FieldValue, TransportError> {
        let bearer = auth
            .bearer
            .as_deref()
            .ok_or_else(|| TransportError::Unauthorized("no bearer credential".to_string()))?;

        let url = format!(
            "{}/json/2/{}/{}",
            self.base_url,
            call.model,
            call.method.as_str()
        );
        let args: Vec<Value> = call.args.iter().cloned().map(Value::from).collect();
        let kwargs = Value::from(FieldValue::Map(call.kwargs.clone()));
        let body = json!({ "args": args, "kwargs": kwargs });

        let mut response = self.post(&url, &body, Some(bearer)).await?;
        if let Some(message) = error_message(&response) {
            return Err(TransportError::Upstream(message));
        }

        match response.get_mut("result") {
            Some(result) => Ok(FieldValue::from(result.take())),
            None => Ok(FieldValue::from(response)),
        }
    }
}
