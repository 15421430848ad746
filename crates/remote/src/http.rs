//! PostgREST transport over [`reqwest`].
//!
//! Tables live under `/rest/v1/{table}` and procedures under
//! `/rest/v1/rpc/{name}`. Every request carries the `apikey` header and a
//! bearer token: the signed-in user's access token when a session exists,
//! otherwise the anon key.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::auth::SessionContext;
use crate::backend::Backend;
use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::operation::{OpKind, Operation};

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    session: Arc<SessionContext>,
}

impl HttpBackend {
    pub fn new(config: &RemoteConfig, session: Arc<SessionContext>) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, config, session))
    }

    /// Reuse an existing [`reqwest::Client`] (shares its connection pool).
    pub fn with_client(
        client: reqwest::Client,
        config: &RemoteConfig,
        session: Arc<SessionContext>,
    ) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            session,
        }
    }

    fn url_for(&self, op: &Operation) -> String {
        match op.kind {
            OpKind::Rpc => format!("{}/rest/v1/rpc/{}", self.base_url, op.target),
            _ => format!("{}/rest/v1/{}", self.base_url, op.target),
        }
    }

    fn method_for(kind: OpKind) -> Method {
        match kind {
            OpKind::Select => Method::GET,
            OpKind::Insert | OpKind::Rpc => Method::POST,
            OpKind::Update => Method::PATCH,
            OpKind::Delete => Method::DELETE,
        }
    }

    async fn read_body(op: &Operation, response: reqwest::Response) -> Result<Value, RemoteError> {
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(RemoteError::from_response(status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| RemoteError::malformed(op.label(), e))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn execute(&self, op: &Operation) -> Result<Value, RemoteError> {
        let token = self
            .session
            .access_token()
            .await
            .unwrap_or_else(|| self.api_key.clone());

        let mut request = self
            .client
            .request(Self::method_for(op.kind), self.url_for(op))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .query(&op.query_pairs());

        if op.kind.returns_representation() {
            request = request.header("Prefer", "return=representation");
        }
        if let Some(body) = &op.body {
            request = request.json(body);
        } else if op.kind == OpKind::Rpc {
            request = request.json(&serde_json::json!({}));
        }

        let response = request.send().await.map_err(transport_error)?;
        Self::read_body(op, response).await
    }
}

fn transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout { after: None }
    } else {
        RemoteError::Transport(e.to_string())
    }
}
