//! Governed requests through the gateway proxy
//!
//! `request` forwards a call to `{gateway}/proxy/{path}` tagged with an
//! action. The gateway evaluates the action before forwarding; a denial is
//! returned as [`MeshGuardError::PolicyDenied`](crate::MeshGuardError).

use serde_json::Value;

use super::MeshGuardClient;
use crate::decision::{resolve, ActionRequest};
use crate::error::MeshGuardResult;
use crate::transport::{Method, RequestBody, TransportResponse, HEADER_ACTION};

const PROXY_PREFIX: &str = "/proxy/";

/// Extra parts of a proxied request
#[derive(Debug, Clone, Default)]
pub struct ProxyRequest {
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl ProxyRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header; MeshGuard's own headers override one with the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(RequestBody::Bytes(body.into()));
        self
    }
}

impl MeshGuardClient {
    /// Send a governed request through the proxy
    ///
    /// On success the raw response is returned for the caller to decode.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        action: &str,
        extra: ProxyRequest,
    ) -> MeshGuardResult<TransportResponse> {
        let action = ActionRequest::new(action, None)?;
        let proxy_path = format!("{}{}", PROXY_PREFIX, path.trim_start_matches('/'));
        tracing::debug!(
            "[MeshGuard] Proxy {} {} as '{}'",
            method,
            proxy_path,
            action.action()
        );

        // Caller headers first so the MeshGuard headers win.
        let mut request = self.agent_request(method, &proxy_path);
        let own_headers = std::mem::take(&mut request.headers);
        for (name, value) in extra.headers.into_iter().chain(own_headers) {
            request.set_header(name, value);
        }
        request.set_header(HEADER_ACTION, action.action());
        request.query = extra.query;
        request.body = extra.body;

        // Upstream success bodies are opaque; only error statuses are interpreted.
        let response = self.transport.send(request).await?;
        if response.status >= 400 {
            resolve(response.status, response.body_bytes())?.into_body(Some(self.trace_id()))?;
        }
        Ok(response)
    }

    pub async fn get(
        &self,
        path: &str,
        action: &str,
        extra: ProxyRequest,
    ) -> MeshGuardResult<TransportResponse> {
        self.request(Method::GET, path, action, extra).await
    }

    pub async fn post(
        &self,
        path: &str,
        action: &str,
        extra: ProxyRequest,
    ) -> MeshGuardResult<TransportResponse> {
        self.request(Method::POST, path, action, extra).await
    }

    pub async fn put(
        &self,
        path: &str,
        action: &str,
        extra: ProxyRequest,
    ) -> MeshGuardResult<TransportResponse> {
        self.request(Method::PUT, path, action, extra).await
    }

    pub async fn delete(
        &self,
        path: &str,
        action: &str,
        extra: ProxyRequest,
    ) -> MeshGuardResult<TransportResponse> {
        self.request(Method::DELETE, path, action, extra).await
    }
}
