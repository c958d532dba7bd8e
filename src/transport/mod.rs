//! Transport to the MeshGuard gateway
//!
//! The client talks to the gateway only through the [`Transport`] trait:
//! one request in, one status and optional body out. [`HttpTransport`] is
//! the `reqwest` implementation; tests plug in an in-memory one.

mod http;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::MeshGuardResult;

pub use http::HttpTransport;
pub use reqwest::Method;

/// Action being governed
pub const HEADER_ACTION: &str = "X-MeshGuard-Action";
/// Resource the action applies to
pub const HEADER_RESOURCE: &str = "X-MeshGuard-Resource";
/// Correlation id of the issuing client
pub const HEADER_TRACE_ID: &str = "X-MeshGuard-Trace-ID";
/// Elevated credential for management endpoints
pub const HEADER_ADMIN_TOKEN: &str = "X-Admin-Token";
/// Bearer credential for the agent
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Bytes(Vec<u8>),
}

/// A request to the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Headers in insertion order; a later entry with the same name wins
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Set a header, replacing any existing value (names compare case-insensitively)
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a header value by name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter by key
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A response from the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// `None` when the response carried no content
    pub body: Option<Vec<u8>>,
}

impl TransportResponse {
    pub fn new(status: u16, body: Option<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.filter(|b| !b.is_empty()),
        }
    }

    /// A response with a JSON body
    pub fn json_body(status: u16, body: &Value) -> Self {
        Self::new(status, Some(body.to_string().into_bytes()))
    }

    /// A response without content
    pub fn empty(status: u16) -> Self {
        Self::new(status, None)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Body decoded as UTF-8, lossily
    pub fn text(&self) -> String {
        self.body
            .as_deref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }

    /// Body decoded as JSON
    pub fn json<T: DeserializeOwned>(&self) -> MeshGuardResult<T> {
        Ok(serde_json::from_slice(self.body.as_deref().unwrap_or(b"null"))?)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends requests to the gateway
///
/// Implementations do not interpret status codes; that is the resolver's job.
/// Connection-level failures are reported as `MeshGuardError::Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> MeshGuardResult<TransportResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_header_replaces() {
        let request = TransportRequest::new(Method::GET, "https://gw/proxy/check")
            .with_header("x-meshguard-action", "old")
            .with_header(HEADER_ACTION, "read:contacts");

        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("X-MESHGUARD-ACTION"), Some("read:contacts"));
        assert_eq!(request.header(HEADER_RESOURCE), None);
    }

    #[test]
    fn test_empty_body_is_none() {
        let response = TransportResponse::new(204, Some(Vec::new()));
        assert_eq!(response.body_bytes(), None);
        assert_eq!(response.text(), "");
        assert!(response.is_success());
    }

    #[test]
    fn test_json_response() {
        let response = TransportResponse::json_body(200, &json!({"items": [1, 2]}));
        let value: Value = response.json().unwrap();
        assert_eq!(value["items"], json!([1, 2]));
    }
}
