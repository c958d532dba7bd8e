//! `reqwest` transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{RequestBody, Transport, TransportRequest, TransportResponse};
use crate::error::{MeshGuardError, MeshGuardResult};

/// HTTP transport backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> MeshGuardResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MeshGuardError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Use an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> MeshGuardResult<TransportResponse> {
        tracing::debug!("[MeshGuard] {} {}", request.method, request.url);

        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Bytes(bytes)) => builder.body(bytes),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            tracing::error!("[MeshGuard] Failed to reach gateway: {}", e);
            MeshGuardError::from(e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        tracing::debug!("[MeshGuard] Response status: {}", status);
        tracing::trace!("[MeshGuard] Response body: {}", String::from_utf8_lossy(&body));

        Ok(TransportResponse {
            headers,
            ..TransportResponse::new(status, Some(body.to_vec()))
        })
    }
}
