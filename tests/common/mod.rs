//! Shared test fixtures: an in-memory gateway transport and client builders

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use meshguard::{
    ClientConfig, MeshGuardClient, MeshGuardError, MeshGuardResult, Transport, TransportRequest,
    TransportResponse,
};
use serde_json::Value;

pub const GATEWAY_URL: &str = "https://test.meshguard.app";
pub const AGENT_TOKEN: &str = "test-agent-token-12345";
pub const ADMIN_TOKEN: &str = "test-admin-token-67890";
pub const TRACE_ID: &str = "test-trace-id";

enum Reply {
    Respond(TransportResponse),
    Unreachable(String),
}

/// Answers every request the same way and records each request
pub struct MockTransport {
    reply: Reply,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn respond(response: TransportResponse) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Respond(response),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn json(status: u16, body: Value) -> Arc<Self> {
        Self::respond(TransportResponse::json_body(status, &body))
    }

    pub fn empty(status: u16) -> Arc<Self> {
        Self::respond(TransportResponse::empty(status))
    }

    pub fn text(status: u16, body: &str) -> Arc<Self> {
        Self::respond(TransportResponse::new(status, Some(body.as_bytes().to_vec())))
    }

    pub fn unreachable(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Unreachable(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> TransportRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> MeshGuardResult<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Unreachable(message) => Err(MeshGuardError::Transport(message.clone())),
        }
    }
}

pub fn agent_config() -> ClientConfig {
    ClientConfig::new(GATEWAY_URL)
        .with_agent_token(AGENT_TOKEN)
        .with_trace_id(TRACE_ID)
}

/// Client with an agent token
pub fn agent_client(transport: Arc<MockTransport>) -> Arc<MeshGuardClient> {
    Arc::new(MeshGuardClient::with_transport(agent_config(), transport))
}

/// Client with both tokens
pub fn admin_client(transport: Arc<MockTransport>) -> Arc<MeshGuardClient> {
    let config = agent_config().with_admin_token(ADMIN_TOKEN);
    Arc::new(MeshGuardClient::with_transport(config, transport))
}
