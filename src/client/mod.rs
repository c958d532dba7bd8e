//! MeshGuard client
//!
//! The client asks the gateway whether an action is permitted. It offers
//! three levels of strictness:
//!
//! - [`MeshGuardClient::check`] returns a [`Decision`] either way (advisory)
//! - [`MeshGuardClient::enforce`] returns the decision or fails with
//!   [`MeshGuardError::PolicyDenied`]
//! - [`MeshGuardClient::govern`] runs a block only if `enforce` succeeds
//!
//! ```ignore
//! let client = MeshGuardClient::from_env()?;
//!
//! let decision = client.check("read:contacts", None).await?;
//! if decision.allowed {
//!     // proceed
//! }
//!
//! let contacts = client
//!     .govern("read:contacts", None)
//!     .run(|_decision| async { fetch_contacts().await })
//!     .await?;
//! ```
//!
//! The client holds no mutable state beyond its configuration, so one
//! instance can serve concurrent calls.

mod govern;
mod proxy;

use std::sync::Arc;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::decision::{resolve, ActionRequest, Decision, Resolution};
use crate::error::{CredentialKind, MeshGuardError, MeshGuardResult};
use crate::transport::{
    HttpTransport, Method, Transport, TransportRequest, TransportResponse, HEADER_ACTION,
    HEADER_ADMIN_TOKEN, HEADER_AUTHORIZATION, HEADER_RESOURCE, HEADER_TRACE_ID,
};

pub use govern::{Governed, GovernedScope};
pub use proxy::ProxyRequest;

const CHECK_PATH: &str = "/proxy/check";
const HEALTH_PATH: &str = "/health";

/// Client for the MeshGuard gateway
#[derive(Clone)]
pub struct MeshGuardClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl MeshGuardClient {
    /// Create a client that talks HTTP to the configured gateway
    pub fn new(config: ClientConfig) -> MeshGuardResult<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client from `MESHGUARD_*` environment variables
    pub fn from_env() -> MeshGuardResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client with a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        tracing::info!(
            "MeshGuard client ready (gateway: {}, trace id: {})",
            config.gateway_url(),
            config.trace_id()
        );
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Correlation id sent with every request from this client
    pub fn trace_id(&self) -> &str {
        self.config.trace_id()
    }

    /// Start a request carrying the trace id and, if configured, the agent token
    pub(crate) fn agent_request(&self, method: Method, path: &str) -> TransportRequest {
        let mut request = self.bare_request(method, path);
        if let Some(token) = self.config.agent_token() {
            request.set_header(HEADER_AUTHORIZATION, format!("Bearer {}", token));
        }
        request
    }

    /// Start a request authenticated with the admin token
    ///
    /// Fails before touching the network when no admin token is configured.
    pub(crate) fn admin_request(
        &self,
        method: Method,
        path: &str,
    ) -> MeshGuardResult<TransportRequest> {
        let token = self
            .config
            .admin_token()
            .ok_or(MeshGuardError::MissingCredential(CredentialKind::Admin))?;

        Ok(self
            .bare_request(method, path)
            .with_header(HEADER_ADMIN_TOKEN, token))
    }

    fn bare_request(&self, method: Method, path: &str) -> TransportRequest {
        TransportRequest::new(method, self.config.url(path))
            .with_header(HEADER_TRACE_ID, self.config.trace_id())
    }

    /// Send a request and resolve its response
    pub(crate) async fn send_resolved(
        &self,
        request: TransportRequest,
    ) -> MeshGuardResult<(Resolution, TransportResponse)> {
        let response = self.transport.send(request).await?;
        let resolution = resolve(response.status, response.body_bytes())?;
        Ok((resolution, response))
    }

    /// Send a request and return its JSON body, escalating a deny
    pub(crate) async fn send_json(&self, request: TransportRequest) -> MeshGuardResult<Value> {
        let (resolution, _) = self.send_resolved(request).await?;
        resolution.into_body(Some(self.trace_id()))
    }

    // ========================================================================
    // Core governance
    // ========================================================================

    /// Ask whether an action is allowed
    ///
    /// A policy denial comes back as a deny [`Decision`]. Authentication
    /// failures, rate limiting and other request failures are errors.
    pub async fn check(&self, action: &str, resource: Option<&str>) -> MeshGuardResult<Decision> {
        let action_request = ActionRequest::new(action, resource)?;

        let mut request = self
            .agent_request(Method::GET, CHECK_PATH)
            .with_header(HEADER_ACTION, action_request.action());
        if let Some(resource) = action_request.resource() {
            request.set_header(HEADER_RESOURCE, resource);
        }

        tracing::debug!(
            "[MeshGuard] Checking action '{}' (resource: {:?})",
            action_request.action(),
            action_request.resource()
        );

        let (resolution, _) = self.send_resolved(request).await?;
        let decision = resolution.into_decision(action_request.action(), self.trace_id());

        if decision.allowed {
            tracing::info!(
                "[MeshGuard] Allowed '{}' (policy: {:?})",
                decision.action,
                decision.policy
            );
        } else {
            tracing::warn!(
                "[MeshGuard] Denied '{}' (policy: {:?}, rule: {:?}): {}",
                decision.action,
                decision.policy,
                decision.rule,
                decision.reason.as_deref().unwrap_or_default()
            );
        }

        Ok(decision)
    }

    /// Require that an action is allowed
    ///
    /// Returns the allow decision, or [`MeshGuardError::PolicyDenied`] with
    /// the same attribution `check` would have reported.
    pub async fn enforce(&self, action: &str, resource: Option<&str>) -> MeshGuardResult<Decision> {
        self.check(action, resource).await?.into_enforced()
    }

    /// Prepare a governed block for an action
    ///
    /// Nothing is sent until the returned handle is entered or run.
    pub fn govern(&self, action: &str, resource: Option<&str>) -> Governed<'_> {
        Governed::new(self, action, resource)
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Fetch the gateway's health report
    pub async fn health(&self) -> MeshGuardResult<Value> {
        let request = self.bare_request(Method::GET, HEALTH_PATH);
        let response = self.transport.send(request).await?;
        response.json()
    }

    /// Whether the gateway reports itself healthy; any failure counts as unhealthy
    pub async fn is_healthy(&self) -> bool {
        match self.health().await {
            Ok(health) => health.get("status").and_then(Value::as_str) == Some("healthy"),
            Err(e) => {
                tracing::warn!("[MeshGuard] Health check failed: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Debug for MeshGuardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshGuardClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
