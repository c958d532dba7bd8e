//! Client configuration
//!
//! Configuration is read once when a client is built and never changes
//! afterwards. [`ClientConfig::from_env`] is the only place the process
//! environment is consulted.
//!
//! ```ignore
//! // Explicit
//! let config = ClientConfig::new("https://gateway.example.com")
//!     .with_agent_token("agent-jwt")
//!     .with_timeout(Duration::from_secs(10));
//!
//! // From MESHGUARD_* environment variables
//! let config = ClientConfig::from_env()?;
//! ```

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{MeshGuardError, MeshGuardResult};

/// Gateway used when none is configured
pub const DEFAULT_GATEWAY_URL: &str = "https://dashboard.meshguard.app";
/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_GATEWAY_URL: &str = "MESHGUARD_GATEWAY_URL";
const ENV_AGENT_TOKEN: &str = "MESHGUARD_AGENT_TOKEN";
const ENV_ADMIN_TOKEN: &str = "MESHGUARD_ADMIN_TOKEN";
const ENV_TIMEOUT_SECS: &str = "MESHGUARD_TIMEOUT_SECS";
const ENV_TRACE_ID: &str = "MESHGUARD_TRACE_ID";

/// Configuration for a [`MeshGuardClient`](crate::MeshGuardClient)
#[derive(Clone)]
pub struct ClientConfig {
    gateway_url: String,
    agent_token: Option<String>,
    admin_token: Option<String>,
    timeout: Duration,
    trace_id: String,
}

impl ClientConfig {
    /// Create a configuration for a gateway with no credentials
    ///
    /// A fresh trace id is generated.
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: normalize_url(gateway_url.into()),
            agent_token: None,
            admin_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Create a configuration from environment variables
    ///
    /// Reads from:
    /// - `MESHGUARD_GATEWAY_URL` (optional, defaults to the hosted dashboard)
    /// - `MESHGUARD_AGENT_TOKEN` (optional)
    /// - `MESHGUARD_ADMIN_TOKEN` (optional)
    /// - `MESHGUARD_TIMEOUT_SECS` (optional, defaults to 30)
    /// - `MESHGUARD_TRACE_ID` (optional, defaults to a new UUID)
    pub fn from_env() -> MeshGuardResult<Self> {
        tracing::info!("Loading MeshGuard configuration from environment");

        let gateway_url = non_empty_var(ENV_GATEWAY_URL)
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());
        let mut config = Self::new(gateway_url);

        config.agent_token = non_empty_var(ENV_AGENT_TOKEN);
        config.admin_token = non_empty_var(ENV_ADMIN_TOKEN);

        if let Some(raw) = non_empty_var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|_| {
                MeshGuardError::Config(format!("{} must be whole seconds, got {:?}", ENV_TIMEOUT_SECS, raw))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(trace_id) = non_empty_var(ENV_TRACE_ID) {
            config.trace_id = trace_id;
        }

        tracing::info!("Using gateway: {}", config.gateway_url);
        tracing::debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Set the agent bearer token
    pub fn with_agent_token(mut self, token: impl Into<String>) -> Self {
        self.agent_token = Some(token.into());
        self
    }

    /// Set the admin token used by management operations
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a specific trace id instead of a generated one
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    /// Gateway base URL, without a trailing slash
    pub fn gateway_url(&self) -> &str {
        &self.gateway_url
    }

    pub fn agent_token(&self) -> Option<&str> {
        self.agent_token.as_deref()
    }

    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Correlation id attached to every request
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Build an absolute URL for a gateway path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.gateway_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY_URL)
    }
}

// Tokens never reach logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("gateway_url", &self.gateway_url)
            .field("agent_token", &self.agent_token.as_ref().map(|_| "<redacted>"))
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("trace_id", &self.trace_id)
            .finish()
    }
}

fn normalize_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config() {
        let config = ClientConfig::new("https://test.meshguard.app")
            .with_agent_token("agent")
            .with_admin_token("admin")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.gateway_url(), "https://test.meshguard.app");
        assert_eq!(config.agent_token(), Some("agent"));
        assert_eq!(config.admin_token(), Some("admin"));
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_strips_trailing_slash() {
        let config = ClientConfig::new("https://test.meshguard.app/");
        assert_eq!(config.gateway_url(), "https://test.meshguard.app");
        assert_eq!(config.url("/proxy/check"), "https://test.meshguard.app/proxy/check");
        assert_eq!(config.url("health"), "https://test.meshguard.app/health");
    }

    #[test]
    fn test_trace_id_generated_per_config() {
        let a = ClientConfig::default();
        let b = ClientConfig::default();
        assert!(!a.trace_id().is_empty());
        assert_ne!(a.trace_id(), b.trace_id());

        let custom = ClientConfig::default().with_trace_id("custom-trace-123");
        assert_eq!(custom.trace_id(), "custom-trace-123");
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.gateway_url(), DEFAULT_GATEWAY_URL);
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.agent_token(), None);
        assert_eq!(config.admin_token(), None);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = ClientConfig::default()
            .with_agent_token("secret-agent")
            .with_admin_token("secret-admin");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-agent"));
        assert!(!debug.contains("secret-admin"));
        assert!(debug.contains("<redacted>"));
    }
}
