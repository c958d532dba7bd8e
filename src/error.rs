//! Error types for the MeshGuard client
//!
//! Every failure the client can surface is a variant of [`MeshGuardError`].
//! Policy denials carry their attribution in [`PolicyDenied`] so that a
//! caller can explain the refusal without another round trip.

use std::fmt;

/// Default reason used when the gateway denies without a message
pub const DEFAULT_DENY_REASON: &str = "Access denied by policy";

/// Kind of credential an operation needed but the client was not given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Bearer token identifying the agent
    Agent,
    /// Elevated token for management endpoints
    Admin,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::Agent => write!(f, "Agent token"),
            CredentialKind::Admin => write!(f, "Admin token"),
        }
    }
}

/// An action was denied by policy
///
/// Raised by `enforce`, `govern` and governed proxy requests. The advisory
/// `check` path returns a deny [`Decision`](crate::Decision) instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDenied {
    /// The action that was refused
    pub action: String,
    /// Policy that produced the denial, if reported
    pub policy: Option<String>,
    /// Rule within the policy, if reported
    pub rule: Option<String>,
    /// Human-readable reason
    pub reason: String,
    /// Correlation id of the client that issued the request
    pub trace_id: Option<String>,
}

impl PolicyDenied {
    /// Create a denial for an action with the default reason
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            policy: None,
            rule: None,
            reason: DEFAULT_DENY_REASON.to_string(),
            trace_id: None,
        }
    }

    /// Set the policy that denied the action
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    /// Set the rule that denied the action
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Set the denial reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Attach the correlation id
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

impl fmt::Display for PolicyDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action '{}' denied", self.action)?;
        if let Some(ref policy) = self.policy {
            write!(f, " by policy '{}'", policy)?;
        }
        if let Some(ref rule) = self.rule {
            write!(f, " (rule: {})", rule)?;
        }
        write!(f, ": {}", self.reason)
    }
}

impl std::error::Error for PolicyDenied {}

/// Errors returned by the MeshGuard client
#[derive(Debug, thiserror::Error)]
pub enum MeshGuardError {
    /// 401 from the gateway: the credential is invalid or expired
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// 403 from the gateway, escalated
    #[error(transparent)]
    PolicyDenied(#[from] PolicyDenied),

    /// 429 from the gateway
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Any other error status
    #[error("Request failed: {status} {body}")]
    RequestFailed { status: u16, body: String },

    /// The operation needs a credential that was never configured
    #[error("{0} required for this operation")]
    MissingCredential(CredentialKind),

    /// The action identifier is not usable
    #[error("Invalid action: {0:?}")]
    InvalidAction(String),

    /// The gateway returned a body that is not valid JSON
    #[error("Invalid response body: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    /// The gateway could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// Client configuration is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The wrapped tool itself failed
    #[error(transparent)]
    Tool(#[from] anyhow::Error),
}

impl MeshGuardError {
    /// Return the denial if this error is a policy denial
    pub fn as_denial(&self) -> Option<&PolicyDenied> {
        match self {
            MeshGuardError::PolicyDenied(denied) => Some(denied),
            _ => None,
        }
    }

    /// Whether this error is a policy denial
    pub fn is_denial(&self) -> bool {
        self.as_denial().is_some()
    }
}

impl From<reqwest::Error> for MeshGuardError {
    fn from(err: reqwest::Error) -> Self {
        MeshGuardError::Transport(err.to_string())
    }
}

/// Result type for MeshGuard operations
pub type MeshGuardResult<T> = Result<T, MeshGuardError>;
