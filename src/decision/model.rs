//! Decision and action request types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MeshGuardError, MeshGuardResult, PolicyDenied, DEFAULT_DENY_REASON};

/// Outcome of a policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Allow,
    Deny,
}

impl Outcome {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Allow => "allow",
            Outcome::Deny => "deny",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a policy evaluation
///
/// `allowed` is true exactly when `decision` is [`Outcome::Allow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the action may proceed
    pub allowed: bool,
    /// The action that was evaluated
    pub action: String,
    /// Allow or deny
    pub decision: Outcome,
    /// Policy that produced the decision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    /// Rule within the policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Human-readable reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Correlation id of the request
    pub trace_id: String,
}

impl Decision {
    /// An allow decision
    pub fn allow(
        action: impl Into<String>,
        policy: Option<String>,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            allowed: true,
            action: action.into(),
            decision: Outcome::Allow,
            policy,
            rule: None,
            reason: None,
            trace_id: trace_id.into(),
        }
    }

    /// A deny decision
    pub fn deny(
        action: impl Into<String>,
        policy: Option<String>,
        rule: Option<String>,
        reason: Option<String>,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            allowed: false,
            action: action.into(),
            decision: Outcome::Deny,
            policy,
            rule,
            reason,
            trace_id: trace_id.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// The denial this decision represents, if it is a deny
    pub fn denial(&self) -> Option<PolicyDenied> {
        if self.allowed {
            return None;
        }
        Some(PolicyDenied {
            action: self.action.clone(),
            policy: self.policy.clone(),
            rule: self.rule.clone(),
            reason: self
                .reason
                .clone()
                .unwrap_or_else(|| DEFAULT_DENY_REASON.to_string()),
            trace_id: Some(self.trace_id.clone()),
        })
    }

    /// Turn a deny into an error, passing an allow through
    pub fn into_enforced(self) -> MeshGuardResult<Self> {
        match self.denial() {
            Some(denied) => Err(MeshGuardError::PolicyDenied(denied)),
            None => Ok(self),
        }
    }
}

/// An action to be evaluated, with an optional resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    action: String,
    resource: Option<String>,
}

impl ActionRequest {
    /// Create a request, rejecting an empty action
    pub fn new(action: impl Into<String>, resource: Option<&str>) -> MeshGuardResult<Self> {
        let action = action.into();
        if action.trim().is_empty() {
            return Err(MeshGuardError::InvalidAction(action));
        }
        Ok(Self {
            action,
            resource: resource.filter(|r| !r.is_empty()).map(str::to_string),
        })
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }
}
