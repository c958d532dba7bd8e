//! Decision resolver
//!
//! Maps a raw gateway response (status code plus optional body) to either a
//! [`Resolution`] or an error. Resolution is a pure function of its inputs:
//! no retries, no state.
//!
//! | Status | Result |
//! |--------|--------|
//! | 401 | `MeshGuardError::Authentication` |
//! | 403 | `Resolution::Deny` |
//! | 429 | `MeshGuardError::RateLimited` |
//! | other >= 400 | `MeshGuardError::RequestFailed` |
//! | anything else | `Resolution::Allow` |
//!
//! Callers pick what a deny means: the advisory path turns it into a deny
//! [`Decision`], the enforcing paths turn it into a
//! [`PolicyDenied`] error.

use serde_json::{Map, Value};

use super::model::Decision;
use crate::error::{MeshGuardError, MeshGuardResult, PolicyDenied, DEFAULT_DENY_REASON};

/// Action reported when neither the caller nor the gateway names one
const UNKNOWN_ACTION: &str = "unknown";

/// Attribution carried by a 403 body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyDetails {
    /// Action named by the gateway, if any
    pub action: Option<String>,
    pub policy: Option<String>,
    pub rule: Option<String>,
    /// Gateway message, or the default reason
    pub reason: String,
}

impl DenyDetails {
    fn from_body(body: &Value) -> Self {
        Self {
            action: string_field(body, "action"),
            policy: string_field(body, "policy"),
            rule: string_field(body, "rule"),
            reason: string_field(body, "message")
                .unwrap_or_else(|| DEFAULT_DENY_REASON.to_string()),
        }
    }

    /// Build the denial error, preferring the gateway's action name
    pub fn into_denial(self, trace_id: Option<&str>) -> PolicyDenied {
        PolicyDenied {
            action: self.action.unwrap_or_else(|| UNKNOWN_ACTION.to_string()),
            policy: self.policy,
            rule: self.rule,
            reason: self.reason,
            trace_id: trace_id.map(str::to_string),
        }
    }
}

/// Tagged outcome of resolving a response
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The request was accepted; `body` is `{}` when the response had none
    Allow { policy: Option<String>, body: Value },
    /// The gateway denied the action
    Deny(DenyDetails),
}

impl Resolution {
    pub fn is_allow(&self) -> bool {
        matches!(self, Resolution::Allow { .. })
    }

    /// Advisory view: a decision about `action`, never an error
    pub fn into_decision(self, action: &str, trace_id: &str) -> Decision {
        match self {
            Resolution::Allow { policy, .. } => Decision::allow(action, policy, trace_id),
            Resolution::Deny(details) => Decision::deny(
                action,
                details.policy,
                details.rule,
                Some(details.reason),
                trace_id,
            ),
        }
    }

    /// Escalating view: the response body, or the denial as an error
    pub fn into_body(self, trace_id: Option<&str>) -> MeshGuardResult<Value> {
        match self {
            Resolution::Allow { body, .. } => Ok(body),
            Resolution::Deny(details) => Err(details.into_denial(trace_id).into()),
        }
    }
}

/// Parse a response body as JSON, treating an absent or blank body as `{}`
pub fn parse_body(body: Option<&[u8]>) -> MeshGuardResult<Value> {
    match body {
        Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => {
            Ok(serde_json::from_slice(bytes)?)
        }
        _ => Ok(Value::Object(Map::new())),
    }
}

/// Resolve a gateway response
pub fn resolve(status: u16, body: Option<&[u8]>) -> MeshGuardResult<Resolution> {
    match status {
        401 => {
            tracing::error!("[MeshGuard] Authentication failed (401)");
            Err(MeshGuardError::Authentication(
                "Invalid or expired token".to_string(),
            ))
        }
        403 => {
            // A denial stays a denial even if its body is unreadable.
            let parsed = parse_body(body).unwrap_or_else(|e| {
                tracing::warn!("[MeshGuard] Unreadable 403 body: {}", e);
                Value::Object(Map::new())
            });
            Ok(Resolution::Deny(DenyDetails::from_body(&parsed)))
        }
        429 => {
            tracing::warn!("[MeshGuard] Rate limited (429)");
            Err(MeshGuardError::RateLimited)
        }
        s if s >= 400 => {
            let text = body
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default();
            tracing::error!("[MeshGuard] Request failed: {} - {}", s, text);
            Err(MeshGuardError::RequestFailed { status: s, body: text })
        }
        _ => {
            let parsed = parse_body(body)?;
            Ok(Resolution::Allow {
                policy: string_field(&parsed, "policy"),
                body: parsed,
            })
        }
    }
}

/// Resolve a response that is not tied to a requested action
///
/// The action is taken from the body when present, otherwise `"unknown"`.
pub fn resolve_decision(
    status: u16,
    body: Option<&[u8]>,
    trace_id: &str,
) -> MeshGuardResult<Decision> {
    let resolution = resolve(status, body)?;
    let action = match &resolution {
        Resolution::Allow { body, .. } => string_field(body, "action"),
        Resolution::Deny(details) => details.action.clone(),
    }
    .unwrap_or_else(|| UNKNOWN_ACTION.to_string());
    Ok(resolution.into_decision(&action, trace_id))
}

fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}
