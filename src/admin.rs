//! Management operations
//!
//! These endpoints authenticate with the admin token instead of the agent
//! bearer token. Every call fails with
//! `MeshGuardError::MissingCredential(CredentialKind::Admin)` before any
//! request is sent if the client has no admin token.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::MeshGuardClient;
use crate::decision::Outcome;
use crate::error::MeshGuardResult;
use crate::transport::{Method, RequestBody};

const AGENTS_PATH: &str = "/admin/agents";
const POLICIES_PATH: &str = "/admin/policies";
const AUDIT_PATH: &str = "/admin/audit";

/// Trust tier assigned to new agents when none is given
pub const DEFAULT_TRUST_TIER: &str = "verified";
/// Audit entries returned when no limit is given
pub const DEFAULT_AUDIT_LIMIT: u32 = 50;

/// An agent identity registered with the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(rename = "trustTier")]
    pub trust_tier: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "orgId", default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

/// Parameters for registering an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAgent {
    pub name: String,
    #[serde(rename = "trustTier")]
    pub trust_tier: String,
    pub tags: Vec<String>,
}

impl NewAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trust_tier: DEFAULT_TRUST_TIER.to_string(),
            tags: Vec::new(),
        }
    }

    pub fn with_trust_tier(mut self, trust_tier: impl Into<String>) -> Self {
        self.trust_tier = trust_tier.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Filter for audit log queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditQuery {
    pub limit: u32,
    pub decision: Option<Outcome>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_AUDIT_LIMIT,
            decision: None,
        }
    }
}

#[derive(Deserialize)]
struct AgentList {
    #[serde(default)]
    agents: Vec<Agent>,
}

impl MeshGuardClient {
    /// List all registered agents
    pub async fn list_agents(&self) -> MeshGuardResult<Vec<Agent>> {
        let request = self.admin_request(Method::GET, AGENTS_PATH)?;
        let body = self.send_json(request).await?;
        let list: AgentList = serde_json::from_value(body)?;
        tracing::debug!("[MeshGuard] Listed {} agents", list.agents.len());
        Ok(list.agents)
    }

    /// Register a new agent, returning the gateway's response (including its token)
    pub async fn create_agent(&self, agent: &NewAgent) -> MeshGuardResult<Value> {
        let request = self
            .admin_request(Method::POST, AGENTS_PATH)?
            .with_body(RequestBody::Json(serde_json::to_value(agent)?));
        tracing::info!("[MeshGuard] Creating agent '{}'", agent.name);
        self.send_json(request).await
    }

    /// Revoke an agent
    pub async fn revoke_agent(&self, agent_id: &str) -> MeshGuardResult<()> {
        let path = format!("{}/{}", AGENTS_PATH, agent_id);
        let request = self.admin_request(Method::DELETE, &path)?;
        tracing::info!("[MeshGuard] Revoking agent '{}'", agent_id);
        self.send_json(request).await?;
        Ok(())
    }

    /// List all policies
    pub async fn list_policies(&self) -> MeshGuardResult<Vec<Value>> {
        let request = self.admin_request(Method::GET, POLICIES_PATH)?;
        let body = self.send_json(request).await?;
        Ok(array_field(body, "policies"))
    }

    /// Fetch audit log entries
    pub async fn audit_log(&self, query: AuditQuery) -> MeshGuardResult<Vec<Value>> {
        let mut request = self
            .admin_request(Method::GET, AUDIT_PATH)?
            .with_query("limit", query.limit.to_string());
        if let Some(decision) = query.decision {
            request = request.with_query("decision", decision.as_str());
        }
        let body = self.send_json(request).await?;
        Ok(array_field(body, "entries"))
    }
}

fn array_field(mut body: Value, key: &str) -> Vec<Value> {
    match body.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agent_wire_format() {
        let agent: Agent = serde_json::from_value(json!({
            "id": "agent-2",
            "name": "test-agent-2",
            "trustTier": "untrusted"
        }))
        .unwrap();

        assert_eq!(agent.trust_tier, "untrusted");
        assert!(agent.tags.is_empty());
        assert_eq!(agent.org_id, None);
    }

    #[test]
    fn test_new_agent_defaults() {
        let body = json!(NewAgent::new("new-agent"));
        assert_eq!(
            body,
            json!({"name": "new-agent", "trustTier": "verified", "tags": []})
        );

        let body = json!(NewAgent::new("api").with_trust_tier("trusted").with_tags(["production", "api"]));
        assert_eq!(body["trustTier"], "trusted");
        assert_eq!(body["tags"], json!(["production", "api"]));
    }

    #[test]
    fn test_array_field() {
        assert_eq!(array_field(json!({"entries": [1, 2]}), "entries").len(), 2);
        assert!(array_field(json!({}), "entries").is_empty());
        assert!(array_field(json!({"entries": null}), "entries").is_empty());
    }
}
