//! Governed tool wrapper
//!
//! Wraps a host tool so that every invocation is enforced against one
//! MeshGuard action first. The input is forwarded unchanged and the tool's
//! result is returned unchanged.
//!
//! ```ignore
//! let client = Arc::new(MeshGuardClient::from_env()?);
//!
//! let search = GovernedTool::new(Arc::new(WebSearch::new()), "read:web_search", client)
//!     .with_on_deny(|denied, _input| ToolResult::error(denied.to_string()));
//!
//! let result = search.run(&json!({"query": "rust"})).await?;
//! ```

use std::sync::Arc;

use serde_json::Value;

use super::tool::{Tool, ToolResult};
use crate::client::MeshGuardClient;
use crate::error::{MeshGuardError, MeshGuardResult, PolicyDenied};

/// Callback producing a result in place of a denied tool call
///
/// Receives the denial and the original input.
pub type DenyHandler = Arc<dyn Fn(&PolicyDenied, &Value) -> ToolResult + Send + Sync>;

/// A tool whose invocations are gated by MeshGuard
#[derive(Clone)]
pub struct GovernedTool {
    tool: Arc<dyn Tool>,
    action: String,
    client: Arc<MeshGuardClient>,
    on_deny: Option<DenyHandler>,
}

impl GovernedTool {
    /// Wrap `tool` so that each call enforces `action`
    pub fn new(tool: Arc<dyn Tool>, action: impl Into<String>, client: Arc<MeshGuardClient>) -> Self {
        Self {
            tool,
            action: action.into(),
            client,
            on_deny: None,
        }
    }

    /// Return the callback's result instead of failing when the action is denied
    pub fn with_on_deny<F>(mut self, handler: F) -> Self
    where
        F: Fn(&PolicyDenied, &Value) -> ToolResult + Send + Sync + 'static,
    {
        self.on_deny = Some(Arc::new(handler));
        self
    }

    pub(crate) fn with_deny_handler(mut self, handler: Option<DenyHandler>) -> Self {
        self.on_deny = handler;
        self
    }

    /// Name of the wrapped tool
    pub fn name(&self) -> &str {
        self.tool.name()
    }

    /// Description of the wrapped tool
    pub fn description(&self) -> &str {
        self.tool.description()
    }

    /// Action enforced before each call
    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn inner(&self) -> &Arc<dyn Tool> {
        &self.tool
    }

    /// Enforce the action, then run the tool's synchronous invocation
    pub async fn run(&self, input: &Value) -> MeshGuardResult<ToolResult> {
        if let Some(substitute) = self.gate(input).await? {
            return Ok(substitute);
        }
        tracing::debug!("[MeshGuard] Running tool '{}'", self.name());
        Ok(self.tool.run(input)?)
    }

    /// Enforce the action, then await the tool's asynchronous invocation
    ///
    /// Enforcement completes before the tool future is created.
    pub async fn arun(&self, input: &Value) -> MeshGuardResult<ToolResult> {
        if let Some(substitute) = self.gate(input).await? {
            return Ok(substitute);
        }
        tracing::debug!("[MeshGuard] Running tool '{}' (async)", self.name());
        Ok(self.tool.arun(input).await?)
    }

    /// `Ok(None)` to proceed, `Ok(Some(_))` when a denial was handled
    async fn gate(&self, input: &Value) -> MeshGuardResult<Option<ToolResult>> {
        match self.client.enforce(&self.action, None).await {
            Ok(_) => Ok(None),
            Err(MeshGuardError::PolicyDenied(denied)) => match &self.on_deny {
                Some(handler) => {
                    tracing::info!(
                        "[MeshGuard] Tool '{}' denied, using deny handler",
                        self.name()
                    );
                    Ok(Some(handler(&denied, input)))
                }
                None => Err(denied.into()),
            },
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for GovernedTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernedTool")
            .field("name", &self.name())
            .field("action", &self.action)
            .field("on_deny", &self.on_deny.is_some())
            .finish()
    }
}
