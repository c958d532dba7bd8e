//! Governed toolkit
//!
//! Wraps a whole set of host tools at once. Each tool is mapped to an
//! action by name; unmapped tools get the default action.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::governed::{DenyHandler, GovernedTool};
use super::tool::{Tool, ToolResult};
use crate::client::MeshGuardClient;
use crate::error::PolicyDenied;

/// Action for tools missing from the action map
pub const DEFAULT_TOOL_ACTION: &str = "execute:tool";

/// A set of tools governed by one client
pub struct GovernedToolkit {
    tools: Vec<Arc<dyn Tool>>,
    client: Arc<MeshGuardClient>,
    action_map: HashMap<String, String>,
    default_action: String,
    on_deny: Option<DenyHandler>,
}

impl GovernedToolkit {
    /// Create a toolkit where every tool uses the default action
    pub fn new(tools: Vec<Arc<dyn Tool>>, client: Arc<MeshGuardClient>) -> Self {
        Self {
            tools,
            client,
            action_map: HashMap::new(),
            default_action: DEFAULT_TOOL_ACTION.to_string(),
            on_deny: None,
        }
    }

    /// Replace the tool-name to action map
    pub fn with_action_map(mut self, action_map: HashMap<String, String>) -> Self {
        self.action_map = action_map;
        self
    }

    /// Map one tool name to an action
    pub fn map_action(mut self, tool_name: impl Into<String>, action: impl Into<String>) -> Self {
        self.action_map.insert(tool_name.into(), action.into());
        self
    }

    /// Set the action used for unmapped tools
    pub fn with_default_action(mut self, action: impl Into<String>) -> Self {
        self.default_action = action.into();
        self
    }

    /// Deny callback shared by every governed tool
    pub fn with_on_deny<F>(mut self, handler: F) -> Self
    where
        F: Fn(&PolicyDenied, &Value) -> ToolResult + Send + Sync + 'static,
    {
        self.on_deny = Some(Arc::new(handler));
        self
    }

    /// Action a tool will be governed with
    pub fn get_action(&self, tool: &dyn Tool) -> &str {
        self.action_map
            .get(tool.name())
            .map(String::as_str)
            .unwrap_or(&self.default_action)
    }

    /// One governed wrapper per tool, in input order
    pub fn get_tools(&self) -> Vec<GovernedTool> {
        self.tools
            .iter()
            .map(|tool| {
                let action = self.get_action(tool.as_ref()).to_string();
                tracing::debug!("[MeshGuard] Governing tool '{}' as '{}'", tool.name(), action);
                GovernedTool::new(tool.clone(), action, self.client.clone())
                    .with_deny_handler(self.on_deny.clone())
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
