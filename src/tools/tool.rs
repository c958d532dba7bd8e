//! Tool trait definition
//!
//! A tool is whatever the host agent framework hands us to call: a name,
//! a description, a synchronous invocation and optionally an asynchronous
//! one. MeshGuard never looks inside the input or the result.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content type for tool results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolResultData {
    /// Text content
    Text(String),
    /// Structured content
    Json(Value),
}

/// Result of executing a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The content of the tool result
    pub content: ToolResultData,
    /// Whether the tool execution resulted in an error
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result with text content
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            content: ToolResultData::Text(output.into()),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: ToolResultData::Text(message.into()),
            is_error: true,
        }
    }

    /// Create a successful structured result
    pub fn json(value: Value) -> Self {
        Self {
            content: ToolResultData::Json(value),
            is_error: false,
        }
    }

    /// Text content, if this is a text result
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            ToolResultData::Text(text) => Some(text),
            ToolResultData::Json(_) => None,
        }
    }
}

/// Trait for tools supplied by the host framework
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of this tool
    fn name(&self) -> &str;

    /// Get a description of this tool
    fn description(&self) -> &str {
        ""
    }

    /// Run the tool synchronously
    fn run(&self, input: &Value) -> Result<ToolResult>;

    /// Run the tool asynchronously
    ///
    /// Tools without a native async path fall back to [`Tool::run`].
    async fn arun(&self, input: &Value) -> Result<ToolResult> {
        self.run(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn run(&self, input: &Value) -> Result<ToolResult> {
            Ok(ToolResult::json(input.clone()))
        }
    }

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("output");
        assert_eq!(result.text(), Some("output"));
        assert!(!result.is_error);
    }

    #[test]
    fn test_tool_result_error() {
        let result = ToolResult::error("error message");
        assert_eq!(result.text(), Some("error message"));
        assert!(result.is_error);
    }

    #[test]
    fn test_tool_result_json() {
        let result = ToolResult::json(json!({"count": 3}));
        assert_eq!(result.text(), None);
        assert_eq!(result.content, ToolResultData::Json(json!({"count": 3})));
    }

    #[tokio::test]
    async fn test_arun_defaults_to_run() {
        let tool = Echo;
        assert_eq!(tool.description(), "");
        let result = tool.arun(&json!({"q": "x"})).await.unwrap();
        assert_eq!(result, ToolResult::json(json!({"q": "x"})));
    }
}
