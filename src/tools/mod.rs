//! Tool governance
//!
//! This module provides the Tool trait that host frameworks implement and
//! the wrappers that gate each tool call on a MeshGuard action.

mod function;
mod governed;
mod tool;
mod toolkit;

pub use function::{governed_fn, governed_fn_with_decision, GovernedFn};
pub use governed::{DenyHandler, GovernedTool};
pub use tool::{Tool, ToolResult, ToolResultData};
pub use toolkit::{GovernedToolkit, DEFAULT_TOOL_ACTION};
