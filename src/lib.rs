//! MeshGuard client
//!
//! Ask a MeshGuard gateway whether an action is permitted before doing it,
//! and gate code blocks and agent tools on the answer.
//!
//! ```ignore
//! use meshguard::{MeshGuardClient, MeshGuardError};
//!
//! let client = MeshGuardClient::from_env()?;
//!
//! // Advisory
//! let decision = client.check("read:contacts", None).await?;
//!
//! // Blocking
//! match client.enforce("delete:database", None).await {
//!     Ok(_) => drop_tables().await,
//!     Err(MeshGuardError::PolicyDenied(denied)) => eprintln!("{}", denied),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

pub mod admin;
pub mod cli;
pub mod client;
pub mod config;
pub mod decision;
pub mod error;
pub mod logging;
pub mod tools;
pub mod transport;

pub use admin::{Agent, AuditQuery, NewAgent};
pub use client::{Governed, GovernedScope, MeshGuardClient, ProxyRequest};
pub use config::ClientConfig;
pub use decision::{ActionRequest, Decision, Outcome};
pub use error::{CredentialKind, MeshGuardError, MeshGuardResult, PolicyDenied};
pub use tools::{
    governed_fn, governed_fn_with_decision, GovernedFn, GovernedTool, GovernedToolkit, Tool,
    ToolResult,
};
pub use transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
