//! Governed functions
//!
//! The function counterpart of [`GovernedTool`](super::GovernedTool): a
//! plain closure or `fn` that only runs once its action is enforced.
//!
//! ```ignore
//! fn fetch_contacts(query: String) -> String {
//!     contacts_db.search(&query)
//! }
//!
//! let fetch = governed_fn("read:contacts", client.clone(), fetch_contacts)
//!     .with_description("Search the contact book");
//! assert_eq!(fetch.name(), "fetch_contacts");
//!
//! let found = fetch.call("John".to_string()).await?;
//! ```
//!
//! A function that wants to see the allow decision is wrapped with
//! [`governed_fn_with_decision`], which passes it as a second argument.
//! Arguments are forwarded as a single value; use a tuple for several.

use std::sync::Arc;

use crate::client::MeshGuardClient;
use crate::decision::Decision;
use crate::error::{MeshGuardError, MeshGuardResult, PolicyDenied};

type GatedFn<A, R> = Box<dyn Fn(A, &Decision) -> R + Send + Sync>;
type DenyFn<A, R> = Box<dyn Fn(&PolicyDenied, A) -> R + Send + Sync>;

/// A function gated by MeshGuard
pub struct GovernedFn<A, R> {
    name: String,
    description: String,
    action: String,
    client: Arc<MeshGuardClient>,
    func: GatedFn<A, R>,
    on_deny: Option<DenyFn<A, R>>,
}

/// Govern a function that takes its arguments only
pub fn governed_fn<A, R, F>(
    action: impl Into<String>,
    client: Arc<MeshGuardClient>,
    func: F,
) -> GovernedFn<A, R>
where
    A: 'static,
    R: 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    let name = fn_name::<F>();
    let gated: GatedFn<A, R> = Box::new(move |args: A, _: &Decision| func(args));
    GovernedFn::build(name, action.into(), client, gated)
}

/// Govern a function that also receives the allow decision
pub fn governed_fn_with_decision<A, R, F>(
    action: impl Into<String>,
    client: Arc<MeshGuardClient>,
    func: F,
) -> GovernedFn<A, R>
where
    A: 'static,
    R: 'static,
    F: Fn(A, &Decision) -> R + Send + Sync + 'static,
{
    let name = fn_name::<F>();
    GovernedFn::build(name, action.into(), client, Box::new(func))
}

impl<A, R> GovernedFn<A, R> {
    fn build(
        name: String,
        action: String,
        client: Arc<MeshGuardClient>,
        func: GatedFn<A, R>,
    ) -> Self {
        Self {
            name,
            description: String::new(),
            action,
            client,
            func,
            on_deny: None,
        }
    }

    /// Override the name taken from the function's type
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Return the callback's result instead of failing when the action is denied
    pub fn with_on_deny<D>(mut self, handler: D) -> Self
    where
        D: Fn(&PolicyDenied, A) -> R + Send + Sync + 'static,
    {
        self.on_deny = Some(Box::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Action enforced before each call
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Enforce the action, then call the function with `args`
    pub async fn call(&self, args: A) -> MeshGuardResult<R> {
        match self.client.enforce(&self.action, None).await {
            Ok(decision) => Ok((self.func)(args, &decision)),
            Err(MeshGuardError::PolicyDenied(denied)) => match &self.on_deny {
                Some(handler) => Ok(handler(&denied, args)),
                None => Err(denied.into()),
            },
            Err(e) => Err(e),
        }
    }
}

impl<A, R> std::fmt::Debug for GovernedFn<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernedFn")
            .field("name", &self.name)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

/// Last path segment of a function's type name, without generics
fn fn_name<F>() -> String {
    let full = std::any::type_name::<F>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
