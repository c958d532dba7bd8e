//! Governed blocks
//!
//! A [`Governed`] handle gates a block of code on `enforce`. If the gateway
//! denies the action, the block never starts and the denial is returned
//! unchanged. Leaving the block releases nothing: what is guarded is
//! control flow, not a resource.

use std::future::Future;
use std::ops::Deref;

use super::MeshGuardClient;
use crate::decision::Decision;
use crate::error::MeshGuardResult;

/// A not-yet-entered governed block
#[derive(Debug)]
pub struct Governed<'a> {
    client: &'a MeshGuardClient,
    action: String,
    resource: Option<String>,
}

impl<'a> Governed<'a> {
    pub(super) fn new(client: &'a MeshGuardClient, action: &str, resource: Option<&str>) -> Self {
        Self {
            client,
            action: action.to_string(),
            resource: resource.map(str::to_string),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Enforce the action and hand back the scope
    pub async fn enter(self) -> MeshGuardResult<GovernedScope> {
        let decision = self
            .client
            .enforce(&self.action, self.resource.as_deref())
            .await?;
        Ok(GovernedScope { decision })
    }

    /// Enforce the action, then run `body` with the allow decision
    ///
    /// `body` is not called at all when enforcement fails.
    pub async fn run<F, Fut, T>(self, body: F) -> MeshGuardResult<T>
    where
        F: FnOnce(Decision) -> Fut,
        Fut: Future<Output = T>,
    {
        let scope = self.enter().await?;
        Ok(body(scope.into_decision()).await)
    }
}

/// An entered governed block, holding the allow decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernedScope {
    decision: Decision,
}

impl GovernedScope {
    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    pub fn into_decision(self) -> Decision {
        self.decision
    }
}

impl Deref for GovernedScope {
    type Target = Decision;

    fn deref(&self) -> &Decision {
        &self.decision
    }
}
