//! Policy decisions
//!
//! This module holds the typed outcome of a policy query and the resolver
//! that turns a raw gateway response into one.

mod model;
mod resolver;

pub use model::{ActionRequest, Decision, Outcome};
pub use resolver::{parse_body, resolve, resolve_decision, DenyDetails, Resolution};
