//! Gateway orchestration
//!
//! Every gated call is authenticated, charged against the caller's rate
//! budget, dispatched and audited exactly once, whatever the outcome.

mod orchestrator;
mod types;


pub use orchestrator::Gateway;
pub use types::{CallerContext, CallerIdentity, GatewayOperation, OperationResult};
