//! Core data models for the Gateway
//!
//! Domain records persisted by the storage layer.

pub mod api_key;
pub mod audit;
pub mod managed_model;

pub use api_key::ApiKeyRecord;
pub use audit::{AuditEntry, AuditQuery, AuditStats, StatusBreakdown};
pub use managed_model::{ManagedModel, NewManagedModel};
