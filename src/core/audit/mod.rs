//! Audit log of gated calls

mod logger;
mod types;


pub use logger::AuditLogger;
pub use types::{AuditPage, DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT};
