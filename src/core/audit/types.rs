use crate::core::models::AuditEntry;
use serde::Serialize;

/// Page size used when the caller gives none
pub const DEFAULT_QUERY_LIMIT: u64 = 100;
pub const MAX_QUERY_LIMIT: u64 = 1000;

/// One page of audit entries
#[derive(Debug, Clone, Serialize)]
pub struct AuditPage {
    pub entries: Vec<AuditEntry>,
    /// Filtered count ignoring limit and offset
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}
