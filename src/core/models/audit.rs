//! Audit entries and their query/aggregate shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable record of a gated call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    /// Storage-assigned row id; `None` before the entry is written
    pub id: Option<i64>,
    /// Correlation id shared with the HTTP request
    pub request_id: String,
    pub operation: String,
    /// API key id, or `ip:<addr>` for anonymous callers
    pub identity: String,
    pub api_key_id: Option<String>,
    pub owner: Option<String>,
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
    pub request_payload: Option<String>,
    pub response_status: u16,
    pub latency_ms: u64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Filters for [`AuditEntry`] queries. Time bounds are inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditQuery {
    pub api_key_id: Option<String>,
    pub identity: Option<String>,
    pub owner: Option<String>,
    /// Substring match on the operation name
    pub operation: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Responses bucketed by status class
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusBreakdown {
    pub success: u64,
    pub client_error: u64,
    pub server_error: u64,
    pub unknown: u64,
}

impl StatusBreakdown {
    /// Count one response status
    pub fn add(&mut self, status: u16) {
        self.add_count(status, 1);
    }

    /// Count `count` responses sharing one status
    pub fn add_count(&mut self, status: u16, count: u64) {
        match status {
            200..=299 => self.success += count,
            400..=499 => self.client_error += count,
            500..=599 => self.server_error += count,
            _ => self.unknown += count,
        }
    }
}

/// Aggregate view over the audit log
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditStats {
    pub total: u64,
    pub last_24h: u64,
    pub average_latency_ms: u64,
    pub by_status: StatusBreakdown,
}
