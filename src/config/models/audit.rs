//! Audit log configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Write audit entries for gated calls
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Entries older than this are pruned
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Request payloads are truncated to this many characters
    #[serde(default = "default_max_payload_chars")]
    pub max_payload_chars: usize,
    #[serde(default = "default_prune_interval_hours")]
    pub prune_interval_hours: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention_days: default_retention_days(),
            max_payload_chars: default_max_payload_chars(),
            prune_interval_hours: default_prune_interval_hours(),
        }
    }
}
