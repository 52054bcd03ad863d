//! Managed model allow-list entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An upstream model registered with the gateway
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagedModel {
    pub id: i32,
    /// Technical model name, e.g. `res.partner`
    pub model: String,
    /// Display name
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a managed model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewManagedModel {
    pub model: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}
