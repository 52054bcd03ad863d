//! # Odoo Gateway
//!
//! A gatekeeping gateway in front of an Odoo instance. Callers present an
//! API key, are admitted by a per-identity token bucket, and every gated call
//! leaves exactly one audit entry. Upstream calls go over the JSON-2 API when
//! the server offers it and fall back to XML-RPC otherwise; the fallback is
//! permanent for the life of the process.
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use odoo_gateway::{Config, server::ServerBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Some(std::path::Path::new("config/gateway.yaml"))).await?;
//!     let server = ServerBuilder::new().with_config(config).build().await?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::gateway::{CallerContext, Gateway, GatewayOperation, OperationResult};
pub use core::tools::{ToolCall, ToolResult, call_tool};
pub use core::upstream::{ProtocolClient, ProtocolTransport};
pub use utils::error::{GatewayError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Gateway build information
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    /// Unix timestamp of the build
    pub build_time: &'static str,
    pub git_hash: &'static str,
}

/// Build information stamped by the build script
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: VERSION,
        build_time: env!("BUILD_TIME"),
        git_hash: env!("GIT_HASH"),
    }
}
