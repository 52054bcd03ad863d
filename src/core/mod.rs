//! Core functionality for the Gateway
//!
//! This module contains the core business logic and data structures.

pub mod audit;
pub mod gateway;
pub mod models;
pub mod rate_limiter; // Per-identity token buckets
pub mod tools;
pub mod upstream; // Dual-protocol upstream client

pub use gateway::{CallerContext, Gateway, GatewayOperation, OperationResult};
