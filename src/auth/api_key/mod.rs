//! API key authentication and management
//!
//! This module provides API key issuance, verification, and management functionality.

pub mod creation;
pub mod management;
pub mod types;


pub use creation::ApiKeyHandler;
