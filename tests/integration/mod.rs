//! Integration tests
//!
//! These tests drive assembled components through their public API.

pub mod config_tests;
pub mod gateway_tests;
pub mod http_tests;
pub mod protocol_tests;
