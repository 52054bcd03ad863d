//! Common test utilities
//!
//! - In-memory SQLite storage
//! - Scripted upstream transports
//! - Fixtures for configuration and API keys

pub mod database;
pub mod fixtures;
pub mod upstream;

pub use database::test_storage;
pub use fixtures::{TestGateway, issue_key, open_config};
pub use upstream::ScriptedUpstream;

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err and return the error
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
