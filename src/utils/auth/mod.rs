//! Authentication and security utilities

pub mod crypto;

pub use crypto::*;
