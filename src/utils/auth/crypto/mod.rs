//! Cryptographic utilities for the Gateway
//!
//! API key generation, salted key hashing and constant-time comparison.

pub mod hmac;
pub mod keys;

pub use self::hmac::{constant_time_eq, create_hmac_signature};
pub use keys::{
    API_KEY_PREFIX, display_hint, generate_api_key, generate_key_id, hash_api_key,
    verify_api_key_hash,
};
