//! API key generation and salted hashing

use super::hmac::{constant_time_eq, create_hmac_signature};
use crate::utils::error::Result;
use rand::{Rng, RngCore, distributions::Alphanumeric};

/// Prefix carried by every issued key
pub const API_KEY_PREFIX: &str = "odgw_";

const SECRET_LENGTH: usize = 48;
const SALT_LENGTH: usize = 16;

/// Generate a new plaintext API key
pub fn generate_api_key() -> String {
    let random_part: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect();

    format!("{}{}", API_KEY_PREFIX, random_part)
}

/// Generate a record id for a stored credential
pub fn generate_key_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Hash an API key with a fresh random salt.
///
/// The stored form is `<salt-hex>$<hmac-hex>`.
pub fn hash_api_key(api_key: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = create_hmac_signature(&salt, api_key.as_bytes())?;
    Ok(format!("{}${}", hex::encode(salt), digest))
}

/// Check a presented key against a stored `<salt-hex>$<hmac-hex>` hash
pub fn verify_api_key_hash(api_key: &str, stored_hash: &str) -> Result<bool> {
    let Some((salt_hex, expected)) = stored_hash.split_once('$') else {
        return Ok(false);
    };
    let salt = hex::decode(salt_hex)?;
    let digest = create_hmac_signature(&salt, api_key.as_bytes())?;
    Ok(constant_time_eq(&digest, expected))
}

/// Non-secret hint shown in listings, e.g. `odgw_...wxyz`
pub fn display_hint(api_key: &str) -> String {
    let tail: String = {
        let chars: Vec<char> = api_key.chars().collect();
        let start = chars.len().saturating_sub(4);
        chars[start..].iter().collect()
    };
    format!("{}...{}", API_KEY_PREFIX, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_api_key_format() {
        let key = generate_api_key();
        assert!(key.starts_with("odgw_"));
        assert_eq!(key.len(), API_KEY_PREFIX.len() + SECRET_LENGTH);
        assert!(key[API_KEY_PREFIX.len()..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_api_key_uniqueness() {
        assert_ne!(generate_api_key(), generate_api_key());
    }

    #[test]
    fn test_generate_key_id() {
        let id = generate_key_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_is_salted() {
        let key = generate_api_key();
        let first = hash_api_key(&key).unwrap();
        let second = hash_api_key(&key).unwrap();
        assert_ne!(first, second);
        assert!(!first.contains(&key));

        let (salt, digest) = first.split_once('$').unwrap();
        assert_eq!(salt.len(), SALT_LENGTH * 2);
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn test_verify_api_key_hash() {
        let key = generate_api_key();
        let stored = hash_api_key(&key).unwrap();
        assert!(verify_api_key_hash(&key, &stored).unwrap());
        assert!(!verify_api_key_hash("odgw_wrong", &stored).unwrap());
    }

    #[test]
    fn test_verify_malformed_hash() {
        assert!(!verify_api_key_hash("odgw_x", "no-separator").unwrap());
        assert!(verify_api_key_hash("odgw_x", "zz$abcd").is_err());
    }

    #[test]
    fn test_display_hint() {
        assert_eq!(display_hint("odgw_abcdefghwxyz"), "odgw_...wxyz");
        assert_eq!(display_hint("ab"), "odgw_...ab");
    }
}
