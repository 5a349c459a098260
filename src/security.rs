//! Link password hashing and verification.
//!
//! Passwords are never stored; links keep a deterministic keyed hash so the
//! verification step can recompute and compare. The contract is fixed as
//! HMAC-SHA256 with the process-wide secret as the key and the password as
//! the message, hex-encoded lowercase. No per-call salt: identical
//! `(password, secret)` pairs must always produce identical digests.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the stored hash for a link password
pub fn hash_password(password: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(password.as_bytes());
    format!("{:x}", mac.finalize().into_bytes())
}

/// Check a submitted password against a stored hash
///
/// The comparison is constant-time over the hex encodings; the observed
/// timing does not depend on where the digests first differ.
pub fn verify_password(password: &str, secret: &str, stored_hash: &str) -> bool {
    let computed = hash_password(password, secret);
    constant_time_eq(computed.as_bytes(), stored_hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let a = hash_password("secret", "K");
        let b = hash_password("secret", "K");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_is_hex_sha256_length() {
        let hash = hash_password("secret", "K");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash.to_lowercase());
    }

    #[test]
    fn test_different_passwords_diverge() {
        assert_ne!(hash_password("secret", "K"), hash_password("wrong", "K"));
    }

    #[test]
    fn test_different_secrets_diverge() {
        assert_ne!(hash_password("secret", "K1"), hash_password("secret", "K2"));
    }

    #[test]
    fn test_secret_is_the_key_not_the_message() {
        // Swapping key and message must not produce the same digest;
        // pins the HMAC orientation as part of the contract
        assert_ne!(hash_password("a", "b"), hash_password("b", "a"));
    }

    #[test]
    fn test_verify_accepts_correct_password() {
        let stored = hash_password("secret", "K");
        assert!(verify_password("secret", "K", &stored));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let stored = hash_password("secret", "K");
        assert!(!verify_password("wrong", "K", &stored));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let stored = hash_password("secret", "K");
        assert!(!verify_password("secret", "other", &stored));
    }

    #[test]
    fn test_verify_rejects_malformed_stored_hash() {
        assert!(!verify_password("secret", "K", ""));
        assert!(!verify_password("secret", "K", "not-a-digest"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
