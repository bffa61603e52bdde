// --- File: crates/pixify_users/src/password.rs ---
//! Salted password digests.
//!
//! Digest = hex(HMAC-SHA256(key = salt, message = password)) with a random
//! per-account salt. Verification goes through the MAC's own constant-time
//! comparison, so digest checks never leak timing.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// A freshly hashed password: store both fields on the account.
#[derive(Debug, Clone)]
pub struct HashedPassword {
    pub digest: String,
    pub salt: String,
}

/// Stateless salted-digest hasher.
pub struct PasswordHasher;

impl PasswordHasher {
    /// Hash a password under a new random salt.
    pub fn hash(password: &str) -> HashedPassword {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = Self::digest(password, &salt);
        HashedPassword { digest, salt }
    }

    /// Check a password against a stored digest and salt.
    pub fn verify(password: &str, salt: &str, stored_digest: &str) -> bool {
        let Ok(expected) = hex::decode(stored_digest) else {
            return false;
        };
        // HMAC keys of any length are accepted, so new_from_slice cannot fail
        let Ok(mut mac) = HmacSha256::new_from_slice(salt.as_bytes()) else {
            return false;
        };
        mac.update(password.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    fn digest(password: &str, salt: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(password.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hashed = PasswordHasher::hash("correct horse battery staple");
        assert!(PasswordHasher::verify(
            "correct horse battery staple",
            &hashed.salt,
            &hashed.digest
        ));
    }

    #[test]
    fn wrong_password_fails_verify() {
        let hashed = PasswordHasher::hash("correct horse battery staple");
        assert!(!PasswordHasher::verify(
            "incorrect horse",
            &hashed.salt,
            &hashed.digest
        ));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = PasswordHasher::hash("password123");
        let b = PasswordHasher::hash("password123");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn malformed_stored_digest_fails_closed() {
        assert!(!PasswordHasher::verify("anything", "salt", "not-hex"));
    }
}
