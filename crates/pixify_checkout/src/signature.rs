// --- File: crates/pixify_checkout/src/signature.rs ---
//! Payment signature verification.
//!
//! The gateway signs `order_id|payment_id` with HMAC-SHA256 under the key
//! secret and sends the hex digest back with the client-side payment
//! result. Verifying it server-side is what proves the payment happened.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Check the gateway's payment signature. The comparison is constant-time.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    provided_hex: &str,
    secret: &str,
) -> bool {
    let expected = sign_payment(order_id, payment_id, secret);
    constant_time_eq(expected.as_bytes(), provided_hex.as_bytes())
}

/// The digest the gateway is expected to send. Exposed for tests that
/// play the gateway's role.
pub fn sign_payment(order_id: &str, payment_id: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Helper for constant-time string comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
        sign_payment(order_id, payment_id, secret)
    }

    #[test]
    fn valid_signature_accepted() {
        let sig = sign("order_1", "pay_1", "secret");
        assert!(verify_payment_signature("order_1", "pay_1", &sig, "secret"));
    }

    #[test]
    fn tampered_signature_rejected() {
        let mut sig = sign("order_1", "pay_1", "secret");
        // flip a hex digit
        let last = sig.pop().unwrap();
        sig.push(if last == '0' { '1' } else { '0' });
        assert!(!verify_payment_signature("order_1", "pay_1", &sig, "secret"));
    }

    #[test]
    fn signature_bound_to_both_ids() {
        let sig = sign("order_1", "pay_1", "secret");
        assert!(!verify_payment_signature("order_2", "pay_1", &sig, "secret"));
        assert!(!verify_payment_signature("order_1", "pay_2", &sig, "secret"));
    }

    #[test]
    fn wrong_secret_rejected() {
        let sig = sign("order_1", "pay_1", "secret");
        assert!(!verify_payment_signature("order_1", "pay_1", &sig, "other"));
    }

    #[test]
    fn non_hex_garbage_rejected() {
        assert!(!verify_payment_signature(
            "order_1",
            "pay_1",
            "definitely not a signature",
            "secret"
        ));
    }
}
