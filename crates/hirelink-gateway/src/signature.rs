// Payment confirmation signature verification.
//
// Razorpay signs `"<order_id>|<payment_id>"` with HMAC-SHA256 keyed by the
// API secret and sends the hex digest alongside the confirmation. A payload
// that fails this check must never credit a wallet.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::GatewayError;
use crate::types::PaymentConfirmation;

type HmacSha256 = Hmac<Sha256>;

/// Computes the hex HMAC-SHA256 signature for an order/payment pair.
///
/// Exposed so tests and sandbox tooling can produce valid confirmations.
pub fn sign_payment_payload(order_id: &str, payment_id: &str, secret: &str) -> String {
    let payload = format!("{}|{}", order_id, payment_id);
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a payment confirmation against the gateway shared secret.
///
/// The comparison runs through the MAC's constant-time `verify_slice`, so a
/// forged signature cannot be probed byte-by-byte.
pub fn verify_payment_signature(
    confirmation: &PaymentConfirmation,
    secret: &str,
) -> Result<(), GatewayError> {
    let payload = format!(
        "{}|{}",
        confirmation.razorpay_order_id, confirmation.razorpay_payment_id
    );

    let signature_bytes = hex::decode(confirmation.razorpay_signature.trim())
        .map_err(|_| GatewayError::InvalidSignature)?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature_bytes)
        .map_err(|_| GatewayError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test_secret_key";

    fn test_confirmation(signature: String) -> PaymentConfirmation {
        PaymentConfirmation {
            razorpay_order_id: "order_MkWvmPxz1azGQs".to_string(),
            razorpay_payment_id: "pay_MkWw7Qf3bzXhEJ".to_string(),
            razorpay_signature: signature,
        }
    }

    #[test]
    fn test_hmac_known_vector() {
        // RFC 4231 test case 2: key "Jefe", data "what do ya want for nothing?"
        let mut mac = HmacSha256::new_from_slice(b"Jefe").unwrap();
        mac.update(b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac.finalize().into_bytes()),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_sign_produces_64_hex_chars() {
        let signature = sign_payment_payload("order_a", "pay_b", TEST_SECRET);
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_valid_signature_verifies() {
        let signature = sign_payment_payload("order_MkWvmPxz1azGQs", "pay_MkWw7Qf3bzXhEJ", TEST_SECRET);
        let confirmation = test_confirmation(signature);
        assert!(verify_payment_signature(&confirmation, TEST_SECRET).is_ok());
    }

    #[test]
    fn test_tampered_payment_id_fails() {
        let signature = sign_payment_payload("order_MkWvmPxz1azGQs", "pay_SOMEOTHER", TEST_SECRET);
        let confirmation = test_confirmation(signature);
        assert!(matches!(
            verify_payment_signature(&confirmation, TEST_SECRET),
            Err(GatewayError::InvalidSignature)
        ));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let signature =
            sign_payment_payload("order_MkWvmPxz1azGQs", "pay_MkWw7Qf3bzXhEJ", "other_secret");
        let confirmation = test_confirmation(signature);
        assert!(matches!(
            verify_payment_signature(&confirmation, TEST_SECRET),
            Err(GatewayError::InvalidSignature)
        ));
    }

    #[test]
    fn test_non_hex_signature_fails() {
        let confirmation = test_confirmation("not hex at all".to_string());
        assert!(matches!(
            verify_payment_signature(&confirmation, TEST_SECRET),
            Err(GatewayError::InvalidSignature)
        ));
    }

    #[test]
    fn test_signature_tolerates_surrounding_whitespace() {
        let signature = sign_payment_payload("order_MkWvmPxz1azGQs", "pay_MkWw7Qf3bzXhEJ", TEST_SECRET);
        let confirmation = test_confirmation(format!("  {}\n", signature));
        assert!(verify_payment_signature(&confirmation, TEST_SECRET).is_ok());
    }
}
