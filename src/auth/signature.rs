//! Payment gateway signatures.
//!
//! A completed checkout is reported back as `(order_id, payment_id, signature)`
//! where `signature = hex(HMAC-SHA256(order_id + "|" + payment_id, secret))`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::auth::error::CryptResult;

type HmacSha256 = Hmac<Sha256>;

fn payment_mac(order_id: &str, payment_id: &str, secret: &[u8]) -> CryptResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret)?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(mac)
}

pub fn sign_payment<K: AsRef<[u8]>>(order_id: &str, payment_id: &str, secret: K) -> CryptResult<String> {
    let mac = payment_mac(order_id, payment_id, secret.as_ref())?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Accepts exactly the string [`sign_payment`] produces: lowercase hex, no
/// padding. Anything else, malformed hex included, is `false`.
/// The digest comparison runs in constant time.
pub fn verify_payment_signature<K: AsRef<[u8]>>(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: K,
) -> CryptResult<bool> {
    let Ok(supplied) = hex::decode(signature) else {
        return Ok(false);
    };
    // only the canonical encoding decodes back to the same string
    if hex::encode(&supplied) != signature {
        return Ok(false);
    }

    let mac = payment_mac(order_id, payment_id, secret.as_ref())?;
    Ok(mac.verify_slice(&supplied).is_ok())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sign_known_vector_test() {
        let mut mac = HmacSha256::new_from_slice(b"s").unwrap();
        mac.update(b"o1|p1");
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(sign_payment("o1", "p1", "s").unwrap(), expected);
        assert_eq!(expected.len(), 64);
    }

    #[test]
    fn verify_accepts_own_signature_test() {
        let signature = sign_payment("o1", "p1", "s").unwrap();
        assert!(verify_payment_signature("o1", "p1", &signature, "s").unwrap());
    }

    #[test]
    fn verify_rejects_other_signatures_test() {
        let signature = sign_payment("o1", "p1", "s").unwrap();

        assert!(!verify_payment_signature("o1", "p2", &signature, "s").unwrap());
        assert!(!verify_payment_signature("o2", "p1", &signature, "s").unwrap());
        assert!(!verify_payment_signature("o1", "p1", &signature, "other").unwrap());
        assert!(!verify_payment_signature("o1", "p1", "deadbeef", "s").unwrap());
        assert!(!verify_payment_signature("o1", "p1", "not hex at all", "s").unwrap());
        assert!(!verify_payment_signature("o1", "p1", "", "s").unwrap());
    }

    #[test]
    fn verify_rejects_upper_case_hex_test() {
        let signature = sign_payment("o1", "p1", "s").unwrap().to_uppercase();
        assert!(!verify_payment_signature("o1", "p1", &signature, "s").unwrap());
    }

    #[test]
    fn verify_rejects_padded_signature_test() {
        let signature = sign_payment("o1", "p1", "s").unwrap();

        assert!(!verify_payment_signature("o1", "p1", &format!("  {signature}\n"), "s").unwrap());
        assert!(!verify_payment_signature("o1", "p1", &format!("{signature} "), "s").unwrap());
        assert!(!verify_payment_signature("o1", "p1", &format!("{signature}00"), "s").unwrap());
    }
}
