//! Notary auth token derivation
//!
//! The token is a pure function of `(secret, timestamp)`: a 16-byte key is
//! derived from the shared secret via PBKDF2-SHA1 salted with the
//! character-reversed secret, then HMAC-SHA1 signs the decimal timestamp
//! string. The published token is the hex digest concatenated with that same
//! timestamp, which lets the service verify it within a short validity
//! window. Non-ASCII secrets are not normalized; behavior for them is
//! undefined.

use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;

const PBKDF2_ROUNDS: u32 = 1000;
const DERIVED_KEY_LEN: usize = 16;

/// Salt for key derivation: the secret, reversed
pub fn salt(secret: &str) -> String {
    secret.chars().rev().collect()
}

/// Derive the auth token for a given millisecond timestamp
pub fn auth_token(secret: &str, timestamp_ms: u64) -> String {
    let salt = salt(secret);
    let mut derived = [0u8; DERIVED_KEY_LEN];
    pbkdf2_hmac::<Sha1>(
        secret.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ROUNDS,
        &mut derived,
    );

    let timestamp = timestamp_ms.to_string();
    let mut mac =
        Hmac::<Sha1>::new_from_slice(&derived).expect("hmac accepts any key length");
    mac.update(timestamp.as_bytes());

    format!("{}{}", hex::encode(mac.finalize().into_bytes()), timestamp)
}

/// Derive the auth token for the current wall clock
pub fn current_auth_token(secret: &str) -> String {
    auth_token(secret, chrono::Utc::now().timestamp_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_is_reversed_secret() {
        assert_eq!(salt("A-------------Z"), "Z-------------A");
        assert_eq!(salt(""), "");
        assert_eq!(salt("abc"), "cba");
    }

    #[test]
    fn test_token_vector_numeric_secret() {
        assert_eq!(
            auth_token("111111111aaaaaA", 1484069135881),
            "878434bdf3930a412a996c8168c11a042be03ed31484069135881"
        );
    }

    #[test]
    fn test_token_vector_placeholder_secret() {
        assert_eq!(
            auth_token("A-------------Z", 1484238590217),
            "8628593d83fa61ee5538770de6e2ab98d1d40cbe1484238590217"
        );
    }

    #[test]
    fn test_token_is_deterministic() {
        let a = auth_token("some-secret", 1700000000000);
        let b = auth_token("some-secret", 1700000000000);
        assert_eq!(a, b);
        // 40 hex chars of HMAC-SHA1 plus the 13-digit timestamp
        assert_eq!(a.len(), 40 + 13);
        assert!(a.ends_with("1700000000000"));
    }

    #[test]
    fn test_token_varies_with_timestamp() {
        assert_ne!(
            auth_token("some-secret", 1700000000000),
            auth_token("some-secret", 1700000000001)
        );
    }
}
