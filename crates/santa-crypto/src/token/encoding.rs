//! Text form of a sealed pairing.
//!
//! Components are URL-safe base64 without padding so they drop straight into
//! query strings. Decoding is strict: non-canonical trailing bits are
//! rejected, so every character of a component is significant.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use super::{
    derivation::KEY_SEED_SIZE,
    encryption::{MAX_SECRET_SIZE, NONCE_SIZE, SealedPairing, open_pairing},
    error::TokenError,
};

/// One participant's reveal token: `(key, nonce, secret)`.
///
/// Carries everything needed to recover the partner name. Holding the token
/// is the only requirement for reading it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretToken {
    /// base64url key seed (the key reference)
    pub key: String,
    /// base64url `XChaCha20` nonce
    pub nonce: String,
    /// base64url ciphertext with authentication tag
    pub secret: String,
}

impl SecretToken {
    /// Build a token from raw query values.
    pub fn new(key: impl Into<String>, nonce: impl Into<String>, secret: impl Into<String>) -> Self {
        Self { key: key.into(), nonce: nonce.into(), secret: secret.into() }
    }

    /// Encode a sealed pairing as text.
    pub fn from_sealed(sealed: &SealedPairing) -> Self {
        Self {
            key: URL_SAFE_NO_PAD.encode(sealed.seed),
            nonce: URL_SAFE_NO_PAD.encode(sealed.nonce),
            secret: URL_SAFE_NO_PAD.encode(&sealed.ciphertext),
        }
    }

    /// Decode the text components back into binary form.
    ///
    /// Does not authenticate; see [`SecretToken::open`].
    pub fn to_sealed(&self) -> Result<SealedPairing, TokenError> {
        let seed = decode_fixed::<KEY_SEED_SIZE>("key", &self.key)?;
        let nonce = decode_fixed::<NONCE_SIZE>("nonce", &self.nonce)?;

        let max_encoded = MAX_SECRET_SIZE.div_ceil(3) * 4;
        if self.secret.len() > max_encoded {
            return Err(TokenError::SecretTooLarge {
                size: self.secret.len() / 4 * 3,
                max: MAX_SECRET_SIZE,
            });
        }
        let ciphertext = URL_SAFE_NO_PAD
            .decode(&self.secret)
            .map_err(|_| TokenError::InvalidEncoding { component: "secret" })?;

        Ok(SealedPairing { seed, nonce, ciphertext })
    }

    /// Decode and authenticate the token, returning the partner name.
    ///
    /// All-or-nothing: either the exact sealed name comes back or an error.
    pub fn open(&self) -> Result<String, TokenError> {
        open_pairing(&self.to_sealed()?)
    }
}

fn decode_fixed<const N: usize>(
    component: &'static str,
    value: &str,
) -> Result<[u8; N], TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|_| TokenError::InvalidEncoding { component })?;

    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| TokenError::InvalidLength {
        component,
        expected: N,
        actual: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::{super::encryption::seal_pairing, *};

    fn token_for(partner: &str) -> SecretToken {
        SecretToken::from_sealed(&seal_pairing(partner, [0x5A; KEY_SEED_SIZE], [0xA5; NONCE_SIZE]))
    }

    #[test]
    fn token_roundtrip() {
        let token = token_for("Maël");

        assert_eq!(token.open().unwrap(), "Maël");
    }

    #[test]
    fn components_are_url_safe() {
        let token = token_for("Nicholas (the saint)");

        for component in [&token.key, &token.nonce, &token.secret] {
            assert!(
                component.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "component {component} must be URL safe"
            );
        }
    }

    #[test]
    fn component_lengths() {
        let token = token_for("Santa");

        // 32 bytes -> 43 chars, 24 bytes -> 32 chars
        assert_eq!(token.key.len(), 43);
        assert_eq!(token.nonce.len(), 32);
    }

    #[test]
    fn short_nonce_is_invalid_length() {
        let mut token = token_for("Santa");
        token.nonce = URL_SAFE_NO_PAD.encode([0u8; 12]);

        assert_eq!(
            token.open(),
            Err(TokenError::InvalidLength { component: "nonce", expected: 24, actual: 12 })
        );
    }

    #[test]
    fn non_base64_key_is_invalid_encoding() {
        let mut token = token_for("Santa");
        token.key = "not base64!".to_string();

        assert_eq!(token.open(), Err(TokenError::InvalidEncoding { component: "key" }));
    }

    #[test]
    fn padded_input_is_rejected() {
        let mut token = token_for("Santa");
        token.secret.push('=');

        assert_eq!(token.open(), Err(TokenError::InvalidEncoding { component: "secret" }));
    }

    #[test]
    fn empty_secret_fails_authentication() {
        let mut token = token_for("Santa");
        token.secret = String::new();

        assert_eq!(token.open(), Err(TokenError::AuthenticationFailed));
    }

    #[test]
    fn huge_secret_is_rejected_without_decoding() {
        let mut token = token_for("Santa");
        token.secret = "A".repeat(10_000);

        assert!(matches!(token.open(), Err(TokenError::SecretTooLarge { .. })));
    }

    #[test]
    fn swapped_tokens_do_not_cross_decode() {
        let a = token_for("Santa");
        let b = SecretToken::from_sealed(&seal_pairing(
            "Rudolph",
            [0x01; KEY_SEED_SIZE],
            [0x02; NONCE_SIZE],
        ));
        let mixed = SecretToken::new(a.key.clone(), a.nonce.clone(), b.secret.clone());

        assert_eq!(mixed.open(), Err(TokenError::AuthenticationFailed));
    }
}
