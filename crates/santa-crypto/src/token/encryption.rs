//! Pairing encryption using `XChaCha20-Poly1305`
//!
//! All functions are pure - random bytes must be provided by the caller.
//! This enables deterministic testing with a seeded environment.

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use zeroize::Zeroize;

use super::{
    derivation::{KEY_SEED_SIZE, derive_pairing_key},
    error::TokenError,
};

/// Size of the `XChaCha20` nonce (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
const POLY1305_TAG_SIZE: usize = 16;

/// Largest ciphertext accepted when opening (1 KiB)
pub const MAX_SECRET_SIZE: usize = 1024;

/// Longest partner name whose sealed form still opens
pub const MAX_PARTNER_SIZE: usize = MAX_SECRET_SIZE - POLY1305_TAG_SIZE;

/// Associated data binding every token to this format version
const TOKEN_AAD: &[u8] = b"super-secret-santa/v1";

/// A sealed pairing: everything needed to recover one partner name.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedPairing {
    /// Random seed the AEAD key is derived from
    pub seed: [u8; KEY_SEED_SIZE],
    /// The 24-byte `XChaCha20` nonce
    pub nonce: [u8; NONCE_SIZE],
    /// The ciphertext including 16-byte Poly1305 tag
    pub ciphertext: Vec<u8>,
}

impl SealedPairing {
    /// Plaintext length (ciphertext length minus authentication tag).
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(POLY1305_TAG_SIZE)
    }
}

impl std::fmt::Debug for SealedPairing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedPairing")
            .field("seed", &"<redacted>")
            .field("nonce", &self.nonce)
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

impl Drop for SealedPairing {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

/// Seal a partner name under a fresh seed and nonce.
///
/// # Security
///
/// - Caller MUST provide cryptographically secure random bytes in production
/// - Caller MUST NOT reuse a nonce within a draw
/// - Authenticated encryption prevents tampering
pub fn seal_pairing(
    partner: &str,
    seed: [u8; KEY_SEED_SIZE],
    nonce: [u8; NONCE_SIZE],
) -> SealedPairing {
    let key = derive_pairing_key(&seed);
    let cipher = XChaCha20Poly1305::new(key.key().into());
    let payload = Payload { msg: partner.as_bytes(), aad: TOKEN_AAD };

    let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(&nonce), payload) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    SealedPairing { seed, nonce, ciphertext }
}

/// Open a sealed pairing and return the partner name.
///
/// # Errors
///
/// - `SecretTooLarge`: ciphertext exceeds [`MAX_SECRET_SIZE`]
/// - `AuthenticationFailed`: tag, seed or nonce do not match (tamper)
/// - `InvalidPlaintext`: authenticated bytes are not UTF-8
pub fn open_pairing(sealed: &SealedPairing) -> Result<String, TokenError> {
    if sealed.ciphertext.len() > MAX_SECRET_SIZE {
        return Err(TokenError::SecretTooLarge {
            size: sealed.ciphertext.len(),
            max: MAX_SECRET_SIZE,
        });
    }

    let key = derive_pairing_key(&sealed.seed);
    let cipher = XChaCha20Poly1305::new(key.key().into());
    let payload = Payload { msg: sealed.ciphertext.as_slice(), aad: TOKEN_AAD };

    let plaintext = cipher
        .decrypt(XNonce::from_slice(&sealed.nonce), payload)
        .map_err(|_| TokenError::AuthenticationFailed)?;

    String::from_utf8(plaintext).map_err(|_| TokenError::InvalidPlaintext)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: [u8; KEY_SEED_SIZE] = [0x11; KEY_SEED_SIZE];
    const NONCE: [u8; NONCE_SIZE] = [0x22; NONCE_SIZE];

    #[test]
    fn seal_open_roundtrip() {
        let sealed = seal_pairing("Nicholas (the elf)", SEED, NONCE);
        let partner = open_pairing(&sealed).unwrap();

        assert_eq!(partner, "Nicholas (the elf)");
    }

    #[test]
    fn seal_open_unicode_name() {
        let sealed = seal_pairing("Aurélie", SEED, NONCE);

        assert_eq!(open_pairing(&sealed).unwrap(), "Aurélie");
    }

    #[test]
    fn ciphertext_is_larger_than_plaintext() {
        let sealed = seal_pairing("Santa", SEED, NONCE);

        assert_eq!(sealed.ciphertext.len(), "Santa".len() + POLY1305_TAG_SIZE);
        assert_eq!(sealed.plaintext_len(), "Santa".len());
    }

    #[test]
    fn different_nonces_produce_different_ciphertexts() {
        let a = seal_pairing("Santa", SEED, [0x00; NONCE_SIZE]);
        let b = seal_pairing("Santa", SEED, [0xFF; NONCE_SIZE]);

        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn wrong_seed_fails_authentication() {
        let mut sealed = seal_pairing("Santa", SEED, NONCE);
        sealed.seed[0] ^= 0x01;

        assert_eq!(open_pairing(&sealed), Err(TokenError::AuthenticationFailed));
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let mut sealed = seal_pairing("Rudolph", SEED, NONCE);
        sealed.ciphertext[0] ^= 0xFF;

        assert_eq!(open_pairing(&sealed), Err(TokenError::AuthenticationFailed));
    }

    #[test]
    fn tampered_nonce_fails_authentication() {
        let mut sealed = seal_pairing("Rudolph", SEED, NONCE);
        sealed.nonce[NONCE_SIZE - 1] ^= 0x80;

        assert_eq!(open_pairing(&sealed), Err(TokenError::AuthenticationFailed));
    }

    #[test]
    fn truncated_tag_fails_authentication() {
        let mut sealed = seal_pairing("Rudolph", SEED, NONCE);
        sealed.ciphertext.truncate(4);

        assert_eq!(open_pairing(&sealed), Err(TokenError::AuthenticationFailed));
    }

    #[test]
    fn oversized_secret_is_rejected_before_decryption() {
        let sealed =
            SealedPairing { seed: SEED, nonce: NONCE, ciphertext: vec![0u8; MAX_SECRET_SIZE + 1] };

        assert!(matches!(open_pairing(&sealed), Err(TokenError::SecretTooLarge { .. })));
    }

    #[test]
    fn longest_partner_name_still_opens() {
        let longest = "X".repeat(MAX_PARTNER_SIZE);
        let sealed = seal_pairing(&longest, SEED, NONCE);

        assert_eq!(sealed.ciphertext.len(), MAX_SECRET_SIZE);
        assert_eq!(open_pairing(&sealed).unwrap(), longest);

        let over = seal_pairing(&"X".repeat(MAX_PARTNER_SIZE + 1), SEED, NONCE);
        assert!(matches!(open_pairing(&over), Err(TokenError::SecretTooLarge { .. })));
    }

    #[test]
    fn debug_output_redacts_seed() {
        let sealed = seal_pairing("Santa", SEED, NONCE);
        let rendered = format!("{sealed:?}");

        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("17, 17"));
    }
}
