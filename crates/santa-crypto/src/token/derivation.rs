//! Key derivation for reveal tokens using HKDF

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

/// Size of the random key seed carried in every token (32 bytes)
pub const KEY_SEED_SIZE: usize = 32;

/// Label used for pairing key derivation
const PAIRING_KEY_LABEL: &[u8] = b"santaPairingV1";

/// Symmetric key for a single token.
///
/// Derived from the token's seed and used for exactly one seal or open.
pub struct PairingKey {
    /// The 32-byte symmetric key for XChaCha20-Poly1305
    key: [u8; 32],
}

impl PairingKey {
    /// 32-byte symmetric key for XChaCha20-Poly1305 AEAD.
    pub fn key(&self) -> &[u8; 32] {
        &self.key
    }
}

impl Drop for PairingKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Derive the AEAD key for a token from its random seed.
///
/// The seed is the key reference placed in the link. Expanding it through
/// HKDF keeps the raw seed out of the cipher and pins the key to this token
/// format.
///
/// # Security
///
/// - Different seeds produce independent keys
/// - Deterministic: same seed always produces the same key
pub fn derive_pairing_key(seed: &[u8; KEY_SEED_SIZE]) -> PairingKey {
    let hkdf = Hkdf::<Sha256>::new(None, seed);

    let mut key = [0u8; 32];
    let Ok(()) = hkdf.expand(PAIRING_KEY_LABEL, &mut key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    PairingKey { key }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let seed = [7u8; KEY_SEED_SIZE];

        let key1 = derive_pairing_key(&seed);
        let key2 = derive_pairing_key(&seed);

        assert_eq!(key1.key(), key2.key(), "same seed must produce same key");
    }

    #[test]
    fn different_seeds_produce_different_keys() {
        let key_a = derive_pairing_key(&[0x00; KEY_SEED_SIZE]);
        let key_b = derive_pairing_key(&[0x01; KEY_SEED_SIZE]);

        assert_ne!(key_a.key(), key_b.key());
    }

    #[test]
    fn derived_key_differs_from_seed() {
        let seed = [0xAB; KEY_SEED_SIZE];
        let key = derive_pairing_key(&seed);

        assert_ne!(key.key(), &seed);
    }
}
