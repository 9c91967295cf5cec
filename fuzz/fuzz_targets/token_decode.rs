//! Fuzz target for reveal-link decoding
//!
//! # Invariants
//!
//! - Arbitrary query strings never panic
//! - Arbitrary token fields never panic and never decode
//! - A real token with any mutated byte never decodes

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use santa_core::{RevealQuery, reveal};
use santa_crypto::{KEY_SEED_SIZE, MAX_PARTNER_SIZE, NONCE_SIZE, SecretToken, seal_pairing};

#[derive(Debug, Arbitrary)]
enum Scenario {
    /// Raw query string
    Query(String),
    /// Free-form token fields
    Fields { key: String, nonce: String, secret: String },
    /// Valid token, then one ciphertext byte flipped
    Mutated {
        partner: String,
        seed: [u8; KEY_SEED_SIZE],
        nonce: [u8; NONCE_SIZE],
        position: usize,
        mask: u8,
    },
}

fuzz_target!(|scenario: Scenario| {
    match scenario {
        Scenario::Query(query) => {
            if let Ok(query) = RevealQuery::from_query(&query) {
                let _ = reveal(&query);
            }
        },
        Scenario::Fields { key, nonce, secret } => {
            let token = SecretToken::new(key, nonce, secret);
            let _ = token.open();
        },
        Scenario::Mutated { partner, seed, nonce, position, mask } => {
            if mask == 0 || partner.len() > MAX_PARTNER_SIZE {
                return;
            }
            let mut sealed = seal_pairing(&partner, seed, nonce);
            let index = position % sealed.ciphertext.len();
            sealed.ciphertext[index] ^= mask;

            let token = SecretToken::from_sealed(&sealed);
            assert!(token.open().is_err(), "mutated ciphertext must not decode");
        },
    }
});
