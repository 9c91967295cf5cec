//! Secret Santa Cryptographic Primitives
//!
//! Cryptographic building blocks for reveal tokens. Pure functions with
//! deterministic outputs. Callers provide random bytes for deterministic
//! testing.
//!
//! # Key Lifecycle
//!
//! Every participant's pairing is sealed under its own key. A fresh random
//! seed is drawn per token, expanded with HKDF into the AEAD key, and then
//! travels inside the token so the reveal side can rebuild the key without
//! any stored state.
//!
//! ```text
//! Random Seed (per token)
//!        │
//!        ▼
//! HKDF → Pairing Key
//!        │
//!        ▼
//! AEAD Encryption (fresh nonce) → Ciphertext
//!        │
//!        ▼
//! base64url → (key, nonce, secret) query values
//! ```
//!
//! # Security
//!
//! Isolation:
//! - Each token has an independent seed and nonce
//! - Holding any set of tokens reveals nothing about a token you don't hold
//! - Nonces never repeat under a key because keys are never reused
//!
//! Authenticity:
//! - XChaCha20-Poly1305 AEAD provides tamper-proof encryption
//! - Associated data binds the token format version
//! - Failed authentication tag -> reject token, no partial plaintext
//!
//! Confidentiality is deliberately link-scoped: whoever holds a token can
//! read it. There is no notion of who is allowed to open a link.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod token;

pub use token::{
    KEY_SEED_SIZE, MAX_PARTNER_SIZE, MAX_SECRET_SIZE, NONCE_SIZE, PairingKey, SealedPairing,
    SecretToken, TokenError, derive_pairing_key, open_pairing, seal_pairing,
};
