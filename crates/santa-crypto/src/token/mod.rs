//! Reveal tokens: one sealed pairing per participant
//!
//! # Architecture
//!
//! ```text
//! Seed[32] ──HKDF──▶ PairingKey
//!                         │
//! Nonce[24] ──────────────┤
//!                         ▼
//! Partner name ──▶ XChaCha20-Poly1305 ──▶ SealedPairing
//!                                              │
//!                                              ▼ base64url
//!                                         SecretToken
//! ```
//!
//! [`SealedPairing`] is the binary form and [`SecretToken`] the text form
//! carried in links. Both directions are all-or-nothing: a token either
//! decodes to exactly the sealed name or fails with a [`TokenError`].

pub mod derivation;
pub mod encoding;
pub mod encryption;
pub mod error;

pub use derivation::{KEY_SEED_SIZE, PairingKey, derive_pairing_key};
pub use encoding::SecretToken;
pub use encryption::{
    MAX_PARTNER_SIZE, MAX_SECRET_SIZE, NONCE_SIZE, SealedPairing, open_pairing, seal_pairing,
};
pub use error::TokenError;
