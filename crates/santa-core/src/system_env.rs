//! Production Environment implementation using the OS RNG.
//!
//! `SystemEnv` draws every byte from getrandom. Truly random, not
//! reproducible: two draws of the same roster produce different pairings and
//! different tokens.

use crate::env::Environment;

/// Production environment using cryptographic RNG.
///
/// # Security
///
/// The RNG uses getrandom which provides OS-level cryptographic randomness
/// (e.g., /dev/urandom on Linux, `BCryptGenRandom` on Windows). Suitable for
/// token seeds and nonces.
///
/// # Panics
///
/// Panics if the OS RNG fails. Issuing tokens without working randomness
/// would produce guessable keys, so there is nothing sensible to continue
/// with.
#[derive(Clone, Debug, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - tokens would be guessable");
    }
}
