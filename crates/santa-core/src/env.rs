//! Environment abstraction for deterministic testing.
//!
//! Decouples pairing and token issuing from system randomness. Production
//! code supplies [`SystemEnv`](crate::SystemEnv) backed by the OS RNG; tests
//! supply [`SeededEnv`](crate::SeededEnv) for reproducible draws.

use rand::RngCore;

/// Abstract source of randomness.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - Production instances are seeded from a non-constant source, so repeated
///   draws of the same roster differ
/// - Methods are infallible except in exceptional circumstances (e.g., OS
///   entropy exhaustion)
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Borrow this environment as a [`rand::RngCore`].
    fn rng(&self) -> EnvRng<'_, Self> {
        EnvRng { env: self }
    }
}

/// Adapter exposing an [`Environment`] through the `rand` traits.
///
/// Lets pairing code use `rand::seq::SliceRandom` without owning an RNG.
pub struct EnvRng<'a, E: Environment> {
    env: &'a E,
}

impl<E: Environment> RngCore for EnvRng<'_, E> {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.env.random_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        self.env.random_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.env.random_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.env.random_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[derive(Clone)]
    struct ConstEnv(u8);

    impl Environment for ConstEnv {
        fn random_bytes(&self, buffer: &mut [u8]) {
            buffer.fill(self.0);
        }
    }

    #[test]
    fn random_u64_is_big_endian_of_bytes() {
        assert_eq!(ConstEnv(0x01).random_u64(), 0x0101_0101_0101_0101);
    }

    #[test]
    fn rng_adapter_draws_from_environment() {
        let env = ConstEnv(0);
        let mut rng = env.rng();

        assert_eq!(rng.next_u32(), 0);
        assert_eq!(rng.gen_range(0..10), 0);
    }
}
