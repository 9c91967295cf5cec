//! Secret Santa core.
//!
//! Turns free-text instructions into a constrained random pairing and seals
//! each participant's result in a token only their link can open.
//!
//! # Architecture
//!
//! ```text
//! instructions ──▶ parse_instructions ──▶ Roster
//!                                           │
//!                                           ▼
//!                         PairingEngine::generate ──▶ Assignment
//!                                                         │
//!                                                         ▼
//!                                   SecretCodec::issue ──▶ SecretToken per giver
//!                                                         │
//!                                                         ▼
//!                                                  reveal_link ──▶ URL
//!
//! URL ──▶ RevealQuery ──▶ reveal ──▶ partner name
//! ```
//!
//! Everything here is synchronous and free of I/O. Randomness is injected
//! through [`Environment`]: [`SystemEnv`] in production, [`SeededEnv`] for
//! reproducible tests. The reveal path needs no environment at all.
//!
//! # Components
//!
//! - [`parse_instructions`]: line-based instruction grammar
//! - [`PairingEngine`]: bounded randomized search with an exact fallback
//! - [`SecretCodec`]: per-token key and nonce, authenticated encryption
//! - [`reveal_link`] / [`RevealQuery`]: link layout
//! - [`SecretSanta`] / [`reveal`]: one-call draw and reveal

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod draw;
pub mod env;
pub mod error;
pub mod instructions;
pub mod link;
pub mod pairing;
pub mod roster;
mod seeded_env;
mod system_env;

pub use codec::{IssueError, IssuedToken, SecretCodec, decode};
pub use draw::{Draw, Reveal, SecretSanta, reveal};
pub use env::{EnvRng, Environment};
pub use error::{ErrorCategory, SantaError};
pub use instructions::{Constraint, ParseError, parse_instructions};
pub use link::{LinkError, REVEAL_PATH, RevealError, RevealQuery, reveal_link};
pub use pairing::{
    Assignment, ConfigError, DEFAULT_MAX_ATTEMPTS, PairingConfig, PairingEngine, PairingError,
};
pub use roster::{
    NameError, Participant, ParticipantId, ParticipantName, Roster, RosterBuilder, RosterError,
};
pub use santa_crypto::{SecretToken, TokenError};
pub use seeded_env::SeededEnv;
pub use system_env::SystemEnv;
