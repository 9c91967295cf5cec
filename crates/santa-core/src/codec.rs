//! Secret codec: assignment in, one reveal token per giver out.
//!
//! Encoding draws a fresh key seed and nonce from the environment for every
//! token. Decoding needs nothing but the token, so a link opened months later
//! on another machine reveals the same name.

use std::collections::HashSet;

use santa_crypto::{KEY_SEED_SIZE, NONCE_SIZE, SecretToken, TokenError, seal_pairing};
use serde::Serialize;
use thiserror::Error;

use crate::{env::Environment, pairing::Assignment, roster::Roster};

/// Times a token is re-drawn if its nonce repeats within a draw
const MAX_NONCE_DRAWS: usize = 3;

/// Errors from issuing tokens for a whole assignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssueError {
    /// The environment kept returning a nonce already used in this draw
    #[error("nonce repeated {draws} times in a row; randomness source is broken")]
    NonceReuse {
        /// Consecutive repeated draws
        draws: usize,
    },

    /// Assignment was not produced for this roster, or breaks its constraints
    #[error("assignment does not match roster ({assignment} pairs, {roster} participants)")]
    RosterMismatch {
        /// Pairs in the assignment
        assignment: usize,
        /// Participants in the roster
        roster: usize,
    },
}

/// A giver and the token revealing their receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    /// Canonical identity of the giver (the link owner)
    pub giver: String,
    /// Token sealing the receiver's identity
    pub token: SecretToken,
}

/// Encodes partner names into reveal tokens.
pub struct SecretCodec<E: Environment> {
    env: E,
}

impl<E: Environment> SecretCodec<E> {
    /// Create a codec drawing seeds and nonces from `env`.
    pub fn new(env: E) -> Self {
        Self { env }
    }

    /// Seal `partner` under a fresh key seed and nonce.
    pub fn encode(&self, partner: &str) -> SecretToken {
        let mut seed = [0u8; KEY_SEED_SIZE];
        let mut nonce = [0u8; NONCE_SIZE];
        self.env.random_bytes(&mut seed);
        self.env.random_bytes(&mut nonce);

        SecretToken::from_sealed(&seal_pairing(partner, seed, nonce))
    }

    /// Issue one token per giver, in roster order.
    ///
    /// The assignment must satisfy `roster`. Every nonce in the result is
    /// distinct.
    pub fn issue(
        &self,
        roster: &Roster,
        assignment: &Assignment,
    ) -> Result<Vec<IssuedToken>, IssueError> {
        if !assignment.satisfies(roster) {
            return Err(IssueError::RosterMismatch {
                assignment: assignment.len(),
                roster: roster.len(),
            });
        }

        let mut nonces = HashSet::with_capacity(roster.len());
        let mut issued = Vec::with_capacity(roster.len());

        for (giver, receiver) in assignment.iter() {
            let partner = roster.identity(receiver);
            let mut draws = 0;
            let token = loop {
                let token = self.encode(partner);
                draws += 1;
                if nonces.insert(token.nonce.clone()) {
                    break token;
                }
                if draws >= MAX_NONCE_DRAWS {
                    return Err(IssueError::NonceReuse { draws });
                }
            };

            issued.push(IssuedToken { giver: roster.identity(giver).to_string(), token });
        }

        tracing::debug!(tokens = issued.len(), "issued reveal tokens");
        Ok(issued)
    }
}

/// Open a token and return the partner name.
///
/// Pure: needs no environment and no state from the draw that issued it.
pub fn decode(token: &SecretToken) -> Result<String, TokenError> {
    token.open()
}
