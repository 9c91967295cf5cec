//! Constrained random pairing.
//!
//! # Algorithm
//!
//! 1. Commit forced pairings. Two givers forced onto the same receiver, or a
//!    forced pairing that an exclusion forbids, is a conflict and is reported
//!    immediately (never retried).
//! 2. Givers without a forced pairing are matched against the receivers
//!    nobody was forced onto. Each attempt shuffles the receiver pool and
//!    accepts it only if no pair is forbidden (self, or excluded in either
//!    direction). Accepting only fully valid shuffles makes every valid
//!    assignment equally likely.
//! 3. After [`PairingConfig::max_attempts`] rejected shuffles, an exact
//!    augmenting-path matcher over shuffled candidate lists settles the
//!    question: it finds an assignment whenever one exists.
//! 4. If neither finds one, the constraints are infeasible.
//!
//! Every step is bounded, so `generate` always terminates.

use rand::seq::SliceRandom;
use thiserror::Error;

use crate::{
    env::Environment,
    roster::{ParticipantId, Roster},
};

/// Default number of shuffles tried before the exact fallback.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 500;

/// Pairing engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingConfig {
    /// Shuffles tried before giving up on rejection sampling
    pub max_attempts: u32,
    /// Run the exact matcher once shuffles are exhausted
    pub exact_fallback: bool,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, exact_fallback: true }
    }
}

/// Invalid pairing configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Zero shuffles and no fallback can never produce a pairing
    #[error("max_attempts must be at least 1 when the exact fallback is disabled")]
    NoSearch,
}

impl PairingConfig {
    /// Check the configuration can produce pairings at all.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_attempts == 0 && !self.exact_fallback {
            return Err(ConfigError::NoSearch);
        }
        Ok(self)
    }
}

/// Errors from generating an assignment.
///
/// All of these mean the input was well-formed but cannot be satisfied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PairingError {
    /// Fewer than two participants
    #[error("at least two participants are needed, got {count}")]
    TooFewParticipants {
        /// Roster size
        count: usize,
    },

    /// Two givers forced onto the same receiver
    #[error("{first} and {second} are both forced to pair with {receiver}")]
    ForcedReceiverConflict {
        /// Contested receiver
        receiver: String,
        /// Giver declared first
        first: String,
        /// Giver declared second
        second: String,
    },

    /// A forced pairing that an exclusion forbids
    #[error("{giver} is forced to pair with {receiver}, but that pairing is excluded")]
    ForcedExcluded {
        /// Forced giver
        giver: String,
        /// Forced receiver
        receiver: String,
    },

    /// A giver has no allowed receiver left
    #[error("{giver} has nobody they are allowed to pair with")]
    NoCandidate {
        /// The stranded giver
        giver: String,
    },

    /// Search exhausted without finding an assignment
    #[error("no valid pairing found after {attempts} attempts")]
    Infeasible {
        /// Shuffles tried
        attempts: u32,
    },
}

impl PairingError {
    /// Returns true if forced pairings contradict each other or an exclusion.
    ///
    /// Conflicts are detected before any randomness is used; the rest come
    /// from the search itself.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ForcedReceiverConflict { .. } | Self::ForcedExcluded { .. })
    }
}

/// A complete pairing: giver to receiver.
///
/// Held only in memory. The draw facade turns it into tokens and drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Indexed by giver, value is receiver
    receivers: Vec<ParticipantId>,
}

impl Assignment {
    /// Receiver for `giver`.
    pub fn receiver(&self, giver: ParticipantId) -> Option<ParticipantId> {
        self.receivers.get(giver.index()).copied()
    }

    /// Giver for `receiver`.
    pub fn giver(&self, receiver: ParticipantId) -> Option<ParticipantId> {
        self.iter().find_map(|(g, r)| (r == receiver).then_some(g))
    }

    /// `(giver, receiver)` pairs in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, ParticipantId)> + '_ {
        self.receivers
            .iter()
            .enumerate()
            .map(|(giver, &receiver)| (ParticipantId::at(giver), receiver))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.receivers.len()
    }

    /// True if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }

    /// Check every invariant against `roster`.
    ///
    /// Bijection, no self-pairing, no excluded pair, every forced pairing
    /// honoured.
    pub fn satisfies(&self, roster: &Roster) -> bool {
        if self.receivers.len() != roster.len() {
            return false;
        }

        let mut received = vec![false; roster.len()];
        for (giver, receiver) in self.iter() {
            let Some(slot) = received.get_mut(receiver.index()) else {
                return false;
            };
            if *slot || roster.forbids(giver, receiver) {
                return false;
            }
            *slot = true;
        }

        roster.forced_pairs().all(|(giver, receiver)| self.receiver(giver) == Some(receiver))
    }
}

/// Generates assignments with injected randomness.
pub struct PairingEngine<E: Environment> {
    env: E,
    config: PairingConfig,
}

impl<E: Environment> PairingEngine<E> {
    /// Create an engine drawing randomness from `env`.
    pub fn new(env: E, config: PairingConfig) -> Self {
        Self { env, config }
    }

    /// Active configuration.
    pub fn config(&self) -> PairingConfig {
        self.config
    }

    /// Generate an assignment satisfying every constraint in `roster`.
    ///
    /// # Errors
    ///
    /// - `TooFewParticipants`: roster of size 0 or 1
    /// - `ForcedReceiverConflict` / `ForcedExcluded`: forced pairings clash
    /// - `NoCandidate`: some giver has no allowed receiver at all
    /// - `Infeasible`: search exhausted
    pub fn generate(&self, roster: &Roster) -> Result<Assignment, PairingError> {
        let n = roster.len();
        if n < 2 {
            return Err(PairingError::TooFewParticipants { count: n });
        }

        let mut receivers: Vec<Option<ParticipantId>> = vec![None; n];
        let mut forced_giver: Vec<Option<ParticipantId>> = vec![None; n];

        for (giver, receiver) in roster.forced_pairs() {
            if roster.forbids(giver, receiver) {
                return Err(PairingError::ForcedExcluded {
                    giver: roster.identity(giver).to_string(),
                    receiver: roster.identity(receiver).to_string(),
                });
            }
            if let Some(first) = forced_giver[receiver.index()] {
                return Err(PairingError::ForcedReceiverConflict {
                    receiver: roster.identity(receiver).to_string(),
                    first: roster.identity(first).to_string(),
                    second: roster.identity(giver).to_string(),
                });
            }
            receivers[giver.index()] = Some(receiver);
            forced_giver[receiver.index()] = Some(giver);
        }

        let givers: Vec<ParticipantId> =
            roster.ids().filter(|id| receivers[id.index()].is_none()).collect();
        let mut pool: Vec<ParticipantId> =
            roster.ids().filter(|id| forced_giver[id.index()].is_none()).collect();

        for &giver in &givers {
            if pool.iter().all(|&receiver| roster.forbids(giver, receiver)) {
                tracing::warn!(participants = n, "pairing impossible: giver has no candidates");
                return Err(PairingError::NoCandidate { giver: roster.identity(giver).to_string() });
            }
        }

        let mut rng = self.env.rng();
        let mut found = givers.is_empty();
        let mut attempts = 0u32;

        while !found && attempts < self.config.max_attempts {
            attempts += 1;
            pool.shuffle(&mut rng);
            found = givers.iter().zip(&pool).all(|(&g, &r)| !roster.forbids(g, r));
        }

        if !found && self.config.exact_fallback {
            if let Some(matched) = exact_match(roster, &givers, &pool, &mut rng) {
                pool = matched;
                found = true;
                tracing::debug!(attempts, "pairing found by exact matcher");
            }
        } else if found {
            tracing::debug!(attempts, "pairing found by shuffle");
        }

        if !found {
            tracing::warn!(participants = n, attempts, "no valid pairing possible");
            return Err(PairingError::Infeasible { attempts });
        }

        for (&giver, &receiver) in givers.iter().zip(&pool) {
            receivers[giver.index()] = Some(receiver);
        }

        Ok(Assignment { receivers: receivers.into_iter().flatten().collect() })
    }
}

/// Exact bipartite matching (augmenting paths) between `givers` and `pool`.
///
/// Candidate lists and giver order are shuffled so repeated fallbacks still
/// vary. Returns receivers aligned with `givers`, or `None` if no perfect
/// matching exists.
fn exact_match<R: rand::Rng>(
    roster: &Roster,
    givers: &[ParticipantId],
    pool: &[ParticipantId],
    rng: &mut R,
) -> Option<Vec<ParticipantId>> {
    let candidates: Vec<Vec<usize>> = givers
        .iter()
        .map(|&giver| {
            let mut allowed: Vec<usize> =
                (0..pool.len()).filter(|&slot| !roster.forbids(giver, pool[slot])).collect();
            allowed.shuffle(rng);
            allowed
        })
        .collect();

    let mut order: Vec<usize> = (0..givers.len()).collect();
    order.shuffle(rng);

    // owner[slot] = index into `givers` currently holding that receiver
    let mut owner: Vec<Option<usize>> = vec![None; pool.len()];
    for &giver in &order {
        let mut visited = vec![false; pool.len()];
        if !augment(giver, &candidates, &mut owner, &mut visited) {
            return None;
        }
    }

    let mut matched = vec![None; givers.len()];
    for (slot, holder) in owner.iter().enumerate() {
        if let Some(giver) = holder {
            matched[*giver] = Some(pool[slot]);
        }
    }
    matched.into_iter().collect()
}

fn augment(
    giver: usize,
    candidates: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &slot in &candidates[giver] {
        if visited[slot] {
            continue;
        }
        visited[slot] = true;
        let free = match owner[slot] {
            None => true,
            Some(holder) => augment(holder, candidates, owner, visited),
        };
        if free {
            owner[slot] = Some(giver);
            return true;
        }
    }
    false
}
