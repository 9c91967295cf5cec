//! Participants and their pairing constraints.
//!
//! A [`Roster`] is the validated set of unique participants for one draw.
//! It is built through [`RosterBuilder`], either by the instruction parser or
//! programmatically, and is immutable afterwards.
//!
//! # Identity
//!
//! A participant is identified by their canonical name: the base name plus an
//! optional parenthesised detail, with whitespace runs collapsed
//! (`"Nicholas  ( the elf )"` becomes `"Nicholas (the elf)"`). Matching is
//! case-sensitive. Constraint targets go through the same canonicalisation,
//! so they match however the spacing was typed.
//!
//! # Exclusions
//!
//! Exclusions are stored as declared but read through [`Roster::forbids`],
//! which applies the symmetric closure: if either side excluded the other,
//! neither may give to the other.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
};

use santa_crypto::MAX_PARTNER_SIZE;
use thiserror::Error;

/// Index of a participant within its roster, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(usize);

impl ParticipantId {
    pub(crate) fn at(index: usize) -> Self {
        Self(index)
    }

    /// Position in the roster (0-based declaration order).
    pub fn index(self) -> usize {
        self.0
    }
}

/// Errors from interpreting a participant name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Nothing left after trimming
    #[error("name is empty")]
    Empty,

    /// `(` without matching `)` or vice versa
    #[error("unbalanced parenthesis in {0:?}")]
    UnbalancedParenthesis(String),

    /// Text after the closing parenthesis of the detail
    #[error("unexpected text after detail in {0:?}")]
    TrailingText(String),
}

/// A canonical participant name: base name plus optional detail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantName {
    name: String,
    detail: Option<String>,
}

impl ParticipantName {
    /// Parse and canonicalise `raw`.
    ///
    /// The detail is everything between the first `(` and its matching `)`.
    /// Nested parentheses are kept inside the detail.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let Some(open) = raw.find('(') else {
            if raw.contains(')') {
                return Err(NameError::UnbalancedParenthesis(raw.trim().to_string()));
            }
            let name = collapse_whitespace(raw);
            if name.is_empty() {
                return Err(NameError::Empty);
            }
            return Ok(Self { name, detail: None });
        };

        let name = collapse_whitespace(&raw[..open]);
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if raw[..open].contains(')') {
            return Err(NameError::UnbalancedParenthesis(raw.trim().to_string()));
        }

        let mut depth = 0usize;
        let mut close = None;
        for (offset, c) in raw[open..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(open + offset);
                        break;
                    }
                },
                _ => {},
            }
        }
        let Some(close) = close else {
            return Err(NameError::UnbalancedParenthesis(raw.trim().to_string()));
        };

        if !raw[close + 1..].trim().is_empty() {
            return Err(NameError::TrailingText(raw.trim().to_string()));
        }

        let detail = collapse_whitespace(&raw[open + 1..close]);
        let detail = (!detail.is_empty()).then_some(detail);

        Ok(Self { name, detail })
    }

    /// Base name without the detail.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parenthesised detail, if any (without the parentheses).
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Canonical identity string used for matching.
    pub fn identity(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({detail})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A roster entry with its declared constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    id: ParticipantId,
    name: ParticipantName,
    identity: String,
    excluded: BTreeSet<ParticipantId>,
    forced: Option<ParticipantId>,
}

impl Participant {
    /// Position in the roster.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Canonical identity (name plus detail).
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Structured name.
    pub fn name(&self) -> &ParticipantName {
        &self.name
    }

    /// Exclusions this participant declared (not the symmetric closure).
    pub fn excluded(&self) -> &BTreeSet<ParticipantId> {
        &self.excluded
    }

    /// Forced receiver, if declared.
    pub fn forced(&self) -> Option<ParticipantId> {
        self.forced
    }
}

/// Errors from building a roster.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Participant name could not be interpreted
    #[error("invalid participant name: {0}")]
    InvalidName(#[from] NameError),

    /// Same canonical identity declared twice
    #[error("duplicate participant: {identity}")]
    DuplicateParticipant {
        /// The repeated identity
        identity: String,
    },

    /// Identity too long to seal into a reveal token
    #[error("name is {length} bytes, at most {max} are allowed")]
    NameTooLong {
        /// Canonical identity length in bytes
        length: usize,
        /// Longest accepted identity
        max: usize,
    },

    /// Participant excludes themself
    #[error("{identity} cannot exclude themself")]
    SelfExclusion {
        /// The offending participant
        identity: String,
    },

    /// Participant is forced onto themself
    #[error("{identity} cannot be forced to pair with themself")]
    SelfForced {
        /// The offending participant
        identity: String,
    },

    /// A second forced pairing for the same giver
    #[error("{identity} already has a forced pairing with {existing}")]
    AlreadyForced {
        /// The giver
        identity: String,
        /// The receiver already forced
        existing: String,
    },

    /// Id does not belong to this roster
    #[error("unknown participant id {0}")]
    UnknownId(usize),
}

/// The validated participant list for one draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    participants: Vec<Participant>,
    index: HashMap<String, ParticipantId>,
}

impl Roster {
    /// Start building a roster.
    pub fn builder() -> RosterBuilder {
        RosterBuilder::default()
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// True if there are no participants.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participants in declaration order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Look up a participant by id.
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(id.0)
    }

    /// Canonical identity for an id.
    ///
    /// Returns an empty string for ids from another roster.
    pub fn identity(&self, id: ParticipantId) -> &str {
        self.get(id).map_or("", Participant::identity)
    }

    /// Find a participant by identity (canonicalised before lookup).
    pub fn find(&self, identity: &str) -> Option<ParticipantId> {
        let canonical = ParticipantName::parse(identity).ok()?.identity();
        self.index.get(&canonical).copied()
    }

    /// All ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.participants.iter().map(Participant::id)
    }

    /// True if `giver` may never give to `receiver`.
    ///
    /// Covers self-pairing and the symmetric closure of exclusions.
    pub fn forbids(&self, giver: ParticipantId, receiver: ParticipantId) -> bool {
        if giver == receiver {
            return true;
        }
        let declared = |from: ParticipantId, to: ParticipantId| {
            self.get(from).is_some_and(|p| p.excluded.contains(&to))
        };
        declared(giver, receiver) || declared(receiver, giver)
    }

    /// Declared forced pairings as `(giver, receiver)` in roster order.
    pub fn forced_pairs(&self) -> impl Iterator<Item = (ParticipantId, ParticipantId)> + '_ {
        self.participants.iter().filter_map(|p| p.forced.map(|receiver| (p.id, receiver)))
    }
}

/// Incremental roster construction with validation.
#[derive(Debug, Default)]
pub struct RosterBuilder {
    participants: Vec<Participant>,
    index: HashMap<String, ParticipantId>,
}

impl RosterBuilder {
    /// Add a participant by name, returning their id.
    ///
    /// The canonical identity must fit in a reveal token
    /// ([`MAX_PARTNER_SIZE`] bytes).
    pub fn add(&mut self, raw_name: &str) -> Result<ParticipantId, RosterError> {
        let name = ParticipantName::parse(raw_name)?;
        let identity = name.identity();
        if identity.len() > MAX_PARTNER_SIZE {
            return Err(RosterError::NameTooLong { length: identity.len(), max: MAX_PARTNER_SIZE });
        }
        if self.index.contains_key(&identity) {
            return Err(RosterError::DuplicateParticipant { identity });
        }

        let id = ParticipantId(self.participants.len());
        self.index.insert(identity.clone(), id);
        self.participants.push(Participant {
            id,
            name,
            identity,
            excluded: BTreeSet::new(),
            forced: None,
        });
        Ok(id)
    }

    /// Find an already added participant by identity.
    pub fn find(&self, identity: &str) -> Option<ParticipantId> {
        let canonical = ParticipantName::parse(identity).ok()?.identity();
        self.index.get(&canonical).copied()
    }

    /// Forbid `who` from being paired with `whom` (in either direction).
    pub fn exclude(&mut self, who: ParticipantId, whom: ParticipantId) -> Result<(), RosterError> {
        self.check(whom)?;
        let participant = self.participant_mut(who)?;
        if who == whom {
            return Err(RosterError::SelfExclusion { identity: participant.identity.clone() });
        }
        participant.excluded.insert(whom);
        Ok(())
    }

    /// Force `giver` to give to `receiver`.
    pub fn force(&mut self, giver: ParticipantId, receiver: ParticipantId) -> Result<(), RosterError> {
        self.check(receiver)?;
        let participant = self.participant_mut(giver)?;
        if giver == receiver {
            return Err(RosterError::SelfForced { identity: participant.identity.clone() });
        }
        if let Some(existing) = participant.forced {
            if existing == receiver {
                return Ok(());
            }
            let identity = participant.identity.clone();
            return Err(RosterError::AlreadyForced {
                identity,
                existing: self.identity_of(existing)?,
            });
        }
        participant.forced = Some(receiver);
        Ok(())
    }

    /// Number of participants added so far.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// True if nobody has been added.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Finish building.
    pub fn build(self) -> Roster {
        Roster { participants: self.participants, index: self.index }
    }

    fn check(&self, id: ParticipantId) -> Result<(), RosterError> {
        if id.0 < self.participants.len() { Ok(()) } else { Err(RosterError::UnknownId(id.0)) }
    }

    fn identity_of(&self, id: ParticipantId) -> Result<String, RosterError> {
        self.participants
            .get(id.0)
            .map(|p| p.identity.clone())
            .ok_or(RosterError::UnknownId(id.0))
    }

    fn participant_mut(&mut self, id: ParticipantId) -> Result<&mut Participant, RosterError> {
        self.participants.get_mut(id.0).ok_or(RosterError::UnknownId(id.0))
    }
}
