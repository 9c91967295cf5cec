//! Instruction text parser.
//!
//! One participant per line:
//!
//! ```text
//! # comments and blank lines are ignored
//! Santa
//! Nicholas (the elf)
//! Rudolph !Santa !Nicholas (the elf)
//! Nicholas (the saint) =Nicholas (the elf)
//! ```
//!
//! The name comes first, optionally followed by a parenthesised detail.
//! A token starting with `!` excludes the named participant, a token starting
//! with `=` forces the pairing. Markers only count at the start of a
//! whitespace-separated token and outside parentheses, so targets can contain
//! spaces and details of their own.
//!
//! Targets may refer to participants declared on later lines. Parsing is
//! all-or-nothing and has no randomness: the same text always yields the same
//! roster.

use std::fmt;

use thiserror::Error;

use crate::roster::{
    NameError, ParticipantId, ParticipantName, Roster, RosterBuilder, RosterError,
};

/// Marker for an exclusion token
const EXCLUDE_MARKER: char = '!';

/// Marker for a forced pairing token
const FORCE_MARKER: char = '=';

/// Marker for a comment line
const COMMENT_MARKER: char = '#';

/// Kind of constraint a token declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// `!name`
    Exclusion,
    /// `=name`
    Forced,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclusion => f.write_str("exclusion"),
            Self::Forced => f.write_str("forced pairing"),
        }
    }
}

/// Errors from parsing instruction text.
///
/// Line numbers are 1-based and refer to physical lines of the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No participant lines at all
    #[error("no participants declared")]
    EmptyRoster,

    /// Participant or target name is malformed
    #[error("line {line}: {source}")]
    InvalidName {
        /// Offending line
        line: usize,
        /// What was wrong with the name
        source: NameError,
    },

    /// Same participant declared on two lines
    #[error("line {line}: {identity} is already declared on line {first_line}")]
    DuplicateParticipant {
        /// Repeated declaration
        line: usize,
        /// First declaration
        first_line: usize,
        /// Canonical identity declared twice
        identity: String,
    },

    /// A marker with nothing after it
    #[error("line {line}: `{marker}` must be followed by a participant name")]
    EmptyTarget {
        /// Offending line
        line: usize,
        /// The bare marker
        marker: char,
    },

    /// More than one `=` token on a line
    #[error("line {line}: {identity} declares more than one forced pairing")]
    MultipleForced {
        /// Offending line
        line: usize,
        /// Participant declared on that line
        identity: String,
    },

    /// Constraint target is not in the roster
    #[error("line {line}: unknown participant {target:?} in {constraint}")]
    UnknownTarget {
        /// Offending line
        line: usize,
        /// Target as canonicalised
        target: String,
        /// Which constraint referenced it
        constraint: Constraint,
    },

    /// Roster rule violated (self-reference, name length)
    #[error("line {line}: {source}")]
    Roster {
        /// Offending line
        line: usize,
        /// The roster rule that failed
        source: RosterError,
    },
}

impl ParseError {
    /// Line the error refers to, if it is tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::EmptyRoster => None,
            Self::InvalidName { line, .. }
            | Self::DuplicateParticipant { line, .. }
            | Self::EmptyTarget { line, .. }
            | Self::MultipleForced { line, .. }
            | Self::UnknownTarget { line, .. }
            | Self::Roster { line, .. } => Some(*line),
        }
    }

    fn from_roster(line: usize, err: RosterError) -> Self {
        match err {
            RosterError::InvalidName(source) => Self::InvalidName { line, source },
            source => Self::Roster { line, source },
        }
    }
}

/// One participant line, split but not yet resolved.
#[derive(Debug)]
struct Declaration<'a> {
    line: usize,
    name: &'a str,
    exclusions: Vec<&'a str>,
    forced: Option<&'a str>,
}

/// Parse instruction text into a roster.
pub fn parse_instructions(text: &str) -> Result<Roster, ParseError> {
    let mut builder = RosterBuilder::default();
    let mut declarations: Vec<(ParticipantId, Declaration<'_>)> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
            continue;
        }

        let declaration = split_line(line, trimmed)?;
        let id = match builder.add(declaration.name) {
            Ok(id) => id,
            Err(RosterError::DuplicateParticipant { identity }) => {
                let first_line = builder
                    .find(&identity)
                    .and_then(|first| declarations.iter().find(|(id, _)| *id == first))
                    .map_or(line, |(_, first)| first.line);
                return Err(ParseError::DuplicateParticipant { line, first_line, identity });
            },
            Err(err) => return Err(ParseError::from_roster(line, err)),
        };
        declarations.push((id, declaration));
    }

    if builder.is_empty() {
        return Err(ParseError::EmptyRoster);
    }

    let mut exclusion_count = 0usize;
    for (giver, declaration) in &declarations {
        let (giver, line) = (*giver, declaration.line);

        for target in &declaration.exclusions {
            let excluded = resolve(&builder, line, target, Constraint::Exclusion)?;
            builder.exclude(giver, excluded).map_err(|err| ParseError::from_roster(line, err))?;
            exclusion_count += 1;
        }

        if let Some(target) = declaration.forced {
            let receiver = resolve(&builder, line, target, Constraint::Forced)?;
            builder.force(giver, receiver).map_err(|err| ParseError::from_roster(line, err))?;
        }
    }

    let roster = builder.build();
    tracing::debug!(
        participants = roster.len(),
        exclusions = exclusion_count,
        forced = roster.forced_pairs().count(),
        "parsed instructions"
    );
    Ok(roster)
}

fn resolve(
    builder: &RosterBuilder,
    line: usize,
    target: &str,
    constraint: Constraint,
) -> Result<ParticipantId, ParseError> {
    let name =
        ParticipantName::parse(target).map_err(|source| ParseError::InvalidName { line, source })?;
    builder.find(&name.identity()).ok_or_else(|| ParseError::UnknownTarget {
        line,
        target: name.identity(),
        constraint,
    })
}

/// Split a non-comment line into its name and constraint tokens.
fn split_line(line: usize, text: &str) -> Result<Declaration<'_>, ParseError> {
    let mut segments = Vec::new();
    let mut start = 0usize;
    let mut depth = 0usize;
    let mut previous_is_space = true;

    for (offset, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            EXCLUDE_MARKER | FORCE_MARKER if depth == 0 && previous_is_space => {
                segments.push(&text[start..offset]);
                start = offset;
            },
            _ => {},
        }
        previous_is_space = c.is_whitespace();
    }
    segments.push(&text[start..]);

    let mut segments = segments.into_iter();
    let name = segments.next().unwrap_or_default();
    let mut declaration = Declaration { line, name, exclusions: Vec::new(), forced: None };

    for segment in segments {
        let mut chars = segment.chars();
        let marker = chars.next().unwrap_or_default();
        let target = chars.as_str().trim();
        if target.is_empty() {
            return Err(ParseError::EmptyTarget { line, marker });
        }

        if marker == FORCE_MARKER {
            if declaration.forced.is_some() {
                return Err(ParseError::MultipleForced {
                    line,
                    identity: ParticipantName::parse(name)
                        .map_or_else(|_| name.trim().to_string(), |n| n.identity()),
                });
            }
            declaration.forced = Some(target);
        } else {
            declaration.exclusions.push(target);
        }
    }

    Ok(declaration)
}
