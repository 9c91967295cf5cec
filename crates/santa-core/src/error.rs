//! Error types for a Secret Santa draw and reveal.
//!
//! Each layer keeps its own strongly-typed error. [`SantaError`] gathers them
//! for callers that only need to know which kind of message to show.

use santa_crypto::TokenError;
use thiserror::Error;

use crate::{
    codec::IssueError,
    instructions::ParseError,
    link::{LinkError, RevealError},
    pairing::PairingError,
};

/// What the user should be told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Instruction text or settings are malformed
    Input,
    /// Well-formed constraints that no pairing satisfies
    Infeasible,
    /// A reveal link is malformed, tampered or mismatched
    InvalidLink,
    /// Broken environment (randomness failure)
    Internal,
}

/// Any error from drawing or revealing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SantaError {
    /// Instruction text rejected
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No valid pairing
    #[error(transparent)]
    Pairing(#[from] PairingError),

    /// Reveal link rejected
    #[error(transparent)]
    Reveal(#[from] RevealError),

    /// Token issuing failed
    #[error(transparent)]
    Issue(#[from] IssueError),

    /// Link could not be built from the base URL
    #[error(transparent)]
    Link(#[from] LinkError),
}

impl From<TokenError> for SantaError {
    fn from(err: TokenError) -> Self {
        Self::Reveal(RevealError::Token(err))
    }
}

impl SantaError {
    /// Category deciding which message the user sees.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Parse(_) | Self::Link(_) => ErrorCategory::Input,
            Self::Pairing(_) => ErrorCategory::Infeasible,
            Self::Reveal(_) => ErrorCategory::InvalidLink,
            Self::Issue(_) => ErrorCategory::Internal,
        }
    }

    /// Fixed message for the user.
    ///
    /// Reveal failures always get the same text, whatever the underlying
    /// cause, so the page gives no hints to someone editing a link.
    pub fn user_message(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Your instructions could not be read. Fix your input and try again.",
            ErrorCategory::Infeasible => {
                "No valid pairing is possible with these rules. Relax some constraints."
            },
            ErrorCategory::InvalidLink => "This link is invalid.",
            ErrorCategory::Internal => "Something went wrong generating links. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_distinct() {
        let parse = SantaError::from(ParseError::EmptyRoster);
        let pairing = SantaError::from(PairingError::TooFewParticipants { count: 1 });
        let reveal = SantaError::from(TokenError::AuthenticationFailed);

        assert_eq!(parse.category(), ErrorCategory::Input);
        assert_eq!(pairing.category(), ErrorCategory::Infeasible);
        assert_eq!(reveal.category(), ErrorCategory::InvalidLink);
        assert_ne!(parse.user_message(), pairing.user_message());
        assert_ne!(pairing.user_message(), reveal.user_message());
    }

    #[test]
    fn reveal_message_hides_cause() {
        let tampered = SantaError::from(TokenError::AuthenticationFailed);
        let missing = SantaError::from(RevealError::MissingParameter("key"));

        assert_eq!(tampered.user_message(), missing.user_message());
        assert!(!tampered.user_message().contains("authentication"));
    }

    #[test]
    fn display_passes_through() {
        let err = SantaError::from(ParseError::EmptyRoster);

        assert_eq!(err.to_string(), "no participants declared");
    }
}
