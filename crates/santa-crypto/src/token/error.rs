//! Error types for reveal token operations

use thiserror::Error;

/// Errors from opening a reveal token.
///
/// Messages name the offending component but never echo its bytes, so a
/// failed reveal gives nothing back that helps forge a token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// A component is not valid URL-safe base64
    #[error("{component} is not valid base64url")]
    InvalidEncoding {
        /// Which component failed (`key`, `nonce` or `secret`)
        component: &'static str,
    },

    /// A component decoded to the wrong number of bytes
    #[error("{component} has invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Which component failed
        component: &'static str,
        /// Expected byte length
        expected: usize,
        /// Actual byte length
        actual: usize,
    },

    /// Ciphertext is larger than any sealed name can be
    #[error("secret too large: {size} bytes (max {max})")]
    SecretTooLarge {
        /// Decoded ciphertext size
        size: usize,
        /// Maximum accepted size
        max: usize,
    },

    /// Authentication tag did not verify (tampered or mismatched token)
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Authenticated plaintext is not UTF-8
    #[error("sealed pairing is not valid UTF-8")]
    InvalidPlaintext,
}

impl TokenError {
    /// Returns true if the token was well-formed but failed verification.
    ///
    /// Distinguishes tampering or key/nonce mix-ups from links that were
    /// truncated or mangled in transit.
    pub fn is_tampered(&self) -> bool {
        match self {
            Self::AuthenticationFailed | Self::InvalidPlaintext => true,

            Self::InvalidEncoding { .. }
            | Self::InvalidLength { .. }
            | Self::SecretTooLarge { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failure_is_tampering() {
        assert!(TokenError::AuthenticationFailed.is_tampered());
    }

    #[test]
    fn bad_encoding_is_not_tampering() {
        assert!(!TokenError::InvalidEncoding { component: "key" }.is_tampered());
    }

    #[test]
    fn error_display() {
        let err = TokenError::InvalidLength { component: "nonce", expected: 24, actual: 12 };
        assert_eq!(err.to_string(), "nonce has invalid length: expected 24, got 12");
    }
}
