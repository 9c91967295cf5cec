//! Draw and reveal entry points.
//!
//! [`SecretSanta::draw`] runs parse, pairing and encoding in one call and
//! hands back tokens only. The plaintext assignment never leaves this module,
//! so whoever runs the draw cannot read the result without opening links.

use santa_crypto::SecretToken;
use serde::Serialize;
use url::Url;

use crate::{
    codec::{IssuedToken, SecretCodec, decode},
    env::Environment,
    error::SantaError,
    instructions::parse_instructions,
    link::{LinkError, RevealQuery, reveal_link},
    pairing::{PairingConfig, PairingEngine},
};

/// Result of a draw: one token per participant, in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draw {
    tokens: Vec<IssuedToken>,
}

impl Draw {
    /// Issued tokens in roster order.
    pub fn tokens(&self) -> &[IssuedToken] {
        &self.tokens
    }

    /// Token for one giver.
    pub fn token_for(&self, giver: &str) -> Option<&SecretToken> {
        self.tokens.iter().find(|t| t.giver == giver).map(|t| &t.token)
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if the draw is empty (never the case for a successful draw).
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Reveal links under `base`, as `(giver, link)`.
    pub fn links(&self, base: &Url) -> Result<Vec<(String, Url)>, LinkError> {
        self.tokens
            .iter()
            .map(|t| Ok((t.giver.clone(), reveal_link(base, &t.giver, &t.token)?)))
            .collect()
    }
}

/// What a reveal link says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reveal {
    /// Link owner, as written in the link
    pub name: Option<String>,
    /// The person they give a gift to
    pub partner: String,
}

/// Draw facade combining the pairing engine and the codec.
pub struct SecretSanta<E: Environment> {
    engine: PairingEngine<E>,
    codec: SecretCodec<E>,
}

impl<E: Environment> SecretSanta<E> {
    /// Create a draw facade. Pairing and token randomness both come from
    /// `env`.
    pub fn new(env: E, config: PairingConfig) -> Self {
        Self { engine: PairingEngine::new(env.clone(), config), codec: SecretCodec::new(env) }
    }

    /// Parse `instructions`, pair everyone and issue tokens.
    ///
    /// # Errors
    ///
    /// - [`SantaError::Parse`]: malformed instructions
    /// - [`SantaError::Pairing`]: constraints cannot be satisfied
    /// - [`SantaError::Issue`]: randomness failure
    pub fn draw(&self, instructions: &str) -> Result<Draw, SantaError> {
        let roster = parse_instructions(instructions)?;
        let assignment = self.engine.generate(&roster)?;
        let tokens = self.codec.issue(&roster, &assignment)?;

        tracing::debug!(participants = roster.len(), "secret santa drawn");
        Ok(Draw { tokens })
    }
}

/// Decode a reveal link's query.
///
/// # Errors
///
/// [`SantaError::Reveal`] for any malformed, tampered or mismatched token.
pub fn reveal(query: &RevealQuery) -> Result<Reveal, SantaError> {
    let partner = decode(&query.token)?;
    Ok(Reveal { name: query.name.clone(), partner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCategory, seeded_env::SeededEnv};

    fn santa(seed: u64) -> SecretSanta<SeededEnv> {
        SecretSanta::new(SeededEnv::new(seed), PairingConfig::default())
    }

    #[test]
    fn draw_then_reveal_through_links() {
        let draw = santa(3).draw("Santa\nNicholas (the elf)").unwrap();
        let base = Url::parse("https://example.org/santa/").unwrap();

        let links = draw.links(&base).unwrap();
        assert_eq!(links.len(), 2);

        let (giver, link) = &links[0];
        assert_eq!(giver, "Santa");

        let revealed = reveal(&RevealQuery::from_url(link).unwrap()).unwrap();
        assert_eq!(revealed.name.as_deref(), Some("Santa"));
        assert_eq!(revealed.partner, "Nicholas (the elf)");
    }

    #[test]
    fn token_for_looks_up_giver() {
        let draw = santa(4).draw("A\nB\nC").unwrap();

        assert!(draw.token_for("B").is_some());
        assert!(draw.token_for("Z").is_none());
    }

    #[test]
    fn draw_errors_are_categorised() {
        assert_eq!(santa(1).draw("").unwrap_err().category(), ErrorCategory::Input);
        assert_eq!(santa(1).draw("Santa").unwrap_err().category(), ErrorCategory::Infeasible);
        assert_eq!(
            santa(1).draw("A =C\nB =C\nC").unwrap_err().category(),
            ErrorCategory::Infeasible
        );
    }

    #[test]
    fn tampered_link_is_invalid() {
        let draw = santa(5).draw("A\nB\nC").unwrap();
        let mut token = draw.tokens()[0].token.clone();
        token.secret.replace_range(0..1, if token.secret.starts_with('A') { "B" } else { "A" });

        let err = reveal(&RevealQuery { name: None, token }).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidLink);
    }

    #[test]
    fn draw_serializes_without_plaintext() {
        let draw = santa(6).draw("Santa\nRudolph").unwrap();
        let json = serde_json::to_string(&draw).unwrap();

        assert!(json.contains("\"giver\":\"Santa\""));
        assert_eq!(json.matches("Rudolph").count(), 1, "receiver must only appear as a giver");
    }
}
