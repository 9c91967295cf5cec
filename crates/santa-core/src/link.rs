//! Reveal links.
//!
//! A link is `<base>/who?name=<giver>&key=<key>&secret=<secret>&iv=<nonce>`.
//! `name` is only shown to the reader; decoding uses `key`, `secret` and `iv`
//! alone. `nonce` is accepted as an alias for `iv` when reading. If a
//! parameter repeats, the first occurrence wins.

use santa_crypto::{SecretToken, TokenError};
use thiserror::Error;
use url::{Url, form_urlencoded};

/// Path of the reveal page, relative to the base URL.
pub const REVEAL_PATH: &str = "who";

/// Errors from building a link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Base URL cannot carry a path (e.g. `mailto:`)
    #[error("base url cannot be a base: {0}")]
    CannotBeABase(String),

    /// Joining the reveal path failed
    #[error("invalid base url: {0}")]
    InvalidBase(#[from] url::ParseError),
}

/// Errors from reading a link back.
///
/// All variants mean "this link is invalid"; the detail is for logs only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevealError {
    /// Link is not a URL
    #[error("link is not a valid url")]
    InvalidUrl,

    /// A required query parameter is absent
    #[error("missing query parameter `{0}`")]
    MissingParameter(&'static str),

    /// Token failed to decode or authenticate
    #[error("token rejected: {0}")]
    Token(#[from] TokenError),
}

/// Build the reveal link for one giver.
pub fn reveal_link(base: &Url, name: &str, token: &SecretToken) -> Result<Url, LinkError> {
    if base.cannot_be_a_base() {
        return Err(LinkError::CannotBeABase(base.to_string()));
    }

    let mut link = base.join(REVEAL_PATH)?;
    link.query_pairs_mut()
        .clear()
        .append_pair("name", name)
        .append_pair("key", &token.key)
        .append_pair("secret", &token.secret)
        .append_pair("iv", &token.nonce);
    Ok(link)
}

/// Query parameters of a reveal link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealQuery {
    /// Display name of the link owner, if present
    pub name: Option<String>,
    /// The token to decode
    pub token: SecretToken,
}

impl RevealQuery {
    /// Parse a full link.
    pub fn parse_link(link: &str) -> Result<Self, RevealError> {
        let url = Url::parse(link.trim()).map_err(|_| RevealError::InvalidUrl)?;
        Self::from_url(&url)
    }

    /// Read the query of a parsed URL.
    pub fn from_url(url: &Url) -> Result<Self, RevealError> {
        Self::from_pairs(url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())))
    }

    /// Read a raw query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> Result<Self, RevealError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(
            form_urlencoded::parse(query.as_bytes()).map(|(k, v)| (k.into_owned(), v.into_owned())),
        )
    }

    fn from_pairs(pairs: impl Iterator<Item = (String, String)>) -> Result<Self, RevealError> {
        let mut name = None;
        let mut key = None;
        let mut secret = None;
        let mut nonce = None;

        for (param, value) in pairs {
            let slot = match param.as_str() {
                "name" => &mut name,
                "key" => &mut key,
                "secret" => &mut secret,
                "iv" | "nonce" => &mut nonce,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        let key = key.ok_or(RevealError::MissingParameter("key"))?;
        let secret = secret.ok_or(RevealError::MissingParameter("secret"))?;
        let nonce = nonce.ok_or(RevealError::MissingParameter("iv"))?;

        Ok(Self { name, token: SecretToken::new(key, nonce, secret) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_token() -> SecretToken {
        SecretToken::new("a-key", "a_nonce", "aSecret")
    }

    fn base() -> Url {
        Url::parse("https://example.org/trhallam/super-secret-santa/").unwrap()
    }

    #[test]
    fn link_layout() {
        let link = reveal_link(&base(), "Nicholas (the elf)", &sample_token()).unwrap();

        assert_eq!(link.path(), "/trhallam/super-secret-santa/who");
        assert_eq!(
            link.query(),
            Some("name=Nicholas+%28the+elf%29&key=a-key&secret=aSecret&iv=a_nonce")
        );
    }

    #[test]
    fn base_without_trailing_slash_replaces_last_segment() {
        let base = Url::parse("https://example.org/santa/index").unwrap();
        let link = reveal_link(&base, "A", &sample_token()).unwrap();

        assert_eq!(link.path(), "/santa/who");
    }

    #[test]
    fn existing_query_on_base_is_dropped() {
        let base = Url::parse("https://example.org/santa/?utm=1").unwrap();
        let link = reveal_link(&base, "A", &sample_token()).unwrap();

        assert!(!link.query().unwrap_or_default().contains("utm"));
    }

    #[test]
    fn cannot_be_a_base_is_rejected() {
        let base = Url::parse("mailto:santa@example.org").unwrap();

        assert!(matches!(
            reveal_link(&base, "A", &sample_token()),
            Err(LinkError::CannotBeABase(_))
        ));
    }

    #[test]
    fn link_reads_back() {
        let link = reveal_link(&base(), "Maël", &sample_token()).unwrap();
        let query = RevealQuery::parse_link(link.as_str()).unwrap();

        assert_eq!(query.name.as_deref(), Some("Maël"));
        assert_eq!(query.token, sample_token());
    }

    #[test]
    fn nonce_alias_is_accepted() {
        let query = RevealQuery::from_query("?key=k&nonce=n&secret=s").unwrap();

        assert_eq!(query.token, SecretToken::new("k", "n", "s"));
        assert_eq!(query.name, None);
    }

    #[test]
    fn first_occurrence_wins() {
        let query = RevealQuery::from_query("key=first&key=second&iv=n&secret=s").unwrap();

        assert_eq!(query.token.key, "first");
    }

    #[test]
    fn missing_parameters() {
        assert_eq!(
            RevealQuery::from_query("iv=n&secret=s"),
            Err(RevealError::MissingParameter("key"))
        );
        assert_eq!(
            RevealQuery::from_query("key=k&iv=n"),
            Err(RevealError::MissingParameter("secret"))
        );
        assert_eq!(
            RevealQuery::from_query("key=k&secret=s"),
            Err(RevealError::MissingParameter("iv"))
        );
    }

    #[test]
    fn garbage_link_is_invalid_url() {
        assert_eq!(RevealQuery::parse_link("not a link"), Err(RevealError::InvalidUrl));
    }
}
