// SPDX-License-Identifier: AGPL-3.0-or-later
//! References used by links, embeds and transclusions

use crate::id::{ZettelId, ID_LENGTH};
use serde::{Deserialize, Serialize};

/// Prefix that marks a query reference
pub const QUERY_PREFIX: &str = "query:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefState {
    Invalid,
    Zettel,
    #[serde(rename = "self")]
    SelfRef,
    Found,
    Broken,
    Hosted,
    Based,
    Query,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub state: RefState,
    pub value: String,
}

impl Reference {
    pub fn new(state: RefState, value: impl Into<String>) -> Self {
        Self {
            state,
            value: value.into(),
        }
    }

    /// Classify a textual reference
    pub fn parse(s: &str) -> Self {
        if s.trim().is_empty() {
            return Self::new(RefState::Invalid, s);
        }
        if let Some(expr) = s.strip_prefix(QUERY_PREFIX) {
            return Self::new(RefState::Query, expr);
        }
        if split_zettel(s).is_some() {
            return Self::new(RefState::Zettel, s);
        }
        if let Some(fragment) = s.strip_prefix('#') {
            let state = if fragment.is_empty() || fragment.contains(char::is_whitespace) {
                RefState::Invalid
            } else {
                RefState::SelfRef
            };
            return Self::new(state, s);
        }
        if let Some(path) = s.strip_prefix("//") {
            return Self::new(RefState::Based, format!("/{path}"));
        }
        if s.starts_with('/') || s.starts_with("./") || s.starts_with("../") {
            return Self::new(hosted_or_invalid(s), s);
        }
        if has_scheme(s) && url::Url::parse(s).is_ok() {
            return Self::new(RefState::External, s);
        }
        Self::new(hosted_or_invalid(s), s)
    }

    pub fn is_valid(&self) -> bool {
        self.state != RefState::Invalid
    }

    /// Zettel identifier of zettel, found and broken references
    pub fn zettel_id(&self) -> Option<ZettelId> {
        match self.state {
            RefState::Zettel | RefState::Found | RefState::Broken => {
                split_zettel(&self.value).map(|(zid, _)| zid)
            }
            _ => None,
        }
    }

    /// Fragment after `#`, for zettel and self references
    pub fn fragment(&self) -> Option<&str> {
        match self.state {
            RefState::Zettel | RefState::Found | RefState::Broken => {
                split_zettel(&self.value).and_then(|(_, frag)| frag)
            }
            RefState::SelfRef => self.value.strip_prefix('#'),
            _ => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.state, RefState::Hosted | RefState::Based)
    }

    /// File extension of the last path segment, lower-cased
    pub fn extension(&self) -> Option<String> {
        let path = self.value.split(['?', '#']).next().unwrap_or_default();
        let last = path.rsplit('/').next().unwrap_or(path);
        let (stem, ext) = last.rsplit_once('.')?;
        (!stem.is_empty() && !ext.is_empty()).then(|| ext.to_ascii_lowercase())
    }

    /// The textual form that [`Reference::parse`] maps back to this reference
    pub fn to_text(&self) -> String {
        match self.state {
            RefState::Query => format!("{QUERY_PREFIX}{}", self.value),
            RefState::Based => format!("/{}", self.value),
            _ => self.value.clone(),
        }
    }
}

fn split_zettel(s: &str) -> Option<(ZettelId, Option<&str>)> {
    let head = s.get(..ID_LENGTH)?;
    let zid: ZettelId = head.parse().ok()?;
    let rest = &s[ID_LENGTH..];
    if rest.is_empty() {
        return Some((zid, None));
    }
    let fragment = rest.strip_prefix('#')?;
    if fragment.is_empty() || fragment.contains(char::is_whitespace) {
        return None;
    }
    Some((zid, Some(fragment)))
}

fn has_scheme(s: &str) -> bool {
    match s.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn hosted_or_invalid(s: &str) -> RefState {
    if s.contains(char::is_whitespace) {
        RefState::Invalid
    } else {
        RefState::Hosted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(s: &str) -> RefState {
        Reference::parse(s).state
    }

    #[test]
    fn test_states() {
        assert_eq!(state(""), RefState::Invalid);
        assert_eq!(state("   "), RefState::Invalid);
        assert_eq!(state("query:tags:#rust | N"), RefState::Query);
        assert_eq!(state("20240101000000"), RefState::Zettel);
        assert_eq!(state("20240101000000#intro"), RefState::Zettel);
        assert_eq!(state("#intro"), RefState::SelfRef);
        assert_eq!(state("//static/logo.png"), RefState::Based);
        assert_eq!(state("/img/a.png"), RefState::Hosted);
        assert_eq!(state("./a.png"), RefState::Hosted);
        assert_eq!(state("../a.png"), RefState::Hosted);
        assert_eq!(state("images/a.png"), RefState::Hosted);
        assert_eq!(state("https://example.org/x"), RefState::External);
        assert_eq!(state("mailto:someone@example.org"), RefState::External);
        assert_eq!(state("not a reference"), RefState::Invalid);
    }

    #[test]
    fn test_zettel_parts() {
        let r = Reference::parse("20240101000000#intro");
        assert_eq!(r.zettel_id().map(|z| z.to_string()).as_deref(), Some("20240101000000"));
        assert_eq!(r.fragment(), Some("intro"));
        assert_eq!(Reference::parse("#top").fragment(), Some("top"));
        // Fifteen digits is no zettel identifier
        assert_eq!(state("202401010000001"), RefState::Hosted);
    }

    #[test]
    fn test_values_and_text() {
        let q = Reference::parse("query:role:zettel");
        assert_eq!(q.value, "role:zettel");
        assert_eq!(q.to_text(), "query:role:zettel");
        let b = Reference::parse("//static/a.png");
        assert_eq!(b.value, "/static/a.png");
        assert_eq!(b.to_text(), "//static/a.png");
    }

    #[test]
    fn test_extension() {
        assert_eq!(Reference::parse("/img/A.PNG").extension().as_deref(), Some("png"));
        assert_eq!(Reference::parse("/img/a.png?v=1").extension().as_deref(), Some("png"));
        assert_eq!(Reference::parse("/img/.hidden").extension(), None);
        assert_eq!(Reference::parse("/img/noext").extension(), None);
    }
}
