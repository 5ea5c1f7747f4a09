// SPDX-License-Identifier: AGPL-3.0-or-later
//! Quotation marks per language

use crate::parser::zettelmark::inline::NBSP;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteInfo {
    pub primary: (&'static str, &'static str),
    pub secondary: (&'static str, &'static str),
    /// Pad the quoted text with non-breaking spaces
    pub nbsp: bool,
}

const DEFAULT: QuoteInfo = QuoteInfo {
    primary: ("\"", "\""),
    secondary: ("\"", "\""),
    nbsp: false,
};

/// Quotes for a language tag such as `de` or `en-GB`
pub fn quotes(lang: &str) -> QuoteInfo {
    let primary = lang.split(['-', '_']).next().unwrap_or_default();
    match primary.to_ascii_lowercase().as_str() {
        "en" => QuoteInfo {
            primary: ("\u{201c}", "\u{201d}"),
            secondary: ("\u{2018}", "\u{2019}"),
            nbsp: false,
        },
        "de" => QuoteInfo {
            primary: ("\u{201e}", "\u{201c}"),
            secondary: ("\u{201a}", "\u{2018}"),
            nbsp: false,
        },
        "fr" => QuoteInfo {
            primary: ("\u{ab}", "\u{bb}"),
            secondary: ("\u{2039}", "\u{203a}"),
            nbsp: true,
        },
        _ => DEFAULT,
    }
}

impl QuoteInfo {
    /// Opening and closing text for a quotation at nesting `depth`
    pub fn marks(&self, depth: usize) -> (String, String) {
        let (open, close) = if depth % 2 == 0 {
            self.primary
        } else {
            self.secondary
        };
        if self.nbsp {
            (format!("{open}{NBSP}"), format!("{NBSP}{close}"))
        } else {
            (open.to_string(), close.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_languages() {
        assert_eq!(quotes("en").marks(0), ("\u{201c}".into(), "\u{201d}".into()));
        assert_eq!(quotes("en-GB").marks(1), ("\u{2018}".into(), "\u{2019}".into()));
        assert_eq!(quotes("de").marks(0), ("\u{201e}".into(), "\u{201c}".into()));
        assert_eq!(quotes("xx").marks(0), ("\"".into(), "\"".into()));
    }

    #[test]
    fn test_french_padding() {
        let (open, close) = quotes("fr").marks(2);
        assert_eq!(open, "\u{ab}\u{a0}");
        assert_eq!(close, "\u{a0}\u{bb}");
    }
}
