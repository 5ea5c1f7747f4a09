// SPDX-License-Identifier: AGPL-3.0-or-later
//! Syntax parsers and the process-wide parser registry
//!
//! The registry is built once from a static table and is read-only
//! afterwards. Lookups of unknown syntaxes fall back to the plain text
//! parser, so parsing never fails.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::ast::{BlockSlice, InlineSlice};
use crate::cleaner;
use crate::config::{ParseConfig, DEFAULT_LANG};
use crate::meta::Meta;
use crate::traits::SyntaxParser;
use crate::zettel::{Zettel, ZettelNode};

pub mod blob;
pub mod draw;
#[cfg(feature = "markdown")]
pub mod markdown;
pub mod plain;
pub mod zettelmark;

/// Syntax that unknown names fall back to
pub const FALLBACK_SYNTAX: &str = "txt";

pub struct ParserInfo {
    pub name: &'static str,
    pub alt_names: &'static [&'static str],
    pub is_ast_parser: bool,
    pub is_text_format: bool,
    pub is_image_format: bool,
    pub parser: Box<dyn SyntaxParser>,
}

impl std::fmt::Debug for ParserInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserInfo")
            .field("name", &self.name)
            .field("alt_names", &self.alt_names)
            .field("is_ast_parser", &self.is_ast_parser)
            .field("is_text_format", &self.is_text_format)
            .field("is_image_format", &self.is_image_format)
            .finish_non_exhaustive()
    }
}

/// Global parser registry with all builtin syntaxes
pub static REGISTRY: Lazy<ParserRegistry> = Lazy::new(ParserRegistry::create);

pub struct ParserRegistry {
    infos: Vec<ParserInfo>,
    index: HashMap<&'static str, usize>,
}

impl ParserRegistry {
    fn create() -> Self {
        let mut registry = ParserRegistry {
            infos: Vec::new(),
            index: HashMap::new(),
        };
        registry.register(zettelmark::info());
        #[cfg(feature = "markdown")]
        registry.register(markdown::info());
        for info in plain::infos() {
            registry.register(info);
        }
        registry.register(draw::info());
        for info in blob::infos() {
            registry.register(info);
        }
        tracing::debug!(count = registry.infos.len(), "parser registry initialised");
        registry
    }

    /// Add a parser under its name and aliases
    ///
    /// # Panics
    ///
    /// If any of the names is already registered.
    pub fn register(&mut self, info: ParserInfo) {
        let idx = self.infos.len();
        for name in std::iter::once(info.name).chain(info.alt_names.iter().copied()) {
            if self.index.insert(name, idx).is_some() {
                panic!("parser for syntax {name:?} registered twice");
            }
        }
        self.infos.push(info);
    }

    pub fn lookup(&self, name: &str) -> Option<&ParserInfo> {
        self.index.get(name).map(|&idx| &self.infos[idx])
    }

    /// Parser for a syntax, or the plain text parser for unknown names
    pub fn get(&self, name: &str) -> &ParserInfo {
        match self.lookup(name) {
            Some(info) => info,
            None => {
                tracing::debug!(syntax = name, "unknown syntax, using plain text");
                &self.infos[self.index[FALLBACK_SYNTAX]]
            }
        }
    }

    /// All registered names and aliases, sorted
    pub fn syntaxes(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.index.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

pub fn get(name: &str) -> &'static ParserInfo {
    REGISTRY.get(name)
}

pub fn syntaxes() -> Vec<&'static str> {
    REGISTRY.syntaxes()
}

pub fn is_ast_parser(name: &str) -> bool {
    REGISTRY.lookup(name).is_some_and(|info| info.is_ast_parser)
}

pub fn is_text_format(name: &str) -> bool {
    REGISTRY.lookup(name).is_some_and(|info| info.is_text_format)
}

pub fn is_image_format(name: &str) -> bool {
    REGISTRY.lookup(name).is_some_and(|info| info.is_image_format)
}

pub fn parse_blocks(input: &[u8], meta: &Meta, syntax: &str, config: &ParseConfig) -> BlockSlice {
    get(syntax).parser.parse_blocks(input, meta, syntax, config)
}

pub fn parse_inlines(input: &str, syntax: &str) -> InlineSlice {
    get(syntax).parser.parse_inlines(input, syntax)
}

/// Parse and clean a zettel
///
/// An empty `syntax` selects the syntax from the zettel's metadata, falling
/// back to the configured default.
pub fn parse_zettel(zettel: &Zettel, syntax: &str, config: &ParseConfig) -> ZettelNode {
    let inherited = zettel
        .meta
        .with_defaults(&config.default_syntax, DEFAULT_LANG);
    let syntax = if syntax.is_empty() {
        inherited.syntax().unwrap_or(&config.default_syntax).to_string()
    } else {
        syntax.to_string()
    };
    tracing::debug!(zid = %zettel.zid(), syntax = %syntax, "parsing zettel");
    let mut blocks = parse_blocks(&zettel.content, &inherited, &syntax, config);
    cleaner::clean(&mut blocks, config.allow_html);
    ZettelNode {
        meta: zettel.meta.clone(),
        inherited,
        content: zettel.content.clone(),
        syntax,
        zid: zettel.zid(),
        blocks,
    }
}

/// Inline parse of a metadata value in Zettelmarkup
pub fn parse_meta_inlines(value: &str) -> InlineSlice {
    parse_inlines(value, zettelmark::SYNTAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockNode, VerbatimKind};
    use crate::id::ZettelId;

    #[test]
    fn test_registered_syntaxes() {
        let names = syntaxes();
        for name in [
            "zmk", "markdown", "md", "txt", "plain", "text", "css", "html", "sxn", "svg", "draw",
            "none", "gif", "jpeg", "jpg", "png", "webp",
        ] {
            assert!(names.contains(&name), "{name} missing");
        }
    }

    #[test]
    fn test_flags() {
        assert!(is_ast_parser("zmk"));
        assert!(is_ast_parser("md"));
        assert!(is_ast_parser("draw"));
        assert!(!is_ast_parser("txt"));
        assert!(is_image_format("png"));
        assert!(is_image_format("svg"));
        assert!(!is_image_format("zmk"));
        assert!(!is_text_format("png"));
        assert!(!is_text_format("none"));
        assert!(!is_text_format("no-such-syntax"));
    }

    #[test]
    fn test_unknown_falls_back_to_plain() {
        assert_eq!(get("klingon").name, FALLBACK_SYNTAX);
        let blocks = parse_blocks(b"x", &meta(), "klingon", &ParseConfig::default());
        assert!(matches!(
            blocks.as_slice(),
            [BlockNode::Verbatim {
                kind: VerbatimKind::Code,
                ..
            }]
        ));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_registration_panics() {
        let mut registry = ParserRegistry {
            infos: Vec::new(),
            index: HashMap::new(),
        };
        registry.register(zettelmark::info());
        registry.register(zettelmark::info());
    }

    #[test]
    fn test_parse_zettel_uses_meta_syntax() {
        let zettel = Zettel::new(meta().with("syntax", "zmk"), "= Title\nText");
        let zn = parse_zettel(&zettel, "", &ParseConfig::default());
        assert_eq!(zn.syntax, "zmk");
        assert_eq!(zn.inherited.get("lang"), Some("en"));
        assert!(matches!(zn.blocks[0], BlockNode::Heading { .. }));

        let plain = parse_zettel(&Zettel::new(meta(), "x"), "", &ParseConfig::default());
        assert_eq!(plain.syntax, "plain");
    }

    fn meta() -> Meta {
        Meta::new(ZettelId::new(20240101000000).unwrap())
    }
}
