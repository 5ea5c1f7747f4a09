// SPDX-License-Identifier: AGPL-3.0-or-later
//! Thin parsers for text formats that are shown as they are

use super::{blob, ParserInfo};
use crate::ast::{BlockNode, BlockSlice, InlineNode, InlineSlice, VerbatimKind};
use crate::attrs::{Attributes, DEFAULT_KEY};
use crate::config::ParseConfig;
use crate::meta::Meta;
use crate::sx::Sx;
use crate::traits::SyntaxParser;

/// Text wrapped into a single verbatim block
struct VerbatimParser {
    kind: VerbatimKind,
    default_attr: Option<&'static str>,
}

impl SyntaxParser for VerbatimParser {
    fn parse_blocks(&self, input: &[u8], _: &Meta, _: &str, _: &ParseConfig) -> BlockSlice {
        let attrs = match self.default_attr {
            Some(value) => Attributes::new().with(DEFAULT_KEY, value),
            None => Attributes::new(),
        };
        vec![verbatim(self.kind, attrs, input)]
    }

    fn parse_inlines(&self, input: &str, _: &str) -> InlineSlice {
        text_inlines(input)
    }
}

fn verbatim(kind: VerbatimKind, attrs: Attributes, input: &[u8]) -> BlockNode {
    BlockNode::Verbatim {
        kind,
        attrs,
        content: String::from_utf8_lossy(input).into_owned(),
    }
}

/// Inline form of plain text: a single text node, line breaks become spaces
fn text_inlines(input: &str) -> InlineSlice {
    let text = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        Vec::new()
    } else {
        vec![InlineNode::text(text)]
    }
}

/// HTML is kept raw only when allowed
struct HtmlParser;

impl SyntaxParser for HtmlParser {
    fn parse_blocks(&self, input: &[u8], _: &Meta, _: &str, config: &ParseConfig) -> BlockSlice {
        if config.allow_html {
            vec![verbatim(VerbatimKind::Html, Attributes::new(), input)]
        } else {
            let attrs = Attributes::new().with(DEFAULT_KEY, "html");
            vec![verbatim(VerbatimKind::Code, attrs, input)]
        }
    }

    fn parse_inlines(&self, input: &str, _: &str) -> InlineSlice {
        text_inlines(input)
    }
}

/// S-expressions are re-printed in canonical spacing when they read cleanly
struct SxnParser;

impl SyntaxParser for SxnParser {
    fn parse_blocks(&self, input: &[u8], _: &Meta, _: &str, _: &ParseConfig) -> BlockSlice {
        let text = String::from_utf8_lossy(input);
        let content = match Sx::read_all(&text) {
            Ok(values) if !values.is_empty() => {
                let mut out = String::new();
                for value in values {
                    value.print_into(&mut out);
                    out.push('\n');
                }
                out
            }
            Ok(_) => text.into_owned(),
            Err(err) => {
                tracing::debug!(error = %err, "sxn content does not read, kept verbatim");
                text.into_owned()
            }
        };
        vec![BlockNode::Verbatim {
            kind: VerbatimKind::Code,
            attrs: Attributes::new().with(DEFAULT_KEY, "sxn"),
            content,
        }]
    }

    fn parse_inlines(&self, input: &str, _: &str) -> InlineSlice {
        text_inlines(input)
    }
}

/// SVG images; content that is no SVG is shown as text
struct SvgParser;

impl SyntaxParser for SvgParser {
    fn parse_blocks(&self, input: &[u8], meta: &Meta, syntax: &str, _: &ParseConfig) -> BlockSlice {
        let text = String::from_utf8_lossy(input);
        match svg_start(&text) {
            Some(start) => vec![blob::blob_node(
                meta,
                syntax,
                text[start..].trim_end().as_bytes().to_vec(),
            )],
            None => vec![verbatim(VerbatimKind::Code, Attributes::new(), input)],
        }
    }

    fn parse_inlines(&self, input: &str, _: &str) -> InlineSlice {
        text_inlines(input)
    }
}

/// Byte offset of the `<svg` element after prolog, doctype and comments
pub fn svg_start(text: &str) -> Option<usize> {
    let mut pos = 0;
    loop {
        let rest = &text[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.starts_with("<svg") {
            return Some(pos);
        }
        let close = if trimmed.starts_with("<?xml") {
            "?>"
        } else if trimmed.starts_with("<!--") {
            "-->"
        } else if trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<!doctype") {
            ">"
        } else {
            return None;
        };
        let end = trimmed.find(close)?;
        pos += end + close.len();
    }
}

struct NoneParser;

impl SyntaxParser for NoneParser {
    fn parse_blocks(&self, _: &[u8], _: &Meta, _: &str, _: &ParseConfig) -> BlockSlice {
        Vec::new()
    }

    fn parse_inlines(&self, _: &str, _: &str) -> InlineSlice {
        Vec::new()
    }
}

pub(super) fn infos() -> Vec<ParserInfo> {
    vec![
        ParserInfo {
            name: "txt",
            alt_names: &["plain", "text"],
            is_ast_parser: false,
            is_text_format: true,
            is_image_format: false,
            parser: Box::new(VerbatimParser {
                kind: VerbatimKind::Code,
                default_attr: None,
            }),
        },
        ParserInfo {
            name: "css",
            alt_names: &[],
            is_ast_parser: false,
            is_text_format: true,
            is_image_format: false,
            parser: Box::new(VerbatimParser {
                kind: VerbatimKind::Code,
                default_attr: Some("css"),
            }),
        },
        ParserInfo {
            name: "html",
            alt_names: &[],
            is_ast_parser: false,
            is_text_format: true,
            is_image_format: false,
            parser: Box::new(HtmlParser),
        },
        ParserInfo {
            name: "sxn",
            alt_names: &[],
            is_ast_parser: false,
            is_text_format: true,
            is_image_format: false,
            parser: Box::new(SxnParser),
        },
        ParserInfo {
            name: "svg",
            alt_names: &[],
            is_ast_parser: false,
            is_text_format: true,
            is_image_format: true,
            parser: Box::new(SvgParser),
        },
        ParserInfo {
            name: "none",
            alt_names: &[],
            is_ast_parser: false,
            is_text_format: false,
            is_image_format: false,
            parser: Box::new(NoneParser),
        },
    ]
}
