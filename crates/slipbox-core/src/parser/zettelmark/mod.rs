// SPDX-License-Identifier: AGPL-3.0-or-later
//! Zettelmarkup, the native markup of a slip box
//!
//! Parsing happens in two levels: [`block`] splits the text into lines and
//! recognises block structure, [`inline`] parses the text of paragraphs,
//! headings, terms and table cells.

pub(crate) mod attrs;
mod block;
pub(crate) mod inline;

use super::ParserInfo;
use crate::ast::{BlockSlice, InlineSlice};
use crate::config::ParseConfig;
use crate::meta::Meta;
use crate::traits::SyntaxParser;

pub use block::parse_document;

/// Registered name of Zettelmarkup
pub const SYNTAX: &str = "zmk";

struct ZmkParser;

impl SyntaxParser for ZmkParser {
    fn parse_blocks(&self, input: &[u8], _: &Meta, _: &str, _: &ParseConfig) -> BlockSlice {
        parse_document(&String::from_utf8_lossy(input))
    }

    fn parse_inlines(&self, input: &str, _: &str) -> InlineSlice {
        inline::parse_inlines(input)
    }
}

pub(super) fn info() -> ParserInfo {
    ParserInfo {
        name: SYNTAX,
        alt_names: &[],
        is_ast_parser: true,
        is_text_format: true,
        is_image_format: false,
        parser: Box::new(ZmkParser),
    }
}
