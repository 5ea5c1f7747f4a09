// SPDX-License-Identifier: AGPL-3.0-or-later
//! Binary image formats

use super::{parse_meta_inlines, ParserInfo};
use crate::ast::{BlockNode, BlockSlice, InlineNode, InlineSlice};
use crate::config::ParseConfig;
use crate::meta::{Meta, KEY_SUMMARY, KEY_TITLE};
use crate::traits::SyntaxParser;

struct BlobParser;

impl SyntaxParser for BlobParser {
    fn parse_blocks(&self, input: &[u8], meta: &Meta, syntax: &str, _: &ParseConfig) -> BlockSlice {
        vec![blob_node(meta, syntax, input.to_vec())]
    }

    fn parse_inlines(&self, _: &str, _: &str) -> InlineSlice {
        Vec::new()
    }
}

/// BLOB node described by the zettel's summary or title
pub fn blob_node(meta: &Meta, syntax: &str, data: Vec<u8>) -> BlockNode {
    BlockNode::Blob {
        description: blob_description(meta),
        syntax: syntax.to_string(),
        data,
    }
}

pub fn blob_description(meta: &Meta) -> InlineSlice {
    match meta
        .get_non_empty(KEY_SUMMARY)
        .or_else(|| meta.get_non_empty(KEY_TITLE))
    {
        Some(text) => parse_meta_inlines(text),
        None => vec![InlineNode::text(format!("Zettel without title: {}", meta.zid))],
    }
}

fn image(name: &'static str, alt_names: &'static [&'static str]) -> ParserInfo {
    ParserInfo {
        name,
        alt_names,
        is_ast_parser: false,
        is_text_format: false,
        is_image_format: true,
        parser: Box::new(BlobParser),
    }
}

pub(super) fn infos() -> Vec<ParserInfo> {
    vec![
        image("gif", &[]),
        image("jpeg", &["jpg"]),
        image("png", &[]),
        image("webp", &[]),
    ]
}
