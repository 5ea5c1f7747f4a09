// SPDX-License-Identifier: AGPL-3.0-or-later
//! Encoder for the textual canonical form

use std::io::Write;

use crate::ast::{BlockSlice, InlineSlice};
use crate::meta::Meta;
use crate::sx::Sx;
use crate::sz::{inline_to_sx, to_sx, Sym};
use crate::traits::{write_str, Encoder, Result};
use crate::zettel::ZettelNode;

pub struct SzEncoder;

/// Metadata as a list of `("key" "value")` pairs
pub fn meta_to_sx(meta: &Meta) -> Sx {
    Sx::List(
        meta.iter()
            .map(|(key, value)| Sx::List(vec![Sx::string(key), Sx::string(value)]))
            .collect(),
    )
}

impl Encoder for SzEncoder {
    fn write_zettel(&self, w: &mut dyn Write, zn: &ZettelNode) -> Result<usize> {
        let mut output = meta_to_sx(&zn.inherited).print();
        output.push('\n');
        output.push_str(&to_sx(&zn.blocks).print());
        write_str(w, &output)
    }

    fn write_meta(&self, w: &mut dyn Write, meta: &Meta) -> Result<usize> {
        write_str(w, &meta_to_sx(meta).print())
    }

    fn write_blocks(&self, w: &mut dyn Write, blocks: &BlockSlice) -> Result<usize> {
        write_str(w, &to_sx(blocks).print())
    }

    fn write_inlines(&self, w: &mut dyn Write, inlines: &InlineSlice) -> Result<usize> {
        let mut list = vec![Sym::Inline.to_sx()];
        list.extend(inlines.iter().map(inline_to_sx));
        write_str(w, &Sx::List(list).print())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::InlineNode;
    use crate::id::ZettelId;
    use crate::parser::zettelmark::parse_document;
    use crate::sz::parse_sz;
    use pretty_assertions::assert_eq;

    fn encode_blocks(blocks: &BlockSlice) -> String {
        let mut out = Vec::new();
        SzEncoder.write_blocks(&mut out, blocks).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_bold_paragraph() {
        let blocks = parse_document("**bold**");
        assert_eq!(
            encode_blocks(&blocks),
            r#"(BLOCK (PARA (FORMAT-STRONG () (TEXT "bold"))))"#
        );
    }

    #[test]
    fn test_output_reads_back() {
        let blocks = parse_document("= Title\n\n* a\n* b {.x}\n\n```rust\nfn main() {}\n```");
        assert_eq!(parse_sz(&encode_blocks(&blocks)).unwrap(), blocks);
    }

    #[test]
    fn test_meta_and_inlines() {
        let meta = Meta::new(ZettelId::new(20240101000000).unwrap())
            .with("title", "A \"title\"")
            .with("lang", "en");
        let mut out = Vec::new();
        SzEncoder.write_meta(&mut out, &meta).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"(("lang" "en") ("title" "A \"title\""))"#
        );

        let mut out = Vec::new();
        let n = SzEncoder
            .write_inlines(&mut out, &vec![InlineNode::text("x"), InlineNode::Soft])
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), r#"(INLINE (TEXT "x") (SOFT))"#);
        assert_eq!(n, 26);
    }
}
