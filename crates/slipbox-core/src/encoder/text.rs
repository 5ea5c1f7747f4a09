// SPDX-License-Identifier: AGPL-3.0-or-later
//! Plain text encoder
//!
//! Drops all formatting and keeps only readable text. Its inline form is also
//! what slugs are derived from.

use std::io::Write;

use crate::ast::{BlockNode, BlockSlice, InlineNode, InlineSlice, LiteralKind, VerbatimKind};
use crate::meta::Meta;
use crate::sx::Sx;
use crate::traits::{write_str, Encoder, Result};
use crate::zettel::ZettelNode;

pub struct TextEncoder;

impl Encoder for TextEncoder {
    fn write_zettel(&self, w: &mut dyn Write, zn: &ZettelNode) -> Result<usize> {
        let mut output = meta_text(&zn.inherited);
        let content = blocks_text(&zn.blocks);
        if !output.is_empty() && !content.is_empty() {
            output.push('\n');
        }
        output.push_str(&content);
        write_str(w, &output)
    }

    fn write_meta(&self, w: &mut dyn Write, meta: &Meta) -> Result<usize> {
        write_str(w, &meta_text(meta))
    }

    fn write_blocks(&self, w: &mut dyn Write, blocks: &BlockSlice) -> Result<usize> {
        write_str(w, &blocks_text(blocks))
    }

    fn write_inlines(&self, w: &mut dyn Write, inlines: &InlineSlice) -> Result<usize> {
        write_str(w, &plain_text(inlines))
    }
}

/// One value per line
fn meta_text(meta: &Meta) -> String {
    let mut output = String::new();
    for (_, value) in meta.iter() {
        output.push_str(value);
        output.push('\n');
    }
    output
}

/// Visible stand-in for a node the canonical tree could not type
pub fn unknown_text(node: &Sx) -> String {
    format!("[unknown: {}]", node.print())
}

/// Text of an inline slice without any markup
pub fn plain_text(inlines: &InlineSlice) -> String {
    let mut output = String::new();
    push_inlines(&mut output, inlines);
    output
}

fn push_inlines(output: &mut String, inlines: &InlineSlice) {
    for inline in inlines {
        push_inline(output, inline);
    }
}

fn push_inline(output: &mut String, inline: &InlineNode) {
    match inline {
        InlineNode::Text { text } => output.push_str(text),
        InlineNode::Soft => output.push(' '),
        InlineNode::Hard => output.push('\n'),
        InlineNode::Link { inlines, .. }
        | InlineNode::Embed { inlines, .. }
        | InlineNode::EmbedBlob { inlines, .. }
        | InlineNode::Cite { inlines, .. }
        | InlineNode::Mark { inlines, .. }
        | InlineNode::Format { inlines, .. } => push_inlines(output, inlines),
        InlineNode::Literal { kind, content, .. } => match kind {
            LiteralKind::Comment | LiteralKind::Html => {}
            _ => output.push_str(content),
        },
        InlineNode::Unknown { node } => output.push_str(&unknown_text(node)),
        InlineNode::Footnote { .. } => {}
    }
}

/// Text of a block slice, one line (or more) per block
pub fn blocks_text(blocks: &BlockSlice) -> String {
    let mut parts: Vec<String> = Vec::new();
    for block in blocks {
        push_block(&mut parts, block);
    }
    parts.join("\n")
}

fn push_block(parts: &mut Vec<String>, block: &BlockNode) {
    match block {
        BlockNode::Para { inlines } | BlockNode::Heading { inlines, .. } => {
            parts.push(plain_text(inlines));
        }
        BlockNode::NestedList { items, .. } => {
            for item in items {
                for block in item {
                    push_block(parts, block);
                }
            }
        }
        BlockNode::DescriptionList { entries, .. } => {
            for entry in entries {
                parts.push(plain_text(&entry.term));
                for description in &entry.descriptions {
                    for block in description {
                        push_block(parts, block);
                    }
                }
            }
        }
        BlockNode::Table { header, rows, .. } => {
            for row in std::iter::once(header).chain(rows.iter()) {
                if row.is_empty() {
                    continue;
                }
                let cells: Vec<String> = row.iter().map(|cell| plain_text(&cell.inlines)).collect();
                parts.push(cells.join(" "));
            }
        }
        BlockNode::Region {
            blocks, inlines, ..
        } => {
            for block in blocks {
                push_block(parts, block);
            }
            if !inlines.is_empty() {
                parts.push(plain_text(inlines));
            }
        }
        BlockNode::Verbatim { kind, content, .. } => match kind {
            VerbatimKind::Comment | VerbatimKind::Html => {}
            _ => parts.push(content.clone()),
        },
        BlockNode::Unknown { node } => parts.push(unknown_text(node)),
        BlockNode::Hrule { .. } | BlockNode::Transclude { .. } | BlockNode::Blob { .. } => {}
    }
}
