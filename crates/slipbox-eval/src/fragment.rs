// SPDX-License-Identifier: AGPL-3.0-or-later
//! Extraction of the part of a zettel that a fragment reference names

use slipbox_core::ast::{BlockNode, BlockSlice, InlineNode, InlineSlice};

/// Content after the heading or mark whose fragment is `fragment`
///
/// A heading yields the following blocks up to the next heading of the same
/// or a higher level. A mark yields the rest of its paragraph and the
/// following blocks up to the next heading. `None` when nothing matches or
/// the anchor is followed by nothing.
pub fn extract(blocks: &BlockSlice, fragment: &str) -> Option<BlockSlice> {
    for (idx, block) in blocks.iter().enumerate() {
        if let BlockNode::Heading {
            level,
            fragment: found,
            ..
        } = block
        {
            if found == fragment {
                let content: BlockSlice = blocks[idx + 1..]
                    .iter()
                    .take_while(|b| !matches!(b, BlockNode::Heading { level: l, .. } if l <= level))
                    .cloned()
                    .collect();
                return (!content.is_empty()).then_some(content);
            }
        }
        if let Some(anchor) = mark_anchor(block, fragment) {
            let mut content = Vec::new();
            match anchor {
                Anchor::Rest(rest) if rest.is_empty() => {}
                Anchor::Rest(rest) => content.push(BlockNode::para(rest)),
                Anchor::Whole => content.push(block.clone()),
            }
            content.extend(
                blocks[idx + 1..]
                    .iter()
                    .take_while(|b| !matches!(b, BlockNode::Heading { .. }))
                    .cloned(),
            );
            return (!content.is_empty()).then_some(content);
        }
    }
    None
}

enum Anchor {
    /// Inlines after a mark at the top level of a paragraph
    Rest(InlineSlice),
    /// The mark is nested deeper; the whole block is kept
    Whole,
}

fn mark_anchor(block: &BlockNode, fragment: &str) -> Option<Anchor> {
    if let BlockNode::Para { inlines } = block {
        if let Some(pos) = inlines.iter().position(|i| is_mark(i, fragment)) {
            let mut rest: InlineSlice = inlines[pos + 1..]
                .iter()
                .skip_while(|i| i.is_break())
                .cloned()
                .collect();
            if let Some(InlineNode::Text { text }) = rest.first_mut() {
                *text = text.trim_start().to_string();
                if text.is_empty() {
                    rest.remove(0);
                }
            }
            return Some(Anchor::Rest(rest));
        }
    }
    if matches!(block, BlockNode::Heading { .. }) {
        return None;
    }
    block_contains_mark(block, fragment).then_some(Anchor::Whole)
}

fn is_mark(inline: &InlineNode, fragment: &str) -> bool {
    matches!(inline, InlineNode::Mark { fragment: found, .. } if found == fragment)
}

fn contains_mark(inlines: &InlineSlice, fragment: &str) -> bool {
    inlines.iter().any(|inline| {
        is_mark(inline, fragment)
            || match inline {
                InlineNode::Link { inlines, .. }
                | InlineNode::Embed { inlines, .. }
                | InlineNode::EmbedBlob { inlines, .. }
                | InlineNode::Cite { inlines, .. }
                | InlineNode::Mark { inlines, .. }
                | InlineNode::Footnote { inlines, .. }
                | InlineNode::Format { inlines, .. } => contains_mark(inlines, fragment),
                _ => false,
            }
    })
}

fn block_contains_mark(block: &BlockNode, fragment: &str) -> bool {
    let in_blocks = |blocks: &BlockSlice| blocks.iter().any(|b| block_contains_mark(b, fragment));
    match block {
        BlockNode::Para { inlines } | BlockNode::Heading { inlines, .. } => {
            contains_mark(inlines, fragment)
        }
        BlockNode::NestedList { items, .. } => items.iter().any(in_blocks),
        BlockNode::DescriptionList { entries, .. } => entries.iter().any(|entry| {
            contains_mark(&entry.term, fragment) || entry.descriptions.iter().any(in_blocks)
        }),
        BlockNode::Table { header, rows, .. } => header
            .iter()
            .chain(rows.iter().flatten())
            .any(|cell| contains_mark(&cell.inlines, fragment)),
        BlockNode::Region {
            blocks, inlines, ..
        } => in_blocks(blocks) || contains_mark(inlines, fragment),
        BlockNode::Transclude { inlines, .. } => contains_mark(inlines, fragment),
        BlockNode::Hrule { .. }
        | BlockNode::Verbatim { .. }
        | BlockNode::Blob { .. }
        | BlockNode::Unknown { .. } => false,
    }
}
