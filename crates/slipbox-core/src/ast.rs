// SPDX-License-Identifier: AGPL-3.0-or-later
//! Typed zettel AST
//!
//! Every syntax parser produces this tree and every encoder consumes it. The
//! symbolic canonical form (see [`crate::sz`]) is derived from it on demand.
//! Nodes the transformer cannot type are preserved as `Unknown` so that
//! encoders can show them instead of dropping content.

use crate::attrs::Attributes;
use crate::reference::Reference;
use crate::sx::Sx;
use serde::{Deserialize, Serialize};

pub type BlockSlice = Vec<BlockNode>;
pub type InlineSlice = Vec<InlineNode>;

/// Block-level nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockNode {
    Para {
        inlines: InlineSlice,
    },

    /// Heading with level 1-6
    Heading {
        level: u8,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        #[serde(default)]
        slug: String,
        #[serde(default)]
        fragment: String,
        inlines: InlineSlice,
    },

    /// Thematic break
    Hrule {
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
    },

    /// Ordered, unordered or quotation list; every item is a block slice
    NestedList {
        kind: NestedListKind,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        items: Vec<BlockSlice>,
    },

    DescriptionList {
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        entries: Vec<Description>,
    },

    Table {
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        header: Vec<TableCell>,
        rows: Vec<Vec<TableCell>>,
    },

    /// Fenced region with nested blocks and an optional inline trailer
    Region {
        kind: RegionKind,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        blocks: BlockSlice,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        inlines: InlineSlice,
    },

    /// Fenced raw content
    Verbatim {
        kind: VerbatimKind,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        content: String,
    },

    /// Block-level inclusion of another zettel, fragment or query
    Transclude {
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        reference: Reference,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        inlines: InlineSlice,
    },

    /// Binary or image content
    Blob {
        description: InlineSlice,
        syntax: String,
        data: Vec<u8>,
    },

    /// Canonical node without a typed counterpart
    Unknown {
        node: Sx,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestedListKind {
    Ordered,
    Unordered,
    Quote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub term: InlineSlice,
    pub descriptions: Vec<BlockSlice>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Default,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub align: Alignment,
    pub inlines: InlineSlice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Block,
    Quote,
    Verse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbatimKind {
    Code,
    Comment,
    Eval,
    Html,
    Math,
}

/// Inline-level nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineNode {
    Text {
        text: String,
    },

    Soft,

    Hard,

    Link {
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        reference: Reference,
        #[serde(default)]
        inlines: InlineSlice,
    },

    /// Inline inclusion by reference, usually an image
    Embed {
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        reference: Reference,
        #[serde(default)]
        syntax: String,
        #[serde(default)]
        inlines: InlineSlice,
    },

    /// Inline image whose bytes are already resolved
    EmbedBlob {
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        syntax: String,
        data: Vec<u8>,
        #[serde(default)]
        inlines: InlineSlice,
    },

    Cite {
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        key: String,
        #[serde(default)]
        inlines: InlineSlice,
    },

    /// Named anchor; slug and fragment are filled in by the cleaner
    Mark {
        mark: String,
        #[serde(default)]
        slug: String,
        #[serde(default)]
        fragment: String,
        #[serde(default)]
        inlines: InlineSlice,
    },

    Footnote {
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        inlines: InlineSlice,
    },

    Format {
        kind: FormatKind,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        inlines: InlineSlice,
    },

    Literal {
        kind: LiteralKind,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attrs: Attributes,
        content: String,
    },

    Unknown {
        node: Sx,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Emph,
    Strong,
    Insert,
    Delete,
    Super,
    Sub,
    Quote,
    Mark,
    Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    Code,
    Input,
    Output,
    Comment,
    Html,
    Math,
}

impl BlockNode {
    pub fn para(inlines: InlineSlice) -> Self {
        BlockNode::Para { inlines }
    }

    /// Inline slice of a paragraph
    pub fn as_para(&self) -> Option<&InlineSlice> {
        match self {
            BlockNode::Para { inlines } => Some(inlines),
            _ => None,
        }
    }
}

impl InlineNode {
    pub fn text(text: impl Into<String>) -> Self {
        InlineNode::Text { text: text.into() }
    }

    /// Strong text with class `error`, the visible form of a failure
    pub fn error(message: impl Into<String>) -> Self {
        InlineNode::Format {
            kind: FormatKind::Strong,
            attrs: Attributes::new().with("class", "error"),
            inlines: vec![InlineNode::text(message)],
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, InlineNode::Soft | InlineNode::Hard)
    }
}

/// Merge adjacent text nodes and drop empty ones
pub fn merge_texts(inlines: InlineSlice) -> InlineSlice {
    let mut result: InlineSlice = Vec::with_capacity(inlines.len());
    for node in inlines {
        match node {
            InlineNode::Text { text } if text.is_empty() => {}
            InlineNode::Text { text } => match result.last_mut() {
                Some(InlineNode::Text { text: prev }) => prev.push_str(&text),
                _ => result.push(InlineNode::Text { text }),
            },
            other => result.push(other),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_texts() {
        let merged = merge_texts(vec![
            InlineNode::text("a"),
            InlineNode::text(""),
            InlineNode::text("b"),
            InlineNode::Soft,
            InlineNode::text("c"),
        ]);
        assert_eq!(
            merged,
            vec![InlineNode::text("ab"), InlineNode::Soft, InlineNode::text("c")]
        );
    }

    #[test]
    fn test_error_node_shape() {
        match InlineNode::error("boom") {
            InlineNode::Format { kind, attrs, inlines } => {
                assert_eq!(kind, FormatKind::Strong);
                assert_eq!(attrs.get("class"), Some("error"));
                assert_eq!(inlines, vec![InlineNode::text("boom")]);
            }
            other => panic!("unexpected node {other:?}"),
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn text_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ]{1,12}"
    }

    fn leaf_inline_strategy() -> impl Strategy<Value = InlineNode> {
        prop_oneof![
            text_strategy().prop_map(InlineNode::text),
            Just(InlineNode::Soft),
            Just(InlineNode::Hard),
            text_strategy().prop_map(|content| InlineNode::Literal {
                kind: LiteralKind::Code,
                attrs: Attributes::new(),
                content,
            }),
        ]
    }

    fn inline_strategy() -> impl Strategy<Value = InlineNode> {
        leaf_inline_strategy().prop_recursive(3, 16, 4, |inner| {
            prop::collection::vec(inner, 0..4).prop_map(|inlines| InlineNode::Format {
                kind: FormatKind::Emph,
                attrs: Attributes::new(),
                inlines,
            })
        })
    }

    fn block_strategy() -> impl Strategy<Value = BlockNode> {
        prop_oneof![
            prop::collection::vec(inline_strategy(), 0..5).prop_map(BlockNode::para),
            (1u8..=6, prop::collection::vec(inline_strategy(), 1..4)).prop_map(
                |(level, inlines)| BlockNode::Heading {
                    level,
                    attrs: Attributes::new(),
                    slug: String::new(),
                    fragment: String::new(),
                    inlines,
                }
            ),
            text_strategy().prop_map(|content| BlockNode::Verbatim {
                kind: VerbatimKind::Code,
                attrs: Attributes::new().with("-", "rust"),
                content,
            }),
            Just(BlockNode::Hrule {
                attrs: Attributes::new()
            }),
        ]
    }

    proptest! {
        // Property: JSON serialization of block slices is lossless
        #[test]
        fn prop_block_serde_roundtrip(blocks in prop::collection::vec(block_strategy(), 0..8)) {
            let json = serde_json::to_string(&blocks).expect("serialize");
            let back: BlockSlice = serde_json::from_str(&json).expect("deserialize");
            prop_assert_eq!(blocks, back);
        }

        // Property: merging never changes the concatenated text
        #[test]
        fn prop_merge_texts_keeps_text(parts in prop::collection::vec("[a-z]{0,4}", 0..8)) {
            let inlines: InlineSlice = parts.iter().map(InlineNode::text).collect();
            let merged = merge_texts(inlines);
            let joined: String = merged
                .iter()
                .filter_map(|n| match n {
                    InlineNode::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            prop_assert_eq!(joined, parts.concat());
            prop_assert!(merged.len() <= 1);
        }
    }
}
