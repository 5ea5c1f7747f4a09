// SPDX-License-Identifier: AGPL-3.0-or-later
//! Markdown parser using comrak
//!
//! CommonMark with the strikethrough, table and autolink extensions. Block
//! quotes become quote lists with a single item; raw HTML is kept only when
//! the configuration allows it.

use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena, Options};

use super::ParserInfo;
use crate::ast::{
    merge_texts, Alignment, BlockNode, BlockSlice, FormatKind, InlineNode, InlineSlice,
    LiteralKind, NestedListKind, TableCell, VerbatimKind,
};
use crate::attrs::{Attributes, DEFAULT_KEY};
use crate::config::ParseConfig;
use crate::meta::Meta;
use crate::reference::Reference;
use crate::traits::SyntaxParser;

struct MarkdownParser;

fn comrak_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options
}

impl SyntaxParser for MarkdownParser {
    fn parse_blocks(&self, input: &[u8], _: &Meta, _: &str, config: &ParseConfig) -> BlockSlice {
        let text = String::from_utf8_lossy(input);
        let arena = Arena::new();
        let root = parse_document(&arena, &text, &comrak_options());
        parse_children(root, config.allow_html)
    }

    fn parse_inlines(&self, input: &str, _: &str) -> InlineSlice {
        let arena = Arena::new();
        let root = parse_document(&arena, input, &comrak_options());
        let mut inlines = Vec::new();
        for block in parse_children(root, false) {
            if let BlockNode::Para { inlines: para } = block {
                if !inlines.is_empty() {
                    inlines.push(InlineNode::Soft);
                }
                inlines.extend(para);
            }
        }
        inlines
    }
}

pub(super) fn info() -> ParserInfo {
    ParserInfo {
        name: "markdown",
        alt_names: &["md"],
        is_ast_parser: true,
        is_text_format: true,
        is_image_format: false,
        parser: Box::new(MarkdownParser),
    }
}

fn parse_children<'a>(node: &'a AstNode<'a>, allow_html: bool) -> BlockSlice {
    node.children()
        .filter_map(|child| parse_node(child, allow_html))
        .collect()
}

fn parse_node<'a>(node: &'a AstNode<'a>, allow_html: bool) -> Option<BlockNode> {
    let data = node.data.borrow();

    match &data.value {
        NodeValue::Paragraph => {
            let inlines = parse_inlines(node, allow_html);
            (!inlines.is_empty()).then(|| BlockNode::para(inlines))
        }

        NodeValue::Heading(heading) => Some(BlockNode::Heading {
            level: heading.level,
            attrs: Attributes::new(),
            slug: String::new(),
            fragment: String::new(),
            inlines: parse_inlines(node, allow_html),
        }),

        NodeValue::CodeBlock(code) => {
            let attrs = match code.info.split_whitespace().next() {
                Some(lang) => Attributes::new().with(DEFAULT_KEY, lang),
                None => Attributes::new(),
            };
            Some(BlockNode::Verbatim {
                kind: VerbatimKind::Code,
                attrs,
                content: strip_final_newline(&code.literal),
            })
        }

        NodeValue::BlockQuote => Some(BlockNode::NestedList {
            kind: NestedListKind::Quote,
            attrs: Attributes::new(),
            items: vec![parse_children(node, allow_html)],
        }),

        NodeValue::List(list) => {
            let kind = if list.list_type == ListType::Ordered {
                NestedListKind::Ordered
            } else {
                NestedListKind::Unordered
            };
            let items = node
                .children()
                .map(|item| parse_children(item, allow_html))
                .collect();
            Some(BlockNode::NestedList {
                kind,
                attrs: Attributes::new(),
                items,
            })
        }

        NodeValue::ThematicBreak => Some(BlockNode::Hrule {
            attrs: Attributes::new(),
        }),

        NodeValue::Table(table) => {
            let alignments: Vec<Alignment> =
                table.alignments.iter().map(|a| alignment(*a)).collect();
            let mut header = Vec::new();
            let mut rows = Vec::new();
            for child in node.children() {
                let NodeValue::TableRow(is_header) = child.data.borrow().value else {
                    continue;
                };
                let cells: Vec<TableCell> = child
                    .children()
                    .enumerate()
                    .map(|(col, cell)| TableCell {
                        align: alignments.get(col).copied().unwrap_or_default(),
                        inlines: parse_inlines(cell, allow_html),
                    })
                    .collect();
                if is_header {
                    header = cells;
                } else {
                    rows.push(cells);
                }
            }
            Some(BlockNode::Table {
                attrs: Attributes::new(),
                header,
                rows,
            })
        }

        NodeValue::HtmlBlock(html) => {
            let content = strip_final_newline(&html.literal);
            Some(if allow_html {
                BlockNode::Verbatim {
                    kind: VerbatimKind::Html,
                    attrs: Attributes::new(),
                    content,
                }
            } else {
                BlockNode::Verbatim {
                    kind: VerbatimKind::Code,
                    attrs: Attributes::new().with(DEFAULT_KEY, "html"),
                    content,
                }
            })
        }

        other => {
            tracing::trace!(node = ?other, "skipping markdown block");
            None
        }
    }
}

fn alignment(align: TableAlignment) -> Alignment {
    match align {
        TableAlignment::None => Alignment::Default,
        TableAlignment::Left => Alignment::Left,
        TableAlignment::Center => Alignment::Center,
        TableAlignment::Right => Alignment::Right,
    }
}

fn strip_final_newline(text: &str) -> String {
    text.strip_suffix('\n').unwrap_or(text).to_string()
}

fn parse_inlines<'a>(node: &'a AstNode<'a>, allow_html: bool) -> InlineSlice {
    merge_texts(
        node.children()
            .filter_map(|child| parse_inline(child, allow_html))
            .collect(),
    )
}

fn titled(title: &str) -> Attributes {
    if title.is_empty() {
        Attributes::new()
    } else {
        Attributes::new().with("title", title)
    }
}

fn format(kind: FormatKind, inlines: InlineSlice) -> InlineNode {
    InlineNode::Format {
        kind,
        attrs: Attributes::new(),
        inlines,
    }
}

fn parse_inline<'a>(node: &'a AstNode<'a>, allow_html: bool) -> Option<InlineNode> {
    let data = node.data.borrow();

    match &data.value {
        NodeValue::Text(text) => Some(InlineNode::text(text.clone())),

        NodeValue::SoftBreak => Some(InlineNode::Soft),

        NodeValue::LineBreak => Some(InlineNode::Hard),

        NodeValue::Code(code) => Some(InlineNode::Literal {
            kind: LiteralKind::Code,
            attrs: Attributes::new(),
            content: code.literal.clone(),
        }),

        NodeValue::Emph => Some(format(FormatKind::Emph, parse_inlines(node, allow_html))),

        NodeValue::Strong => Some(format(FormatKind::Strong, parse_inlines(node, allow_html))),

        NodeValue::Strikethrough => {
            Some(format(FormatKind::Delete, parse_inlines(node, allow_html)))
        }

        NodeValue::Link(link) => Some(InlineNode::Link {
            attrs: titled(&link.title),
            reference: Reference::parse(&link.url),
            inlines: parse_inlines(node, allow_html),
        }),

        NodeValue::Image(image) => Some(InlineNode::Embed {
            attrs: titled(&image.title),
            reference: Reference::parse(&image.url),
            syntax: String::new(),
            inlines: parse_inlines(node, allow_html),
        }),

        NodeValue::HtmlInline(html) => Some(if allow_html {
            InlineNode::Literal {
                kind: LiteralKind::Html,
                attrs: Attributes::new(),
                content: html.clone(),
            }
        } else {
            InlineNode::Literal {
                kind: LiteralKind::Code,
                attrs: Attributes::new().with(DEFAULT_KEY, "html"),
                content: html.clone(),
            }
        }),

        other => {
            tracing::trace!(node = ?other, "skipping markdown inline");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ZettelId;
    use crate::reference::RefState;
    use pretty_assertions::assert_eq;

    fn parse(input: &str, allow_html: bool) -> BlockSlice {
        let config = ParseConfig {
            allow_html,
            ..ParseConfig::default()
        };
        let meta = Meta::new(ZettelId::new(20240101000000).unwrap());
        MarkdownParser.parse_blocks(input.as_bytes(), &meta, "md", &config)
    }

    #[test]
    fn test_heading_and_formats() {
        let blocks = parse("# Title\n\nSome *emph* and **strong** ~~gone~~", false);
        assert!(matches!(&blocks[0], BlockNode::Heading { level: 1, inlines, .. }
            if inlines == &vec![InlineNode::text("Title")]));
        assert_eq!(
            blocks[1],
            BlockNode::para(vec![
                InlineNode::text("Some "),
                format(FormatKind::Emph, vec![InlineNode::text("emph")]),
                InlineNode::text(" and "),
                format(FormatKind::Strong, vec![InlineNode::text("strong")]),
                InlineNode::text(" "),
                format(FormatKind::Delete, vec![InlineNode::text("gone")]),
            ])
        );
    }

    #[test]
    fn test_entities_merge_into_one_text() {
        assert_eq!(
            parse("Tom &amp; Jerry", false),
            vec![BlockNode::para(vec![InlineNode::text("Tom & Jerry")])]
        );
    }

    #[test]
    fn test_code_block_language() {
        assert_eq!(
            parse("```rust ignore\nfn main() {}\n```\n", false),
            vec![BlockNode::Verbatim {
                kind: VerbatimKind::Code,
                attrs: Attributes::new().with(DEFAULT_KEY, "rust"),
                content: "fn main() {}".into(),
            }]
        );
    }

    #[test]
    fn test_block_quote_is_quote_list() {
        assert_eq!(
            parse("> quoted\n>\n> more", false),
            vec![BlockNode::NestedList {
                kind: NestedListKind::Quote,
                attrs: Attributes::new(),
                items: vec![vec![
                    BlockNode::para(vec![InlineNode::text("quoted")]),
                    BlockNode::para(vec![InlineNode::text("more")]),
                ]],
            }]
        );
    }

    #[test]
    fn test_lists() {
        let blocks = parse("1. one\n2. two\n\n- a\n  - b\n", false);
        assert!(matches!(&blocks[0], BlockNode::NestedList { kind: NestedListKind::Ordered, items, .. }
            if items.len() == 2));
        match &blocks[1] {
            BlockNode::NestedList { kind, items, .. } => {
                assert_eq!(*kind, NestedListKind::Unordered);
                assert!(matches!(items[0][1], BlockNode::NestedList { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_links_and_images() {
        let blocks = parse("[text](https://example.org \"T\") ![alt](img.png) <https://a.b>", false);
        let BlockNode::Para { inlines } = &blocks[0] else {
            panic!("no paragraph");
        };
        match &inlines[0] {
            InlineNode::Link {
                attrs, reference, ..
            } => {
                assert_eq!(reference.state, RefState::External);
                assert_eq!(attrs.get("title"), Some("T"));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &inlines[2] {
            InlineNode::Embed {
                reference, inlines, ..
            } => {
                assert_eq!(reference.value, "img.png");
                assert_eq!(inlines, &vec![InlineNode::text("alt")]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(&inlines[4], InlineNode::Link { reference, .. }
            if reference.value == "https://a.b"));
    }

    #[test]
    fn test_table_alignment() {
        let blocks = parse("| a | b |\n|:--|--:|\n| 1 | 2 |\n", false);
        match &blocks[0] {
            BlockNode::Table { header, rows, .. } => {
                assert_eq!(header[0].align, Alignment::Left);
                assert_eq!(rows[0][1].align, Alignment::Right);
                assert_eq!(rows[0][1].inlines, vec![InlineNode::text("2")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_html_depends_on_config() {
        let kept = parse("<div>x</div>\n\na <b>y</b>", true);
        assert!(matches!(&kept[0], BlockNode::Verbatim { kind: VerbatimKind::Html, content, .. }
            if content == "<div>x</div>"));
        let BlockNode::Para { inlines } = &kept[1] else {
            panic!("no paragraph");
        };
        assert!(matches!(&inlines[1], InlineNode::Literal { kind: LiteralKind::Html, .. }));

        let escaped = parse("<div>x</div>", false);
        assert!(matches!(&escaped[0], BlockNode::Verbatim { kind: VerbatimKind::Code, attrs, .. }
            if attrs.default_value() == Some("html")));
    }

    #[test]
    fn test_inline_parse() {
        assert_eq!(
            MarkdownParser.parse_inlines("a *b*", "md"),
            vec![
                InlineNode::text("a "),
                format(FormatKind::Emph, vec![InlineNode::text("b")])
            ]
        );
    }
}
