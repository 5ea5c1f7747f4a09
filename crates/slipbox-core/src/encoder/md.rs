// SPDX-License-Identifier: AGPL-3.0-or-later
//! CommonMark encoder
//!
//! Nodes without a Markdown counterpart (tables, description lists, BLOBs)
//! are replaced by an HTML comment that names them.

use std::io::Write;

use crate::ast::{
    BlockNode, BlockSlice, FormatKind, InlineNode, InlineSlice, LiteralKind, NestedListKind,
    RegionKind, VerbatimKind,
};
use crate::meta::Meta;
use crate::reference::RefState;
use crate::traits::{write_str, EncodeError, Encoder, Result};
use crate::zettel::ZettelNode;

use super::text::unknown_text;

pub struct MdEncoder;

impl Encoder for MdEncoder {
    fn write_zettel(&self, w: &mut dyn Write, zn: &ZettelNode) -> Result<usize> {
        self.write_blocks(w, &zn.blocks)
    }

    fn write_meta(&self, _: &mut dyn Write, _: &Meta) -> Result<usize> {
        Err(EncodeError::NotImplemented {
            encoder: "md",
            operation: "write_meta",
        })
    }

    fn write_blocks(&self, w: &mut dyn Write, blocks: &BlockSlice) -> Result<usize> {
        let mut env = Env::default();
        let mut output = env.blocks(blocks);
        if !env.notes.is_empty() {
            for (idx, note) in env.notes.iter().enumerate() {
                output.push_str(&format!("\n\n[^{}]: {note}", idx + 1));
            }
        }
        write_str(w, &output)
    }

    fn write_inlines(&self, w: &mut dyn Write, inlines: &InlineSlice) -> Result<usize> {
        write_str(w, &Env::default().inlines(inlines))
    }
}

fn placeholder(what: &str) -> String {
    format!("<!-- Unable to encode {what} as Markdown -->")
}

fn prefix_lines(text: &str, first: &str, rest: &str) -> String {
    text.split('\n')
        .enumerate()
        .map(|(idx, line)| {
            let prefix = if idx == 0 { first } else { rest };
            if line.is_empty() {
                prefix.trim_end().to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Backtick run longer than any run inside `content`
fn backticks(content: &str, min: usize) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in content.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(min))
}

#[derive(Default)]
struct Env {
    /// Rendered footnote texts, numbered from one
    notes: Vec<String>,
}

impl Env {
    fn blocks(&mut self, blocks: &BlockSlice) -> String {
        let mut parts = Vec::with_capacity(blocks.len());
        for block in blocks {
            let text = self.block(block);
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.join("\n\n")
    }

    fn block(&mut self, block: &BlockNode) -> String {
        match block {
            BlockNode::Para { inlines } => self.inlines(inlines),
            BlockNode::Heading { level, inlines, .. } => {
                let text = self.inlines(inlines).replace('\n', " ");
                format!("{} {text}", "#".repeat(usize::from(*level)))
            }
            BlockNode::Hrule { .. } => "---".to_string(),
            BlockNode::NestedList { kind, items, .. } => self.list(*kind, items),
            BlockNode::DescriptionList { .. } => placeholder("description list"),
            BlockNode::Table { .. } => placeholder("table"),
            BlockNode::Region {
                kind,
                blocks,
                inlines,
                ..
            } => {
                let mut text = self.blocks(blocks);
                if !inlines.is_empty() {
                    if !text.is_empty() {
                        text.push_str("\n\n");
                    }
                    text.push_str("— ");
                    text.push_str(&self.inlines(inlines));
                }
                match kind {
                    RegionKind::Quote => prefix_lines(&text, "> ", "> "),
                    RegionKind::Verse => text.replace('\n', "  \n").replace("  \n  \n", "\n\n"),
                    RegionKind::Block => text,
                }
            }
            BlockNode::Verbatim {
                kind,
                attrs,
                content,
            } => match kind {
                VerbatimKind::Comment => String::new(),
                VerbatimKind::Html => content.clone(),
                VerbatimKind::Code | VerbatimKind::Eval | VerbatimKind::Math => {
                    let fence = backticks(content, 3);
                    let info = match kind {
                        VerbatimKind::Math => "math",
                        _ => attrs.default_value().unwrap_or_default(),
                    };
                    format!("{fence}{info}\n{content}\n{fence}")
                }
            },
            BlockNode::Transclude { reference, .. } => {
                placeholder(&format!("transclusion of {}", reference.to_text()))
            }
            BlockNode::Blob { syntax, .. } => placeholder(&format!("BLOB with syntax '{syntax}'")),
            BlockNode::Unknown { node } => {
                let mut output = String::new();
                push_escaped(&mut output, &unknown_text(node), true);
                output
            }
        }
    }

    fn list(&mut self, kind: NestedListKind, items: &[BlockSlice]) -> String {
        let mut lines = Vec::with_capacity(items.len());
        if kind == NestedListKind::Quote {
            for item in items {
                lines.push(prefix_lines(&self.blocks(item), "> ", "> "));
            }
            return lines.join("\n>\n");
        }
        for (idx, item) in items.iter().enumerate() {
            let marker = match kind {
                NestedListKind::Ordered => format!("{}. ", idx + 1),
                _ => "* ".to_string(),
            };
            let pad = " ".repeat(marker.len());
            let mut text = String::new();
            for (pos, block) in item.iter().enumerate() {
                let part = self.block(block);
                if pos > 0 {
                    let tight = matches!(block, BlockNode::NestedList { .. });
                    text.push_str(if tight { "\n" } else { "\n\n" });
                }
                text.push_str(&part);
            }
            lines.push(prefix_lines(&text, &marker, &pad));
        }
        lines.join("\n")
    }

    fn inlines(&mut self, inlines: &InlineSlice) -> String {
        let mut output = String::new();
        for inline in inlines {
            self.inline(&mut output, inline);
        }
        output
    }

    fn inline(&mut self, output: &mut String, inline: &InlineNode) {
        match inline {
            InlineNode::Text { text } => {
                let at_line_start = output.is_empty() || output.ends_with('\n');
                push_escaped(output, text, at_line_start);
            }
            InlineNode::Soft => output.push('\n'),
            InlineNode::Hard => output.push_str("\\\n"),
            InlineNode::Link {
                reference,
                inlines,
                ..
            } => {
                let target = reference.to_text();
                if inlines.is_empty() && reference.state == RefState::External {
                    output.push_str(&format!("<{target}>"));
                } else {
                    let text = if inlines.is_empty() {
                        target.clone()
                    } else {
                        self.inlines(inlines)
                    };
                    output.push_str(&format!("[{text}]({target})"));
                }
            }
            InlineNode::Embed {
                attrs,
                reference,
                inlines,
                ..
            } => {
                let alt = self.inlines(inlines);
                match attrs.get("title") {
                    Some(title) => output.push_str(&format!(
                        "![{alt}]({} \"{}\")",
                        reference.to_text(),
                        title.replace('"', "\\\"")
                    )),
                    None => output.push_str(&format!("![{alt}]({})", reference.to_text())),
                }
            }
            InlineNode::EmbedBlob { syntax, .. } => {
                output.push_str(&placeholder(&format!("BLOB with syntax '{syntax}'")));
            }
            InlineNode::Cite { key, inlines, .. } => {
                output.push_str(&format!("[@{key}]"));
                if !inlines.is_empty() {
                    output.push(' ');
                    let text = self.inlines(inlines);
                    output.push_str(&text);
                }
            }
            InlineNode::Mark { inlines, .. } => {
                let text = self.inlines(inlines);
                output.push_str(&text);
            }
            InlineNode::Footnote { inlines, .. } => {
                let text = self.inlines(inlines).replace('\n', " ");
                self.notes.push(text);
                output.push_str(&format!("[^{}]", self.notes.len()));
            }
            InlineNode::Format { kind, inlines, .. } => {
                let text = self.inlines(inlines);
                let (open, close) = match kind {
                    FormatKind::Emph => ("*", "*"),
                    FormatKind::Strong => ("**", "**"),
                    FormatKind::Delete => ("~~", "~~"),
                    FormatKind::Quote => ("\"", "\""),
                    _ => ("", ""),
                };
                output.push_str(open);
                output.push_str(&text);
                output.push_str(close);
            }
            InlineNode::Literal { kind, content, .. } => match kind {
                LiteralKind::Comment => {}
                LiteralKind::Html => output.push_str(content),
                _ => {
                    let fence = backticks(content, 1);
                    let pad = if content.starts_with('`') || content.ends_with('`') {
                        " "
                    } else {
                        ""
                    };
                    output.push_str(&format!("{fence}{pad}{content}{pad}{fence}"));
                }
            },
            InlineNode::Unknown { node } => {
                let at_line_start = output.is_empty() || output.ends_with('\n');
                push_escaped(output, &unknown_text(node), at_line_start);
            }
        }
    }
}

fn push_escaped(output: &mut String, text: &str, at_line_start: bool) {
    // "1." or "1)" at the start of a line opens an ordered list
    let digits = if at_line_start {
        text.chars().take_while(char::is_ascii_digit).count()
    } else {
        0
    };
    for (idx, c) in text.chars().enumerate() {
        let escape = match c {
            '\\' | '*' | '_' | '`' | '[' | ']' | '<' => true,
            '#' | '>' | '-' | '+' | '=' => idx == 0 && at_line_start,
            '.' | ')' => digits > 0 && idx == digits,
            _ => false,
        };
        if escape {
            output.push('\\');
        }
        output.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::Attributes;
    use crate::parser::zettelmark::parse_document;
    use crate::sz::parse_sz;
    use pretty_assertions::assert_eq;

    fn encode(input: &str) -> String {
        let mut out = Vec::new();
        MdEncoder
            .write_blocks(&mut out, &parse_document(input))
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_basic_blocks() {
        assert_eq!(encode("== Title\n\nSome **bold** text"), "## Title\n\nSome **bold** text");
        assert_eq!(encode("```rust\nfn x() {}\n```"), "```rust\nfn x() {}\n```");
        assert_eq!(encode("a\\_b"), "a\\_b");
    }

    #[test]
    fn test_lists() {
        assert_eq!(encode("* a\n** b\n* c"), "* a\n  * b\n* c");
        assert_eq!(encode("# a\n# b\n\n  more"), "1. a\n2. b\n\n   more");
        assert_eq!(encode("> a\n> b"), "> a\n>\n> b");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(encode("|a|b"), "<!-- Unable to encode table as Markdown -->");
        assert_eq!(
            encode("; t\n: d"),
            "<!-- Unable to encode description list as Markdown -->"
        );
    }

    #[test]
    fn test_links_and_notes() {
        assert_eq!(encode("[[https://example.com]]"), "<https://example.com>");
        assert_eq!(encode("[[x|https://example.com]]"), "[x](https://example.com)");
        assert_eq!(encode("a[^note] b"), "a[^1] b\n\n[^1]: note");
    }

    #[test]
    fn test_embed_title() {
        let inlines = vec![InlineNode::Embed {
            attrs: Attributes::new().with("title", "T"),
            reference: crate::reference::Reference::parse("img.png"),
            syntax: String::new(),
            inlines: vec![InlineNode::text("alt")],
        }];
        let mut out = Vec::new();
        MdEncoder.write_inlines(&mut out, &inlines).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "![alt](img.png \"T\")");
    }

    #[test]
    fn test_ordered_marker_is_escaped() {
        assert_eq!(encode("1. x"), "1\\. x");
        assert_eq!(encode("12) x"), "12\\) x");
        assert_eq!(encode("a\n2. b"), "a\n2\\. b");
        assert_eq!(encode("v1.2 and 3.5"), "v1.2 and 3.5");
    }

    #[test]
    fn test_unknown_nodes_stay_visible() {
        let blocks =
            parse_sz(r#"(BLOCK (PARA (TEXT "a") (BOGUS-INLINE (TEXT "x")) (TEXT "b")) (BOGUS-BLOCK))"#)
                .unwrap();
        let mut out = Vec::new();
        MdEncoder.write_blocks(&mut out, &blocks).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a\\[unknown: (BOGUS-INLINE (TEXT \"x\"))\\]b\n\n\\[unknown: (BOGUS-BLOCK)\\]"
        );
    }

    #[test]
    fn test_meta_not_implemented() {
        let meta = Meta::new(crate::id::ZettelId::new(20240101000000).unwrap());
        let mut out = Vec::new();
        assert!(matches!(
            MdEncoder.write_meta(&mut out, &meta),
            Err(EncodeError::NotImplemented { encoder: "md", .. })
        ));
    }
}
