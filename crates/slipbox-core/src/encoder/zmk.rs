// SPDX-License-Identifier: AGPL-3.0-or-later
//! Zettelmarkup encoder
//!
//! Output is meant to parse back into the same tree: text is escaped where a
//! character would otherwise start an element, and block markers at the
//! start of a line are escaped as well.

use std::io::Write;

use crate::ast::{
    Alignment, BlockNode, BlockSlice, Description, FormatKind, InlineNode, InlineSlice,
    LiteralKind, NestedListKind, RegionKind, TableCell, VerbatimKind,
};
use crate::attrs::Attributes;
use crate::encoder::text::{plain_text, unknown_text};
use crate::meta::Meta;
use crate::traits::{write_str, Encoder, Result};
use crate::zettel::ZettelNode;

pub struct ZmkEncoder;

impl Encoder for ZmkEncoder {
    fn write_zettel(&self, w: &mut dyn Write, zn: &ZettelNode) -> Result<usize> {
        let mut output = meta_text(&zn.meta);
        let content = blocks_text(&zn.blocks);
        if !content.is_empty() {
            output.push('\n');
            output.push_str(&content);
        }
        write_str(w, &output)
    }

    fn write_meta(&self, w: &mut dyn Write, meta: &Meta) -> Result<usize> {
        write_str(w, &meta_text(meta))
    }

    fn write_blocks(&self, w: &mut dyn Write, blocks: &BlockSlice) -> Result<usize> {
        write_str(w, &blocks_text(blocks))
    }

    fn write_inlines(&self, w: &mut dyn Write, inlines: &InlineSlice) -> Result<usize> {
        write_str(w, &inline_text(inlines))
    }
}

fn meta_text(meta: &Meta) -> String {
    let mut output = String::new();
    for (key, value) in meta.iter() {
        output.push_str(&format!("{key}: {value}\n"));
    }
    output
}

/// Characters that start a block when they open a line
const LINE_START_CHARS: &[char] = &[
    '=', '*', '#', '>', ';', ':', '|', '-', '`', '%', '~', '@', '$', '<', '"', '{',
];

/// Characters that open a format or literal when doubled
const DELIMITER_CHARS: &[char] = &[
    '_', '*', '>', '~', '^', ',', '"', '#', ':', '`', '\'', '=', '@', '$', '%',
];

fn format_char(kind: FormatKind) -> char {
    match kind {
        FormatKind::Emph => '_',
        FormatKind::Strong => '*',
        FormatKind::Insert => '>',
        FormatKind::Delete => '~',
        FormatKind::Super => '^',
        FormatKind::Sub => ',',
        FormatKind::Quote => '"',
        FormatKind::Mark => '#',
        FormatKind::Span => ':',
    }
}

fn literal_char(kind: LiteralKind) -> char {
    match kind {
        LiteralKind::Code => '`',
        LiteralKind::Input => '\'',
        LiteralKind::Output => '=',
        LiteralKind::Html => '@',
        LiteralKind::Math => '$',
        LiteralKind::Comment => '%',
    }
}

fn list_char(kind: NestedListKind) -> char {
    match kind {
        NestedListKind::Ordered => '#',
        NestedListKind::Unordered => '*',
        NestedListKind::Quote => '>',
    }
}

/// A word that `{word}` and a fence line read back as the default attribute
fn is_plain_word(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('.')
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '+' | '.' | '#'))
}

fn push_quoted(output: &mut String, value: &str) {
    output.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            output.push('\\');
        }
        output.push(c);
    }
    output.push('"');
}

fn attrs_text(attrs: &Attributes) -> String {
    if attrs.is_empty() {
        return String::new();
    }
    if attrs.len() == 1 {
        if let Some(value) = attrs.default_value().filter(|v| is_plain_word(v)) {
            return format!("{{{value}}}");
        }
    }
    let mut output = String::from("{");
    for (idx, (key, value)) in attrs.iter().enumerate() {
        if idx > 0 {
            output.push(' ');
        }
        output.push_str(key);
        output.push('=');
        push_quoted(&mut output, value);
    }
    output.push('}');
    output
}

/// Attributes after a fence: a bare word where possible
fn fence_attrs(attrs: &Attributes) -> String {
    if attrs.len() == 1 {
        if let Some(value) = attrs.default_value().filter(|v| is_plain_word(v)) {
            return value.to_string();
        }
    }
    attrs_text(attrs)
}

/// Longest run of `c` that starts a line of `text`
fn max_line_run(text: &str, c: char) -> usize {
    text.lines()
        .map(|line| line.trim_start().chars().take_while(|&x| x == c).count())
        .max()
        .unwrap_or(0)
}

fn fence(text: &str, c: char) -> String {
    c.to_string().repeat((max_line_run(text, c) + 1).max(3))
}

/// Prefix every non-empty line after the first
fn indent_rest(text: &str, levels: usize) -> String {
    let prefix = "  ".repeat(levels);
    text.split('\n')
        .enumerate()
        .map(|(idx, line)| {
            if idx == 0 || line.is_empty() {
                line.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefix every non-empty line
fn indent(text: &str, levels: usize) -> String {
    if text.is_empty() {
        return String::new();
    }
    let prefix = "  ".repeat(levels);
    let rest = indent_rest(text, levels);
    if text.starts_with('\n') {
        rest
    } else {
        format!("{prefix}{rest}")
    }
}

// Blocks

pub fn blocks_text(blocks: &BlockSlice) -> String {
    blocks
        .iter()
        .map(block_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn block_text(block: &BlockNode) -> String {
    match block {
        BlockNode::Para { inlines } => inline_text(inlines),
        BlockNode::Heading {
            level,
            attrs,
            inlines,
            ..
        } => {
            let mut output = "=".repeat(usize::from(*level));
            output.push(' ');
            output.push_str(&line_text(inlines));
            if !attrs.is_empty() {
                output.push(' ');
                output.push_str(&attrs_text(attrs));
            }
            output
        }
        BlockNode::Hrule { attrs } => {
            if attrs.is_empty() {
                "---".to_string()
            } else {
                format!("--- {}", attrs_text(attrs))
            }
        }
        BlockNode::NestedList { kind, items, .. } => list_text("", *kind, items),
        BlockNode::DescriptionList { entries, .. } => description_text(entries),
        BlockNode::Table { header, rows, .. } => table_text(header, rows),
        BlockNode::Region {
            kind,
            attrs,
            blocks,
            inlines,
        } => {
            let c = match kind {
                RegionKind::Block => ':',
                RegionKind::Quote => '<',
                RegionKind::Verse => '"',
            };
            let content = blocks_text(blocks);
            let fence = fence(&content, c);
            let mut output = format!("{fence}{}\n", fence_attrs(attrs));
            if !content.is_empty() {
                output.push_str(&content);
                output.push('\n');
            }
            output.push_str(&fence);
            if !inlines.is_empty() {
                output.push(' ');
                output.push_str(&line_text(inlines));
            }
            output
        }
        BlockNode::Verbatim {
            kind,
            attrs,
            content,
        } => {
            let c = match kind {
                VerbatimKind::Code => '`',
                VerbatimKind::Comment => '%',
                VerbatimKind::Eval => '~',
                VerbatimKind::Html => '@',
                VerbatimKind::Math => '$',
            };
            let fence = fence(content, c);
            if content.is_empty() {
                format!("{fence}{}\n{fence}", fence_attrs(attrs))
            } else {
                format!("{fence}{}\n{content}\n{fence}", fence_attrs(attrs))
            }
        }
        BlockNode::Transclude {
            attrs, reference, ..
        } => format!("{{{{{{{}}}}}}}{}", reference.to_text(), attrs_text(attrs)),
        BlockNode::Blob {
            description,
            syntax,
            ..
        } => format!(
            "%% Unable to display BLOB with description '{}' and syntax '{syntax}'.",
            plain_text(description)
        ),
        BlockNode::Unknown { node } => {
            let printed = node.print();
            let fence = fence(&printed, '%');
            format!("{fence}\n{printed}\n{fence}")
        }
    }
}

fn list_text(parent: &str, kind: NestedListKind, items: &[BlockSlice]) -> String {
    let markers = format!("{parent}{}", list_char(kind));
    let depth = markers.chars().count();
    let mut output = String::new();
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            output.push('\n');
        }
        output.push_str(&markers);
        let mut rest = item.as_slice();
        if let Some((BlockNode::Para { inlines }, tail)) = rest.split_first() {
            let text = inline_text(inlines);
            if !text.is_empty() {
                output.push(' ');
                output.push_str(&indent_rest(&text, depth));
            }
            rest = tail;
        }
        for block in rest {
            match block {
                BlockNode::NestedList { kind, items, .. } => {
                    output.push('\n');
                    output.push_str(&list_text(&markers, *kind, items));
                }
                other => {
                    let text = block_text(other);
                    if !text.is_empty() {
                        output.push_str("\n\n");
                        output.push_str(&indent(&text, depth));
                    }
                }
            }
        }
    }
    output
}

fn description_text(entries: &[Description]) -> String {
    let mut output = String::new();
    for (idx, entry) in entries.iter().enumerate() {
        if idx > 0 {
            output.push('\n');
        }
        output.push(';');
        let term = line_text(&entry.term);
        if !term.is_empty() {
            output.push(' ');
            output.push_str(&term);
        }
        for description in &entry.descriptions {
            output.push_str("\n:");
            let mut rest = description.as_slice();
            if let Some((BlockNode::Para { inlines }, tail)) = rest.split_first() {
                let text = inline_text(inlines);
                if !text.is_empty() {
                    output.push(' ');
                    output.push_str(&indent_rest(&text, 1));
                }
                rest = tail;
            }
            for block in rest {
                let text = block_text(block);
                if !text.is_empty() {
                    output.push_str("\n\n");
                    output.push_str(&indent(&text, 1));
                }
            }
        }
    }
    output
}

fn align_char(align: Alignment) -> Option<char> {
    match align {
        Alignment::Default => None,
        Alignment::Left => Some('<'),
        Alignment::Center => Some(':'),
        Alignment::Right => Some('>'),
    }
}

fn cell_text(cell: &TableCell, inherited: Alignment) -> String {
    let mut text = line_text(&cell.inlines);
    if text.starts_with('=') {
        text.insert(0, '\\');
    }
    if let Some(last) = text.chars().last().filter(|c| matches!(c, '<' | ':' | '>')) {
        let body = &text[..text.len() - 1];
        let backslashes = body.chars().rev().take_while(|&c| c == '\\').count();
        if backslashes % 2 == 0 {
            text = format!("{body}\\{last}");
        }
    }
    if cell.align != inherited {
        if let Some(c) = align_char(cell.align) {
            text.push(c);
        }
    }
    if text.is_empty() {
        text.push(' ');
    }
    text
}

fn table_text(header: &[TableCell], rows: &[Vec<TableCell>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    if !header.is_empty() {
        let mut line = String::new();
        for cell in header {
            line.push_str("|=");
            line.push_str(cell_text(cell, Alignment::Default).trim_end());
        }
        lines.push(line);
    }
    for row in rows {
        let mut line = String::new();
        if row.is_empty() {
            line.push('|');
        }
        for (col, cell) in row.iter().enumerate() {
            let inherited = header.get(col).map_or(Alignment::Default, |h| h.align);
            line.push('|');
            line.push_str(&cell_text(cell, inherited));
        }
        lines.push(line);
    }
    lines.join("\n")
}

// Inlines

/// Inline text of a paragraph; breaks keep their lines
pub fn inline_text(inlines: &InlineSlice) -> String {
    let mut writer = InlineWriter::new(false);
    writer.inlines(inlines, true);
    writer.output
}

/// Inline text on a single line, as needed by headings, terms and cells
fn line_text(inlines: &InlineSlice) -> String {
    let mut writer = InlineWriter::new(true);
    writer.inlines(inlines, true);
    writer.output.trim_end_matches([' ', '\t']).to_string()
}

struct InlineWriter {
    output: String,
    single_line: bool,
}

impl InlineWriter {
    fn new(single_line: bool) -> Self {
        Self {
            output: String::new(),
            single_line,
        }
    }

    fn at_line_start(&self) -> bool {
        self.output.is_empty() || self.output.ends_with('\n')
    }

    /// `top` marks the slice of a whole paragraph, whose end is a line end
    fn inlines(&mut self, inlines: &InlineSlice, top: bool) {
        for (idx, inline) in inlines.iter().enumerate() {
            let next = inlines.get(idx + 1);
            match inline {
                InlineNode::Text { text } => {
                    let line_end = next.map_or(top, InlineNode::is_break);
                    self.text(text, line_end);
                }
                InlineNode::Literal {
                    kind: LiteralKind::Comment,
                    content,
                    ..
                } => self.comment(content, next),
                InlineNode::Unknown { node } => self.comment(&unknown_text(node), next),
                other => self.inline(other),
            }
        }
    }

    /// A comment runs to the end of its line
    fn comment(&mut self, content: &str, next: Option<&InlineNode>) {
        self.output.push_str("%%");
        if !content.is_empty() {
            self.output.push(' ');
            self.output.push_str(&content.replace('\n', " "));
        }
        if !self.single_line && next.is_some_and(|n| !n.is_break()) {
            self.output.push('\n');
        }
    }

    fn inline(&mut self, inline: &InlineNode) {
        match inline {
            InlineNode::Text { text } => self.text(text, false),
            InlineNode::Soft => {
                self.output
                    .push_str(if self.single_line { " " } else { "\n" });
            }
            InlineNode::Hard => {
                self.output
                    .push_str(if self.single_line { " " } else { "\\\n" });
            }
            InlineNode::Link {
                attrs,
                reference,
                inlines,
            } => {
                self.output.push_str("[[");
                self.reference_text(inlines);
                self.output.push_str(&reference.to_text());
                self.output.push_str("]]");
                self.attrs(attrs);
            }
            InlineNode::Embed {
                attrs,
                reference,
                inlines,
                ..
            } => {
                self.output.push_str("{{");
                self.reference_text(inlines);
                self.output.push_str(&reference.to_text());
                self.output.push_str("}}");
                self.attrs(attrs);
            }
            InlineNode::EmbedBlob {
                syntax, inlines, ..
            } => {
                self.output.push_str(&format!(
                    "%% Unable to display BLOB with description '{}' and syntax '{syntax}'.",
                    plain_text(inlines)
                ));
                if !self.single_line {
                    self.output.push('\n');
                }
            }
            InlineNode::Cite {
                attrs,
                key,
                inlines,
            } => {
                self.output.push_str("[@");
                self.output.push_str(key);
                if !inlines.is_empty() {
                    self.output.push(' ');
                    self.inlines(inlines, false);
                }
                self.output.push(']');
                self.attrs(attrs);
            }
            InlineNode::Mark { mark, inlines, .. } => {
                self.output.push_str("[!");
                self.output.push_str(mark);
                if !inlines.is_empty() {
                    self.output.push('|');
                    self.inlines(inlines, false);
                }
                self.output.push(']');
            }
            InlineNode::Footnote { attrs, inlines } => {
                self.output.push_str("[^");
                self.inlines(inlines, false);
                self.output.push(']');
                self.attrs(attrs);
            }
            InlineNode::Format {
                kind,
                attrs,
                inlines,
            } => {
                let c = format_char(*kind);
                self.output.push(c);
                self.output.push(c);
                self.inlines(inlines, false);
                self.output.push(c);
                self.output.push(c);
                self.attrs(attrs);
            }
            InlineNode::Literal {
                kind,
                attrs,
                content,
            } => {
                let c = literal_char(*kind);
                self.output.push(c);
                self.output.push(c);
                for ch in content.chars() {
                    if ch == '\\' || ch == c {
                        self.output.push('\\');
                    }
                    self.output.push(if ch == '\n' { ' ' } else { ch });
                }
                self.output.push(c);
                self.output.push(c);
                self.attrs(attrs);
            }
            InlineNode::Unknown { node } => self.comment(&unknown_text(node), None),
        }
    }

    fn reference_text(&mut self, inlines: &InlineSlice) {
        if !inlines.is_empty() {
            self.inlines(inlines, false);
            self.output.push('|');
        }
    }

    fn attrs(&mut self, attrs: &Attributes) {
        self.output.push_str(&attrs_text(attrs));
    }

    fn text(&mut self, text: &str, line_end: bool) {
        let mut text = text.replace('\n', " ");
        if self.at_line_start() {
            text = text.trim_start_matches([' ', '\t']).to_string();
        }
        if line_end {
            text.truncate(text.trim_end_matches([' ', '\t']).len());
        }
        let chars: Vec<char> = text.chars().collect();
        for (idx, &c) in chars.iter().enumerate() {
            let next = chars.get(idx + 1).copied();
            let escape = match c {
                '\\' | ']' | '{' | '|' => true,
                '[' => next.map_or(true, |n| matches!(n, '[' | '@' | '^' | '!')),
                '&' => next.is_some_and(|n| n.is_ascii_alphanumeric() || n == '#'),
                _ if idx == 0 && self.at_line_start() && LINE_START_CHARS.contains(&c) => true,
                _ if DELIMITER_CHARS.contains(&c) => next.map_or(true, |n| n == c),
                _ => false,
            };
            if escape {
                self.output.push('\\');
            }
            self.output.push(c);
        }
    }
}
