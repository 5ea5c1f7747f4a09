// SPDX-License-Identifier: AGPL-3.0-or-later
//! Inline level of Zettelmarkup
//!
//! Runs on the text of a paragraph with lines joined by `\n`. Elements that
//! do not close degrade to literal text; failed attempts are memoised per
//! position so that pathological input stays polynomial.

use std::collections::HashSet;

use super::attrs::parse_attrs;
use crate::ast::{FormatKind, InlineNode, InlineSlice, LiteralKind};
use crate::attrs::Attributes;
use crate::reference::Reference;

/// Non-breaking space produced by `\` followed by a space
pub(crate) const NBSP: char = '\u{a0}';

/// Deepest nesting of formats, citations, footnotes and marks
const MAX_NESTING: usize = 64;

pub(crate) fn format_kind(c: char) -> Option<FormatKind> {
    Some(match c {
        '_' => FormatKind::Emph,
        '*' => FormatKind::Strong,
        '>' => FormatKind::Insert,
        '~' => FormatKind::Delete,
        '^' => FormatKind::Super,
        ',' => FormatKind::Sub,
        '"' => FormatKind::Quote,
        '#' => FormatKind::Mark,
        ':' => FormatKind::Span,
        _ => return None,
    })
}

pub(crate) fn literal_kind(c: char) -> Option<LiteralKind> {
    Some(match c {
        '`' => LiteralKind::Code,
        '\'' => LiteralKind::Input,
        '=' => LiteralKind::Output,
        '@' => LiteralKind::Html,
        '$' => LiteralKind::Math,
        '%' => LiteralKind::Comment,
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Closer {
    /// Parse to the end of the input
    End,
    /// Two equal characters close a format
    Pair(char),
    /// `]` closes citations, footnotes and marks
    Bracket,
    /// `|` ends a table cell; it is not consumed
    Pipe,
}

impl Closer {
    /// Length of the closer at `pos`, if present
    fn at(self, chars: &[char], pos: usize) -> Option<usize> {
        let c = chars[pos];
        match self {
            Closer::End => None,
            Closer::Pair(d) => (c == d && chars.get(pos + 1) == Some(&d)).then_some(2),
            Closer::Bracket => (c == ']').then_some(1),
            Closer::Pipe => (c == '|').then_some(0),
        }
    }
}

pub(crate) struct InlineParser {
    chars: Vec<char>,
    failed: HashSet<(usize, char)>,
    closers: Vec<Closer>,
}

/// Result of a nested parse: nodes, end position and whether the closer was found
pub(crate) struct Parsed {
    pub inlines: InlineSlice,
    pub end: usize,
    pub closed: bool,
}

impl InlineParser {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            failed: HashSet::new(),
            closers: Vec::new(),
        }
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Parse the complete input
    pub fn parse_all(mut self) -> InlineSlice {
        self.parse(0, Closer::End).inlines
    }

    pub fn parse(&mut self, start: usize, closer: Closer) -> Parsed {
        if self.closers.len() >= MAX_NESTING {
            return Parsed {
                inlines: Vec::new(),
                end: start,
                closed: false,
            };
        }
        self.closers.push(closer);
        let parsed = self.parse_run(start, closer);
        self.closers.pop();
        parsed
    }

    fn parse_run(&mut self, mut pos: usize, closer: Closer) -> Parsed {
        let mut out = Run::default();
        while pos < self.chars.len() {
            if let Some(len) = closer.at(&self.chars, pos) {
                return Parsed {
                    inlines: out.finish(false),
                    end: pos + len,
                    closed: true,
                };
            }
            if self.hits_outer_closer(pos) {
                return Parsed {
                    inlines: out.finish(false),
                    end: pos,
                    closed: false,
                };
            }
            pos = self.parse_element(pos, &mut out);
        }
        Parsed {
            inlines: out.finish(closer == Closer::End),
            end: pos,
            closed: closer == Closer::End,
        }
    }

    fn hits_outer_closer(&self, pos: usize) -> bool {
        let outer = &self.closers[..self.closers.len().saturating_sub(1)];
        outer
            .iter()
            .any(|closer| closer.at(&self.chars, pos).is_some())
    }

    fn peek(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).copied()
    }

    /// Parse one element at `pos` into `out`, returning the next position
    fn parse_element(&mut self, pos: usize, out: &mut Run) -> usize {
        let c = self.chars[pos];
        let next = self.peek(pos + 1);
        let parsed = match c {
            '\\' => return self.parse_escape(pos, out),
            '\n' => {
                out.push_break(InlineNode::Soft);
                return pos + 1;
            }
            '&' => return self.parse_entity(pos, out),
            '[' => match next {
                Some('[') => self.parse_reference(pos, ']', out),
                Some('@') => self.parse_cite(pos, out),
                Some('^') => self.parse_footnote(pos, out),
                Some('!') => self.parse_mark(pos, out),
                _ => None,
            },
            '{' if next == Some('{') => self.parse_reference(pos, '}', out),
            '%' if next == Some('%') => Some(self.parse_comment(pos, out)),
            _ if next == Some(c) => {
                if let Some(kind) = format_kind(c) {
                    self.parse_format(pos, c, kind, out)
                } else if let Some(kind) = literal_kind(c) {
                    self.parse_literal(pos, c, kind, out)
                } else {
                    None
                }
            }
            _ => None,
        };
        match parsed {
            Some(end) => end,
            None => {
                out.text.push(c);
                pos + 1
            }
        }
    }

    fn parse_escape(&mut self, pos: usize, out: &mut Run) -> usize {
        match self.peek(pos + 1) {
            Some('\n') => {
                out.push_break(InlineNode::Hard);
                pos + 2
            }
            Some(' ') => {
                out.text.push(NBSP);
                pos + 2
            }
            Some(c) if !c.is_alphanumeric() => {
                out.text.push(c);
                pos + 2
            }
            _ => {
                out.text.push('\\');
                pos + 1
            }
        }
    }

    fn parse_entity(&mut self, pos: usize, out: &mut Run) -> usize {
        let mut end = pos + 1;
        while end < self.chars.len() && end - pos <= 32 {
            let c = self.chars[end];
            if c == ';' {
                break;
            }
            if !(c.is_ascii_alphanumeric() || c == '#') {
                break;
            }
            end += 1;
        }
        if self.peek(end) == Some(';') && end > pos + 1 {
            let raw: String = self.chars[pos..=end].iter().collect();
            let decoded = html_escape::decode_html_entities(&raw);
            if decoded != raw {
                out.text.push_str(&decoded);
                return end + 1;
            }
        }
        out.text.push('&');
        pos + 1
    }

    /// Attributes directly after an element
    fn attrs_after(&self, pos: usize) -> (Attributes, usize) {
        if self.peek(pos) == Some('{') && self.peek(pos + 1) != Some('{') {
            if let Some((attrs, end)) = parse_attrs(&self.chars, pos) {
                return (attrs, end);
            }
        }
        (Attributes::new(), pos)
    }

    fn has_pair_after(&self, from: usize, c: char) -> bool {
        self.chars
            .get(from..)
            .is_some_and(|rest| rest.windows(2).any(|w| w[0] == c && w[1] == c))
    }

    fn parse_format(&mut self, pos: usize, c: char, kind: FormatKind, out: &mut Run) -> Option<usize> {
        if self.failed.contains(&(pos, c)) {
            return None;
        }
        if !self.has_pair_after(pos + 2, c) {
            self.failed.insert((pos, c));
            return None;
        }
        let parsed = self.parse(pos + 2, Closer::Pair(c));
        if !parsed.closed {
            self.failed.insert((pos, c));
            return None;
        }
        let (attrs, end) = self.attrs_after(parsed.end);
        out.push(InlineNode::Format {
            kind,
            attrs,
            inlines: parsed.inlines,
        });
        Some(end)
    }

    fn parse_literal(&mut self, pos: usize, c: char, kind: LiteralKind, out: &mut Run) -> Option<usize> {
        if self.failed.contains(&(pos, c)) {
            return None;
        }
        let mut content = String::new();
        let mut i = pos + 2;
        while i < self.chars.len() {
            let ch = self.chars[i];
            let next = self.peek(i + 1);
            if ch == '\\' && (next == Some('\\') || next == Some(c)) {
                content.push(self.chars[i + 1]);
                i += 2;
                continue;
            }
            if ch == c && next == Some(c) {
                let (attrs, end) = self.attrs_after(i + 2);
                out.push(InlineNode::Literal {
                    kind,
                    attrs,
                    content,
                });
                return Some(end);
            }
            content.push(ch);
            i += 1;
        }
        self.failed.insert((pos, c));
        None
    }

    fn parse_comment(&mut self, pos: usize, out: &mut Run) -> usize {
        let mut end = pos + 2;
        while end < self.chars.len() && self.chars[end] != '\n' {
            end += 1;
        }
        let body = &self.chars[pos + 2..end];
        let body = body.strip_prefix(&[' ']).unwrap_or(body);
        out.push(InlineNode::Literal {
            kind: LiteralKind::Comment,
            attrs: Attributes::new(),
            content: body.iter().collect(),
        });
        end
    }

    /// Position of an unescaped two-character closer `cc`
    fn find_raw_closer(&self, from: usize, c: char) -> Option<usize> {
        let mut i = from;
        while i + 1 < self.chars.len() {
            match self.chars[i] {
                '\\' => i += 2,
                ch if ch == c && self.chars[i + 1] == c => return Some(i),
                _ => i += 1,
            }
        }
        None
    }

    /// Links `[[text|ref]]` and embeds `{{text|ref}}`
    fn parse_reference(&mut self, pos: usize, close: char, out: &mut Run) -> Option<usize> {
        let close_pos = self.find_raw_closer(pos + 2, close)?;
        let content = &self.chars[pos + 2..close_pos];
        let (text, target) = match last_unescaped_pipe(content) {
            Some(idx) => (&content[..idx], &content[idx + 1..]),
            None => (&content[..0], content),
        };
        let target: String = target.iter().collect();
        let reference = Reference::parse(target.trim());
        let text: String = text.iter().collect();
        let inlines = InlineParser::new(&text).parse_all();
        let (attrs, end) = self.attrs_after(close_pos + 2);
        out.push(if close == ']' {
            InlineNode::Link {
                attrs,
                reference,
                inlines,
            }
        } else {
            InlineNode::Embed {
                attrs,
                reference,
                syntax: String::new(),
                inlines,
            }
        });
        Some(end)
    }

    fn parse_cite(&mut self, pos: usize, out: &mut Run) -> Option<usize> {
        if self.failed.contains(&(pos, '@')) {
            return None;
        }
        let start = pos + 2;
        let mut i = start;
        while let Some(c) = self.peek(i) {
            if c.is_whitespace() || matches!(c, ']' | '|' | ',') {
                break;
            }
            i += 1;
        }
        if i == start {
            return None;
        }
        let key: String = self.chars[start..i].iter().collect();
        if matches!(self.peek(i), Some(',' | '|')) {
            i += 1;
        }
        while self.peek(i).is_some_and(|c| c == ' ' || c == '\t') {
            i += 1;
        }
        let parsed = self.parse(i, Closer::Bracket);
        if !parsed.closed {
            self.failed.insert((pos, '@'));
            return None;
        }
        let (attrs, end) = self.attrs_after(parsed.end);
        out.push(InlineNode::Cite {
            attrs,
            key,
            inlines: parsed.inlines,
        });
        Some(end)
    }

    fn parse_footnote(&mut self, pos: usize, out: &mut Run) -> Option<usize> {
        if self.failed.contains(&(pos, '^')) {
            return None;
        }
        let parsed = self.parse(pos + 2, Closer::Bracket);
        if !parsed.closed {
            self.failed.insert((pos, '^'));
            return None;
        }
        let (attrs, end) = self.attrs_after(parsed.end);
        out.push(InlineNode::Footnote {
            attrs,
            inlines: parsed.inlines,
        });
        Some(end)
    }

    fn parse_mark(&mut self, pos: usize, out: &mut Run) -> Option<usize> {
        let start = pos + 2;
        let mut i = start;
        while self
            .peek(i)
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            i += 1;
        }
        let mark: String = self.chars[start..i].iter().collect();
        let (inlines, end) = match self.peek(i) {
            Some(']') => (Vec::new(), i + 1),
            Some('|') => {
                if self.failed.contains(&(pos, '!')) {
                    return None;
                }
                let parsed = self.parse(i + 1, Closer::Bracket);
                if !parsed.closed {
                    self.failed.insert((pos, '!'));
                    return None;
                }
                (parsed.inlines, parsed.end)
            }
            _ => return None,
        };
        out.push(InlineNode::Mark {
            mark,
            slug: String::new(),
            fragment: String::new(),
            inlines,
        });
        Some(end)
    }
}

fn last_unescaped_pipe(content: &[char]) -> Option<usize> {
    let mut found = None;
    let mut i = 0;
    while i < content.len() {
        match content[i] {
            '\\' => i += 2,
            '|' => {
                found = Some(i);
                i += 1;
            }
            _ => i += 1,
        }
    }
    found
}

/// Output collector that merges adjacent text
#[derive(Default)]
struct Run {
    nodes: InlineSlice,
    text: String,
}

impl Run {
    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.nodes.push(InlineNode::Text {
                text: std::mem::take(&mut self.text),
            });
        }
    }

    fn push(&mut self, node: InlineNode) {
        self.flush();
        self.nodes.push(node);
    }

    /// Line breaks drop trailing blanks of the preceding text
    fn push_break(&mut self, node: InlineNode) {
        trim_blank_end(&mut self.text);
        self.push(node);
    }

    fn finish(mut self, trim_end: bool) -> InlineSlice {
        if trim_end {
            trim_blank_end(&mut self.text);
        }
        self.flush();
        self.nodes
    }
}

fn trim_blank_end(text: &mut String) {
    let len = text.trim_end_matches([' ', '\t']).len();
    text.truncate(len);
}

/// Parse a complete inline text
pub(crate) fn parse_inlines(text: &str) -> InlineSlice {
    InlineParser::new(text).parse_all()
}
