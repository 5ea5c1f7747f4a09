// SPDX-License-Identifier: AGPL-3.0-or-later
//! Block level of Zettelmarkup
//!
//! Line oriented: a line either starts a block (heading, rule, list item,
//! description, table row, region, verbatim, transclusion) or continues a
//! paragraph. Regions and indented list content nest; nesting deeper than
//! [`MAX_NESTING`] degrades to paragraphs.

use super::attrs::parse_attrs_str;
use super::inline::{parse_inlines, Closer, InlineParser};
use crate::ast::{
    Alignment, BlockNode, BlockSlice, Description, NestedListKind, RegionKind, TableCell,
    VerbatimKind,
};
use crate::attrs::{Attributes, DEFAULT_KEY};
use crate::reference::Reference;

/// Deepest nesting of regions, lists and indented content
const MAX_NESTING: usize = 64;

const BLANKS: [char; 2] = [' ', '\t'];

/// Parse a complete Zettelmarkup text into blocks
pub fn parse_document(text: &str) -> BlockSlice {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = text.split('\n').collect();
    BlockParser::new(&lines, 0).parse_all()
}

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| BLANKS.contains(&c))
}

fn indent_of(line: &str) -> usize {
    line.chars().take_while(|&c| c == ' ').count()
}

fn run_len(line: &str, c: char) -> usize {
    line.chars().take_while(|&x| x == c).count()
}

fn last_or_default<T: Default>(items: &mut Vec<T>) -> &mut T {
    if items.is_empty() {
        items.push(T::default());
    }
    let last = items.len() - 1;
    &mut items[last]
}

/// Opening fence of a region or verbatim block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    c: char,
    len: usize,
}

impl Fence {
    /// Rest of `line` when it closes this fence
    fn closes(self, line: &str) -> Option<&str> {
        let run = run_len(line, self.c);
        // all fence characters are ASCII
        (run >= self.len).then(|| &line[run..])
    }
}

/// What a line starts
enum Start<'a> {
    Heading { level: u8, rest: &'a str },
    Hrule(Attributes),
    List { kinds: Vec<NestedListKind>, rest: &'a str },
    Term(&'a str),
    Definition(&'a str),
    Table,
    Region { kind: RegionKind, fence: Fence, attrs: Attributes },
    Verbatim { kind: VerbatimKind, fence: Fence, attrs: Attributes },
    Transclude { reference: Reference, attrs: Attributes },
}

fn block_start(line: &str) -> Option<Start<'_>> {
    match line.chars().next()? {
        '=' => heading_start(line),
        '-' => hrule_start(line),
        '*' | '#' | '>' => list_start(line),
        ':' | '<' | '"' => region_start(line).or_else(|| description_start(line)),
        ';' => description_start(line),
        '|' => Some(Start::Table),
        '`' | '%' | '~' | '@' | '$' => verbatim_start(line),
        '{' => transclusion_start(line),
        _ => None,
    }
}

fn heading_start(line: &str) -> Option<Start<'_>> {
    let run = run_len(line, '=');
    let rest = line[run..].strip_prefix(' ')?;
    Some(Start::Heading {
        level: run.min(6) as u8,
        rest,
    })
}

fn hrule_start(line: &str) -> Option<Start<'_>> {
    let run = run_len(line, '-');
    if run < 3 {
        return None;
    }
    let rest = line[run..].trim_matches(BLANKS);
    if rest.is_empty() {
        Some(Start::Hrule(Attributes::new()))
    } else {
        parse_attrs_str(rest).map(Start::Hrule)
    }
}

fn list_kind(c: char) -> NestedListKind {
    match c {
        '#' => NestedListKind::Ordered,
        '>' => NestedListKind::Quote,
        _ => NestedListKind::Unordered,
    }
}

fn list_start(line: &str) -> Option<Start<'_>> {
    let run = line
        .chars()
        .take_while(|c| matches!(c, '*' | '#' | '>'))
        .count();
    if run > MAX_NESTING {
        return None;
    }
    let rest = &line[run..];
    let rest = if rest.is_empty() {
        rest
    } else {
        rest.strip_prefix(' ')?
    };
    Some(Start::List {
        kinds: line[..run].chars().map(list_kind).collect(),
        rest: rest.trim_start_matches(BLANKS),
    })
}

fn description_start(line: &str) -> Option<Start<'_>> {
    let mut chars = line.chars();
    let marker = chars.next()?;
    let rest = chars.as_str();
    if !(rest.is_empty() || rest.starts_with(' ')) {
        return None;
    }
    let rest = rest.trim_start_matches(BLANKS);
    match marker {
        ';' => Some(Start::Term(rest)),
        ':' => Some(Start::Definition(rest)),
        _ => None,
    }
}

/// Attributes after a fence: nothing, `{...}` or a single word
fn fence_rest(rest: &str) -> Option<Attributes> {
    let rest = rest.trim_matches(BLANKS);
    if rest.is_empty() {
        Some(Attributes::new())
    } else if rest.starts_with('{') {
        parse_attrs_str(rest)
    } else if rest
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '+' | '.' | '#'))
    {
        Some(Attributes::new().with(DEFAULT_KEY, rest))
    } else {
        None
    }
}

fn fence_of(line: &str, c: char) -> Option<(Fence, Attributes)> {
    let len = run_len(line, c);
    if len < 3 {
        return None;
    }
    let attrs = fence_rest(&line[len..])?;
    Some((Fence { c, len }, attrs))
}

fn region_start(line: &str) -> Option<Start<'_>> {
    let c = line.chars().next()?;
    let kind = match c {
        ':' => RegionKind::Block,
        '<' => RegionKind::Quote,
        '"' => RegionKind::Verse,
        _ => return None,
    };
    let (fence, attrs) = fence_of(line, c)?;
    Some(Start::Region { kind, fence, attrs })
}

fn verbatim_start(line: &str) -> Option<Start<'_>> {
    let c = line.chars().next()?;
    let kind = match c {
        '`' => VerbatimKind::Code,
        '%' => VerbatimKind::Comment,
        '~' => VerbatimKind::Eval,
        '@' => VerbatimKind::Html,
        '$' => VerbatimKind::Math,
        _ => return None,
    };
    let (fence, attrs) = fence_of(line, c)?;
    Some(Start::Verbatim { kind, fence, attrs })
}

fn transclusion_start(line: &str) -> Option<Start<'_>> {
    let body = line.strip_prefix("{{{")?;
    let end = body.find("}}}")?;
    let rest = body[end + 3..].trim_matches(BLANKS);
    let attrs = if rest.is_empty() {
        Attributes::new()
    } else {
        parse_attrs_str(rest)?
    };
    Some(Start::Transclude {
        reference: Reference::parse(body[..end].trim()),
        attrs,
    })
}

/// List item whose first paragraph is still raw text
#[derive(Default)]
struct PendingItem {
    text: Option<String>,
    blocks: BlockSlice,
}

impl PendingItem {
    fn new(first: &str) -> Self {
        Self {
            text: (!first.is_empty()).then(|| first.to_string()),
            blocks: Vec::new(),
        }
    }

    fn push_line(&mut self, line: &str) {
        match &mut self.text {
            Some(text) => {
                text.push('\n');
                text.push_str(line);
            }
            None => self.text = Some(line.to_string()),
        }
    }

    fn finish(self) -> BlockSlice {
        let mut blocks = Vec::with_capacity(self.blocks.len() + 1);
        if let Some(text) = self.text {
            let inlines = parse_inlines(&text);
            if !inlines.is_empty() {
                blocks.push(BlockNode::para(inlines));
            }
        }
        blocks.extend(self.blocks);
        blocks
    }
}

struct ListFrame {
    kind: NestedListKind,
    items: Vec<PendingItem>,
}

impl ListFrame {
    fn finish(self) -> BlockNode {
        BlockNode::NestedList {
            kind: self.kind,
            attrs: Attributes::new(),
            items: self.items.into_iter().map(PendingItem::finish).collect(),
        }
    }
}

/// Close the innermost list; the outermost one is returned
fn close_frame(stack: &mut Vec<ListFrame>) -> Option<BlockNode> {
    let node = stack.pop()?.finish();
    match stack.last_mut() {
        Some(parent) => {
            last_or_default(&mut parent.items).blocks.push(node);
            None
        }
        None => Some(node),
    }
}

#[derive(Default)]
struct PendingEntry {
    term: String,
    descriptions: Vec<PendingItem>,
}

impl PendingEntry {
    fn finish(self) -> Description {
        Description {
            term: parse_inlines(&self.term),
            descriptions: self
                .descriptions
                .into_iter()
                .map(PendingItem::finish)
                .collect(),
        }
    }
}

struct BlockParser<'a> {
    lines: &'a [&'a str],
    pos: usize,
    depth: usize,
    fences: Vec<Fence>,
}

impl<'a> BlockParser<'a> {
    fn new(lines: &'a [&'a str], depth: usize) -> Self {
        Self {
            lines,
            pos: 0,
            depth,
            fences: Vec::new(),
        }
    }

    fn parse_all(mut self) -> BlockSlice {
        self.parse_blocks().0
    }

    fn line(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    /// Index of the innermost open fence closed by `line`, and the rest of the line
    fn fence_at(&self, line: &'a str) -> Option<(usize, &'a str)> {
        self.fences
            .iter()
            .enumerate()
            .rev()
            .find_map(|(idx, fence)| fence.closes(line).map(|rest| (idx, rest)))
    }

    fn is_closing(&self, line: &'a str) -> bool {
        self.fence_at(line).is_some()
    }

    /// Blocks up to the end of input or a closing fence
    ///
    /// Returns the rest of the closing line when the innermost fence was
    /// closed. An outer fence ends the blocks without being consumed.
    fn parse_blocks(&mut self) -> (BlockSlice, Option<&'a str>) {
        let mut blocks = Vec::new();
        while let Some(line) = self.line() {
            if let Some((idx, rest)) = self.fence_at(line) {
                if idx + 1 == self.fences.len() {
                    self.pos += 1;
                    return (blocks, Some(rest));
                }
                return (blocks, None);
            }
            if is_blank(line) {
                self.pos += 1;
                continue;
            }
            if let Some(block) = self.parse_block(line) {
                blocks.push(block);
            }
        }
        (blocks, None)
    }

    fn parse_block(&mut self, line: &'a str) -> Option<BlockNode> {
        match block_start(line) {
            Some(Start::Heading { level, rest }) => {
                self.pos += 1;
                Some(heading(level, rest))
            }
            Some(Start::Hrule(attrs)) => {
                self.pos += 1;
                Some(BlockNode::Hrule { attrs })
            }
            Some(Start::List { kinds, .. }) if self.depth + kinds.len() <= MAX_NESTING => {
                self.parse_list().or_else(|| self.parse_paragraph())
            }
            Some(Start::Term(_) | Start::Definition(_)) if self.depth < MAX_NESTING => {
                Some(self.parse_description())
            }
            Some(Start::Table) => Some(self.parse_table()),
            Some(Start::Region { kind, fence, attrs }) if self.depth < MAX_NESTING => {
                Some(self.parse_region(kind, fence, attrs))
            }
            Some(Start::Verbatim { kind, fence, attrs }) => {
                Some(self.parse_verbatim(kind, fence, attrs))
            }
            Some(Start::Transclude { reference, attrs }) => {
                self.pos += 1;
                Some(BlockNode::Transclude {
                    attrs,
                    reference,
                    inlines: Vec::new(),
                })
            }
            _ => self.parse_paragraph(),
        }
    }

    /// Lines up to a blank line, a closing fence or another block
    fn parse_paragraph(&mut self) -> Option<BlockNode> {
        let first = self.line()?;
        self.pos += 1;
        let mut text = first.trim_start_matches(BLANKS).to_string();
        while let Some(line) = self.line() {
            if is_blank(line) || self.is_closing(line) || block_start(line).is_some() {
                break;
            }
            text.push('\n');
            text.push_str(line.trim_start_matches(BLANKS));
            self.pos += 1;
        }
        let inlines = parse_inlines(&text);
        (!inlines.is_empty()).then(|| BlockNode::para(inlines))
    }

    fn next_non_blank(&self) -> Option<usize> {
        (self.pos..self.lines.len()).find(|&i| !is_blank(self.lines[i]))
    }

    /// Parse the lines indented by `levels` steps of two spaces from `start`
    ///
    /// Blank lines inside the group belong to it, trailing ones do not.
    fn take_group(&mut self, start: usize, levels: usize) -> BlockSlice {
        let prefix = "  ".repeat(levels);
        let mut group: Vec<&'a str> = Vec::new();
        let mut end = start;
        while let Some(&line) = self.lines.get(start + group.len()) {
            if is_blank(line) {
                group.push("");
            } else if let Some(stripped) = line.strip_prefix(prefix.as_str()) {
                group.push(stripped);
                end = start + group.len();
            } else {
                break;
            }
        }
        group.truncate(end - start);
        self.pos = end;

        let depth = self.depth + levels;
        if depth >= MAX_NESTING {
            let text: Vec<&str> = group.iter().map(|l| l.trim_matches(BLANKS)).collect();
            let inlines = parse_inlines(&text.join("\n"));
            return if inlines.is_empty() {
                Vec::new()
            } else {
                vec![BlockNode::para(inlines)]
            };
        }
        BlockParser::new(&group, depth).parse_all()
    }

    fn parse_list(&mut self) -> Option<BlockNode> {
        let mut stack: Vec<ListFrame> = Vec::new();
        while let Some(line) = self.line() {
            if self.is_closing(line) {
                break;
            }
            if let Some(Start::List { kinds, rest }) = block_start(line) {
                if self.depth + kinds.len() > MAX_NESTING {
                    break;
                }
                let common = stack
                    .iter()
                    .zip(&kinds)
                    .take_while(|(frame, kind)| frame.kind == **kind)
                    .count();
                if common == 0 && !stack.is_empty() {
                    break;
                }
                while stack.len() > common {
                    close_frame(&mut stack);
                }
                for &kind in &kinds[common..] {
                    if let Some(parent) = stack.last_mut() {
                        last_or_default(&mut parent.items);
                    }
                    stack.push(ListFrame {
                        kind,
                        items: Vec::new(),
                    });
                }
                if let Some(frame) = stack.last_mut() {
                    frame.items.push(PendingItem::new(rest));
                }
                self.pos += 1;
            } else if is_blank(line) {
                let Some(start) = self.next_non_blank() else {
                    break;
                };
                let levels = (indent_of(self.lines[start]) / 2).min(stack.len());
                if levels == 0 {
                    break;
                }
                let blocks = self.take_group(start, levels);
                while stack.len() > levels {
                    close_frame(&mut stack);
                }
                if let Some(frame) = stack.last_mut() {
                    last_or_default(&mut frame.items).blocks.extend(blocks);
                }
            } else if line.starts_with(BLANKS) {
                if let Some(frame) = stack.last_mut() {
                    last_or_default(&mut frame.items).push_line(line.trim_start_matches(BLANKS));
                }
                self.pos += 1;
            } else {
                break;
            }
        }
        let mut root = None;
        while !stack.is_empty() {
            root = close_frame(&mut stack);
        }
        root
    }

    fn parse_description(&mut self) -> BlockNode {
        let mut entries: Vec<PendingEntry> = Vec::new();
        while let Some(line) = self.line() {
            if self.is_closing(line) {
                break;
            }
            match block_start(line) {
                Some(Start::Term(rest)) => {
                    entries.push(PendingEntry {
                        term: rest.to_string(),
                        descriptions: Vec::new(),
                    });
                    self.pos += 1;
                }
                Some(Start::Definition(rest)) => {
                    last_or_default(&mut entries)
                        .descriptions
                        .push(PendingItem::new(rest));
                    self.pos += 1;
                }
                _ if is_blank(line) => {
                    let Some(start) = self.next_non_blank() else {
                        break;
                    };
                    if entries.is_empty() || indent_of(self.lines[start]) < 2 {
                        break;
                    }
                    let blocks = self.take_group(start, 1);
                    let entry = last_or_default(&mut entries);
                    last_or_default(&mut entry.descriptions).blocks.extend(blocks);
                }
                _ if line.starts_with(BLANKS) => {
                    let line = line.trim_start_matches(BLANKS);
                    let entry = last_or_default(&mut entries);
                    match entry.descriptions.last_mut() {
                        Some(item) => item.push_line(line),
                        None => {
                            entry.term.push('\n');
                            entry.term.push_str(line);
                        }
                    }
                    self.pos += 1;
                }
                _ => break,
            }
        }
        BlockNode::DescriptionList {
            attrs: Attributes::new(),
            entries: entries.into_iter().map(PendingEntry::finish).collect(),
        }
    }

    fn parse_table(&mut self) -> BlockNode {
        let mut rows = Vec::new();
        while let Some(line) = self.line() {
            let Some(row) = line.strip_prefix('|') else {
                break;
            };
            rows.push(table_row(row));
            self.pos += 1;
        }
        let is_header = rows
            .first()
            .is_some_and(|row| !row.is_empty() && row.iter().all(|cell| cell.starts_with('=')));
        let header: Vec<TableCell> = if is_header {
            rows.remove(0)
                .iter()
                .map(|raw| table_cell(&raw[1..]))
                .collect()
        } else {
            Vec::new()
        };
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(col, raw)| {
                        let mut cell = table_cell(raw);
                        if cell.align == Alignment::Default {
                            if let Some(head) = header.get(col) {
                                cell.align = head.align;
                            }
                        }
                        cell
                    })
                    .collect()
            })
            .collect();
        BlockNode::Table {
            attrs: Attributes::new(),
            header,
            rows,
        }
    }

    fn parse_region(&mut self, kind: RegionKind, fence: Fence, attrs: Attributes) -> BlockNode {
        self.pos += 1;
        self.fences.push(fence);
        self.depth += 1;
        let (blocks, trailer) = self.parse_blocks();
        self.depth -= 1;
        self.fences.pop();
        BlockNode::Region {
            kind,
            attrs,
            blocks,
            inlines: trailer
                .map(|rest| parse_inlines(rest.trim_matches(BLANKS)))
                .unwrap_or_default(),
        }
    }

    fn parse_verbatim(&mut self, kind: VerbatimKind, fence: Fence, attrs: Attributes) -> BlockNode {
        self.pos += 1;
        let mut content: Vec<&str> = Vec::new();
        let mut closed = false;
        while let Some(line) = self.line() {
            self.pos += 1;
            if fence.closes(line).is_some() {
                closed = true;
                break;
            }
            content.push(line);
        }
        if !closed {
            while content.last().is_some_and(|line| is_blank(line)) {
                content.pop();
            }
        }
        BlockNode::Verbatim {
            kind,
            attrs,
            content: content.join("\n"),
        }
    }
}

fn heading(level: u8, rest: &str) -> BlockNode {
    let (text, attrs) = split_trailing_attrs(rest);
    BlockNode::Heading {
        level,
        attrs,
        slug: String::new(),
        fragment: String::new(),
        inlines: parse_inlines(text.trim_matches(BLANKS)),
    }
}

/// Text and the attributes that follow it after a space at the end of a line
fn split_trailing_attrs(rest: &str) -> (&str, Attributes) {
    for (idx, _) in rest.match_indices(" {") {
        if let Some(attrs) = parse_attrs_str(&rest[idx + 1..]) {
            return (&rest[..idx], attrs);
        }
    }
    (rest, Attributes::new())
}

/// Raw, trimmed cell texts of a table row without its leading `|`
///
/// `|` inside links and other elements does not split cells; a trailing
/// `|` does not start another cell.
fn table_row(row: &str) -> Vec<String> {
    let mut parser = InlineParser::new(row);
    let len = parser.chars().len();
    let mut cells = Vec::new();
    let mut pos = 0;
    while pos < len {
        let parsed = parser.parse(pos, Closer::Pipe);
        let raw: String = parser.chars()[pos..parsed.end].iter().collect();
        cells.push(raw.trim_matches(BLANKS).to_string());
        pos = parsed.end + 1;
    }
    cells
}

fn table_cell(raw: &str) -> TableCell {
    let (text, align) = split_alignment(raw);
    TableCell {
        align,
        inlines: parse_inlines(text.trim_matches(BLANKS)),
    }
}

/// Cell text and the alignment set by an unescaped trailing `<`, `:` or `>`
fn split_alignment(raw: &str) -> (&str, Alignment) {
    let align = match raw.chars().last() {
        Some('<') => Alignment::Left,
        Some(':') => Alignment::Center,
        Some('>') => Alignment::Right,
        _ => return (raw, Alignment::Default),
    };
    let body = &raw[..raw.len() - 1];
    let marker = raw.chars().last();
    let backslashes = body.chars().rev().take_while(|&c| c == '\\').count();
    if body.chars().last() == marker || backslashes % 2 == 1 {
        return (raw, Alignment::Default);
    }
    (body, align)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::InlineNode;
    use crate::reference::RefState;
    use pretty_assertions::assert_eq;

    fn para(text: &str) -> BlockNode {
        BlockNode::para(vec![InlineNode::text(text)])
    }

    fn list(kind: NestedListKind, items: Vec<BlockSlice>) -> BlockNode {
        BlockNode::NestedList {
            kind,
            attrs: Attributes::new(),
            items,
        }
    }

    fn cell(align: Alignment, text: &str) -> TableCell {
        TableCell {
            align,
            inlines: vec![InlineNode::text(text)],
        }
    }

    #[test]
    fn test_headings() {
        let blocks = parse_document("= Heading\n=== Sub **x** {.c lang=de}\n=nospace");
        assert_eq!(
            blocks[0],
            BlockNode::Heading {
                level: 1,
                attrs: Attributes::new(),
                slug: String::new(),
                fragment: String::new(),
                inlines: vec![InlineNode::text("Heading")],
            }
        );
        match &blocks[1] {
            BlockNode::Heading {
                level,
                attrs,
                inlines,
                ..
            } => {
                assert_eq!(*level, 3);
                assert_eq!(attrs.get("class"), Some("c"));
                assert_eq!(attrs.get("lang"), Some("de"));
                assert_eq!(inlines.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(blocks[2], para("=nospace"));
    }

    #[test]
    fn test_same_heading_twice() {
        let blocks = parse_document("= Heading\n= Heading");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], blocks[1]);
    }

    #[test]
    fn test_hrule() {
        let blocks = parse_document("---\n----- {.x}\n---x");
        assert_eq!(blocks[0], BlockNode::Hrule { attrs: Attributes::new() });
        assert_eq!(
            blocks[1],
            BlockNode::Hrule {
                attrs: Attributes::new().with("class", "x")
            }
        );
        assert_eq!(blocks[2], para("---x"));
    }

    #[test]
    fn test_paragraph_lines() {
        let blocks = parse_document("one\n  two\n= H\n\nthree");
        assert_eq!(
            blocks[0],
            BlockNode::para(vec![
                InlineNode::text("one"),
                InlineNode::Soft,
                InlineNode::text("two")
            ])
        );
        assert!(matches!(blocks[1], BlockNode::Heading { .. }));
        assert_eq!(blocks[2], para("three"));
    }

    #[test]
    fn test_nested_lists() {
        let blocks = parse_document("* a\n* b\n** c\n# d");
        assert_eq!(
            blocks,
            vec![
                list(
                    NestedListKind::Unordered,
                    vec![
                        vec![para("a")],
                        vec![
                            para("b"),
                            list(NestedListKind::Unordered, vec![vec![para("c")]])
                        ],
                    ]
                ),
                list(NestedListKind::Ordered, vec![vec![para("d")]]),
            ]
        );
    }

    #[test]
    fn test_list_without_parent_item() {
        let blocks = parse_document("*# x");
        assert_eq!(
            blocks,
            vec![list(
                NestedListKind::Unordered,
                vec![vec![list(NestedListKind::Ordered, vec![vec![para("x")]])]]
            )]
        );
    }

    #[test]
    fn test_list_item_continuation_and_blocks() {
        let blocks = parse_document("* a\n  b\n\n  Second\n\n  ```\n  code\n  ```\n* c\n\nafter");
        assert_eq!(
            blocks,
            vec![
                list(
                    NestedListKind::Unordered,
                    vec![
                        vec![
                            BlockNode::para(vec![
                                InlineNode::text("a"),
                                InlineNode::Soft,
                                InlineNode::text("b")
                            ]),
                            para("Second"),
                            BlockNode::Verbatim {
                                kind: VerbatimKind::Code,
                                attrs: Attributes::new(),
                                content: "code".into(),
                            },
                        ],
                        vec![para("c")],
                    ]
                ),
                para("after"),
            ]
        );
    }

    #[test]
    fn test_blank_line_separates_lists() {
        let blocks = parse_document("* a\n\n* b");
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_quote_list_and_empty_item() {
        let blocks = parse_document("> quoted\n>");
        assert_eq!(
            blocks,
            vec![list(NestedListKind::Quote, vec![vec![para("quoted")], vec![]])]
        );
    }

    #[test]
    fn test_description_list() {
        let blocks = parse_document("; Term\n: One\n: Two\n\n  More\n; Next\n:");
        assert_eq!(
            blocks,
            vec![BlockNode::DescriptionList {
                attrs: Attributes::new(),
                entries: vec![
                    Description {
                        term: vec![InlineNode::text("Term")],
                        descriptions: vec![vec![para("One")], vec![para("Two"), para("More")]],
                    },
                    Description {
                        term: vec![InlineNode::text("Next")],
                        descriptions: vec![vec![]],
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_table_header_and_alignment() {
        let blocks = parse_document("|=Name|=Age>\n|a|1\n| b | 2< |");
        assert_eq!(
            blocks,
            vec![BlockNode::Table {
                attrs: Attributes::new(),
                header: vec![cell(Alignment::Default, "Name"), cell(Alignment::Right, "Age")],
                rows: vec![
                    vec![cell(Alignment::Default, "a"), cell(Alignment::Right, "1")],
                    vec![cell(Alignment::Default, "b"), cell(Alignment::Left, "2")],
                ],
            }]
        );
    }

    #[test]
    fn test_table_cell_escapes() {
        let blocks = parse_document("|[[x|y]]|a\\>|b>>|c\\\\:");
        match &blocks[0] {
            BlockNode::Table { header, rows, .. } => {
                assert!(header.is_empty());
                let row = &rows[0];
                assert_eq!(row.len(), 4);
                assert!(matches!(row[0].inlines[0], InlineNode::Link { .. }));
                assert_eq!(row[1], cell(Alignment::Default, "a>"));
                assert_eq!(row[2], cell(Alignment::Default, "b>>"));
                assert_eq!(row[3], cell(Alignment::Center, "c\\"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_regions() {
        let blocks = parse_document("<<<\nQuoted\n<<< Author\n:::::{.note}\n:::\ninner\n:::\n:::::");
        assert_eq!(
            blocks[0],
            BlockNode::Region {
                kind: RegionKind::Quote,
                attrs: Attributes::new(),
                blocks: vec![para("Quoted")],
                inlines: vec![InlineNode::text("Author")],
            }
        );
        assert_eq!(
            blocks[1],
            BlockNode::Region {
                kind: RegionKind::Block,
                attrs: Attributes::new().with("class", "note"),
                blocks: vec![BlockNode::Region {
                    kind: RegionKind::Block,
                    attrs: Attributes::new(),
                    blocks: vec![para("inner")],
                    inlines: Vec::new(),
                }],
                inlines: Vec::new(),
            }
        );
    }

    #[test]
    fn test_verbatim() {
        let blocks = parse_document("```rust\nfn main() {}\n\n   ``\n````\nafter\n%%%\nnote\n\n");
        assert_eq!(
            blocks,
            vec![
                BlockNode::Verbatim {
                    kind: VerbatimKind::Code,
                    attrs: Attributes::new().with(DEFAULT_KEY, "rust"),
                    content: "fn main() {}\n\n   ``".into(),
                },
                para("after"),
                BlockNode::Verbatim {
                    kind: VerbatimKind::Comment,
                    attrs: Attributes::new(),
                    content: "note".into(),
                },
            ]
        );
    }

    #[test]
    fn test_transclusion() {
        let blocks = parse_document("{{{20240101000000}}}{.x}\n{{{bad}}} tail");
        match &blocks[0] {
            BlockNode::Transclude {
                attrs, reference, ..
            } => {
                assert_eq!(reference.state, RefState::Zettel);
                assert_eq!(attrs.get("class"), Some("x"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(blocks[1], BlockNode::Para { .. }));
    }

    #[test]
    fn test_crlf() {
        assert_eq!(parse_document("a\r\nb\rc").len(), 1);
        assert_eq!(parse_document("a\r\n\r\nb").len(), 2);
    }

    #[test]
    fn test_nesting_is_bounded() {
        let input: Vec<String> = (0..500).map(|i| ":".repeat(600 - i)).collect();
        let blocks = parse_document(&input.join("\n"));
        assert_eq!(blocks.len(), 1);

        let mut deep = String::new();
        for level in 0..200 {
            deep.push_str(&"  ".repeat(level));
            deep.push_str("* x\n\n");
        }
        assert!(!parse_document(&deep).is_empty());
    }
}
