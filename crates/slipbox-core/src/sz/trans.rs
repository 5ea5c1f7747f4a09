// SPDX-License-Identifier: AGPL-3.0-or-later
//! Transformer between the typed AST and the canonical symbolic form

use super::{
    kind_of, sym_of, Sym, CELL_ALIGNMENTS, FORMAT_KINDS, LIST_KINDS, LITERAL_KINDS, REF_STATES,
    REGION_KINDS, VERBATIM_KINDS,
};
use crate::ast::{
    BlockNode, BlockSlice, Description, InlineNode, InlineSlice, TableCell,
};
use crate::attrs::Attributes;
use crate::reference::Reference;
use crate::sx::{Sx, SxError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Syntax whose BLOB data is kept as text instead of base64
const TEXT_BLOB_SYNTAX: &str = "svg";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("Read error: {0}")]
    Read(#[from] SxError),

    #[error("Expected {expected}, found {found}")]
    Expected { expected: &'static str, found: String },

    #[error("Malformed {tag} node: {message}")]
    Shape { tag: &'static str, message: String },
}

type Result<T> = std::result::Result<T, TransformError>;

fn expected(expected: &'static str, found: &Sx) -> TransformError {
    TransformError::Expected {
        expected,
        found: found.print(),
    }
}

fn tagged(sym: Sym, mut rest: Vec<Sx>) -> Sx {
    rest.insert(0, sym.to_sx());
    Sx::List(rest)
}

// AST -> sx

/// Canonical form of a block slice: `(BLOCK ...)`
pub fn to_sx(blocks: &BlockSlice) -> Sx {
    tagged(Sym::Block, blocks.iter().map(block_to_sx).collect())
}

fn inline_slice_to_sx(inlines: &InlineSlice) -> Sx {
    tagged(Sym::Inline, inlines.iter().map(inline_to_sx).collect())
}

fn attrs_to_sx(attrs: &Attributes) -> Sx {
    Sx::List(
        attrs
            .iter()
            .map(|(k, v)| Sx::List(vec![Sx::string(k), Sx::string(v)]))
            .collect(),
    )
}

fn reference_to_sx(reference: &Reference) -> Sx {
    Sx::List(vec![
        sym_of(REF_STATES, reference.state).to_sx(),
        Sx::string(reference.value.as_str()),
    ])
}

fn blob_data_to_sx(syntax: &str, data: &[u8]) -> Sx {
    if syntax == TEXT_BLOB_SYNTAX {
        Sx::string(String::from_utf8_lossy(data))
    } else {
        Sx::string(BASE64.encode(data))
    }
}

fn list_item_to_sx(item: &BlockSlice) -> Sx {
    match item.as_slice() {
        [BlockNode::Para { inlines }] => inline_slice_to_sx(inlines),
        _ => to_sx(item),
    }
}

fn with_inlines(mut head: Vec<Sx>, inlines: &InlineSlice) -> Vec<Sx> {
    head.extend(inlines.iter().map(inline_to_sx));
    head
}

pub fn block_to_sx(block: &BlockNode) -> Sx {
    match block {
        BlockNode::Para { inlines } => tagged(Sym::Para, with_inlines(Vec::new(), inlines)),
        BlockNode::Heading {
            level,
            attrs,
            slug,
            fragment,
            inlines,
        } => tagged(
            Sym::Heading,
            with_inlines(
                vec![
                    Sx::Int(i64::from(*level)),
                    attrs_to_sx(attrs),
                    Sx::string(slug.as_str()),
                    Sx::string(fragment.as_str()),
                ],
                inlines,
            ),
        ),
        BlockNode::Hrule { attrs } => tagged(Sym::Thematic, vec![attrs_to_sx(attrs)]),
        BlockNode::NestedList { kind, attrs, items } => {
            let mut rest = vec![attrs_to_sx(attrs)];
            rest.extend(items.iter().map(list_item_to_sx));
            tagged(sym_of(LIST_KINDS, *kind), rest)
        }
        BlockNode::DescriptionList { attrs, entries } => {
            let mut rest = vec![attrs_to_sx(attrs)];
            for entry in entries {
                rest.push(inline_slice_to_sx(&entry.term));
                rest.push(tagged(
                    Sym::Block,
                    entry.descriptions.iter().map(to_sx).collect(),
                ));
            }
            tagged(Sym::Description, rest)
        }
        BlockNode::Table {
            attrs,
            header,
            rows,
        } => {
            let mut rest = vec![attrs_to_sx(attrs), cells_to_sx(header)];
            rest.extend(rows.iter().map(|row| cells_to_sx(row)));
            tagged(Sym::Table, rest)
        }
        BlockNode::Region {
            kind,
            attrs,
            blocks,
            inlines,
        } => tagged(
            sym_of(REGION_KINDS, *kind),
            with_inlines(vec![attrs_to_sx(attrs), to_sx(blocks)], inlines),
        ),
        BlockNode::Verbatim {
            kind,
            attrs,
            content,
        } => tagged(
            sym_of(VERBATIM_KINDS, *kind),
            vec![attrs_to_sx(attrs), Sx::string(content.as_str())],
        ),
        BlockNode::Transclude {
            attrs,
            reference,
            inlines,
        } => tagged(
            Sym::Transclude,
            with_inlines(vec![attrs_to_sx(attrs), reference_to_sx(reference)], inlines),
        ),
        BlockNode::Blob {
            description,
            syntax,
            data,
        } => tagged(
            Sym::Blob,
            vec![
                inline_slice_to_sx(description),
                Sx::string(syntax.as_str()),
                blob_data_to_sx(syntax, data),
            ],
        ),
        BlockNode::Unknown { node } => node.clone(),
    }
}

fn cells_to_sx(cells: &[TableCell]) -> Sx {
    Sx::List(
        cells
            .iter()
            .map(|cell| {
                tagged(
                    sym_of(CELL_ALIGNMENTS, cell.align),
                    with_inlines(Vec::new(), &cell.inlines),
                )
            })
            .collect(),
    )
}

pub fn inline_to_sx(inline: &InlineNode) -> Sx {
    match inline {
        InlineNode::Text { text } => tagged(Sym::Text, vec![Sx::string(text.as_str())]),
        InlineNode::Soft => tagged(Sym::Soft, Vec::new()),
        InlineNode::Hard => tagged(Sym::Hard, Vec::new()),
        InlineNode::Link {
            attrs,
            reference,
            inlines,
        } => tagged(
            Sym::Link,
            with_inlines(vec![attrs_to_sx(attrs), reference_to_sx(reference)], inlines),
        ),
        InlineNode::Embed {
            attrs,
            reference,
            syntax,
            inlines,
        } => tagged(
            Sym::Embed,
            with_inlines(
                vec![
                    attrs_to_sx(attrs),
                    reference_to_sx(reference),
                    Sx::string(syntax.as_str()),
                ],
                inlines,
            ),
        ),
        InlineNode::EmbedBlob {
            attrs,
            syntax,
            data,
            inlines,
        } => tagged(
            Sym::EmbedBlob,
            with_inlines(
                vec![
                    attrs_to_sx(attrs),
                    Sx::string(syntax.as_str()),
                    blob_data_to_sx(syntax, data),
                ],
                inlines,
            ),
        ),
        InlineNode::Cite {
            attrs,
            key,
            inlines,
        } => tagged(
            Sym::Cite,
            with_inlines(vec![attrs_to_sx(attrs), Sx::string(key.as_str())], inlines),
        ),
        InlineNode::Mark {
            mark,
            slug,
            fragment,
            inlines,
        } => tagged(
            Sym::Mark,
            with_inlines(
                vec![
                    Sx::string(mark.as_str()),
                    Sx::string(slug.as_str()),
                    Sx::string(fragment.as_str()),
                ],
                inlines,
            ),
        ),
        InlineNode::Footnote { attrs, inlines } => {
            tagged(Sym::Endnote, with_inlines(vec![attrs_to_sx(attrs)], inlines))
        }
        InlineNode::Format {
            kind,
            attrs,
            inlines,
        } => tagged(
            sym_of(FORMAT_KINDS, *kind),
            with_inlines(vec![attrs_to_sx(attrs)], inlines),
        ),
        InlineNode::Literal {
            kind,
            attrs,
            content,
        } => tagged(
            sym_of(LITERAL_KINDS, *kind),
            vec![attrs_to_sx(attrs), Sx::string(content.as_str())],
        ),
        InlineNode::Unknown { node } => node.clone(),
    }
}

// sx -> AST

/// Positional reader over the children of a tagged list
struct Args<'a> {
    sym: Sym,
    items: &'a [Sx],
    pos: usize,
}

impl<'a> Args<'a> {
    fn new(sym: Sym, items: &'a [Sx]) -> Self {
        Self { sym, items, pos: 0 }
    }

    fn shape(&self, message: impl Into<String>) -> TransformError {
        TransformError::Shape {
            tag: self.sym.name(),
            message: message.into(),
        }
    }

    fn next(&mut self, what: &str) -> Result<&'a Sx> {
        let item = self
            .items
            .get(self.pos)
            .ok_or_else(|| self.shape(format!("missing {what}")))?;
        self.pos += 1;
        Ok(item)
    }

    fn string(&mut self, what: &str) -> Result<String> {
        let item = self.next(what)?;
        item.as_str()
            .map(str::to_string)
            .ok_or_else(|| self.shape(format!("{what} must be a string, found {}", item.print())))
    }

    fn int(&mut self, what: &str) -> Result<i64> {
        let item = self.next(what)?;
        item.as_int()
            .ok_or_else(|| self.shape(format!("{what} must be an integer, found {}", item.print())))
    }

    fn list(&mut self, what: &str) -> Result<&'a [Sx]> {
        let item = self.next(what)?;
        item.as_list()
            .ok_or_else(|| self.shape(format!("{what} must be a list, found {}", item.print())))
    }

    fn attrs(&mut self) -> Result<Attributes> {
        let pairs = self.list("attributes")?;
        let mut attrs = Attributes::new();
        for pair in pairs {
            match pair.as_list() {
                Some([Sx::String(key), Sx::String(value)]) => attrs.set(key.as_str(), value.as_str()),
                _ => return Err(self.shape(format!("bad attribute {}", pair.print()))),
            }
        }
        Ok(attrs)
    }

    fn reference(&mut self) -> Result<Reference> {
        let item = self.next("reference")?;
        let state = match item.as_list() {
            Some([Sx::Symbol(name), Sx::String(value)]) => Sym::from_name(name)
                .and_then(|sym| kind_of(REF_STATES, sym))
                .map(|state| Reference::new(state, value.as_str())),
            _ => None,
        };
        state.ok_or_else(|| self.shape(format!("bad reference {}", item.print())))
    }

    fn blob_data(&mut self, syntax: &str) -> Result<Vec<u8>> {
        let data = self.string("data")?;
        if syntax == TEXT_BLOB_SYNTAX {
            return Ok(data.into_bytes());
        }
        BASE64
            .decode(data.as_bytes())
            .map_err(|err| self.shape(format!("bad base64 data: {err}")))
    }

    fn rest(&mut self) -> &'a [Sx] {
        let rest = &self.items[self.pos.min(self.items.len())..];
        self.pos = self.items.len();
        rest
    }

    fn rest_inlines(&mut self) -> Result<InlineSlice> {
        self.rest().iter().map(inline_from_sx).collect()
    }

    fn done(&self) -> Result<()> {
        if self.pos < self.items.len() {
            return Err(self.shape(format!("{} unexpected trailing elements", self.items.len() - self.pos)));
        }
        Ok(())
    }
}

/// Split `(TAG child...)` into its tag name and children
fn split_tagged(sx: &Sx) -> Result<(&str, &[Sx])> {
    match sx.as_list() {
        Some([Sx::Symbol(name), rest @ ..]) => Ok((name.as_str(), rest)),
        _ => Err(expected("tagged list", sx)),
    }
}

fn expect_slice<'a>(sx: &'a Sx, sym: Sym) -> Result<&'a [Sx]> {
    match split_tagged(sx)? {
        (name, rest) if name == sym.name() => Ok(rest),
        _ => Err(expected(sym.name(), sx)),
    }
}

/// Block slice from `(BLOCK ...)`; nil is an empty slice
pub fn blocks_from_sx(sx: &Sx) -> Result<BlockSlice> {
    if sx.is_nil() {
        return Ok(Vec::new());
    }
    expect_slice(sx, Sym::Block)?
        .iter()
        .map(block_from_sx)
        .collect()
}

/// Inline slice from `(INLINE ...)`; nil is an empty slice
pub fn inlines_from_sx(sx: &Sx) -> Result<InlineSlice> {
    if sx.is_nil() {
        return Ok(Vec::new());
    }
    expect_slice(sx, Sym::Inline)?
        .iter()
        .map(inline_from_sx)
        .collect()
}

fn list_item_from_sx(sx: &Sx) -> Result<BlockSlice> {
    match split_tagged(sx)? {
        (name, _) if name == Sym::Inline.name() => {
            Ok(vec![BlockNode::para(inlines_from_sx(sx)?)])
        }
        _ => blocks_from_sx(sx),
    }
}

fn cells_from_sx(sym: Sym, row: &[Sx]) -> Result<Vec<TableCell>> {
    row.iter()
        .map(|cell| {
            let (name, children) = split_tagged(cell)?;
            let align = Sym::from_name(name)
                .and_then(|s| kind_of(CELL_ALIGNMENTS, s))
                .ok_or_else(|| TransformError::Shape {
                    tag: sym.name(),
                    message: format!("bad cell {}", cell.print()),
                })?;
            let inlines = children
                .iter()
                .map(inline_from_sx)
                .collect::<Result<InlineSlice>>()?;
            Ok(TableCell { align, inlines })
        })
        .collect()
}

fn unknown_block(name: &str, sx: &Sx) -> BlockNode {
    tracing::warn!(tag = name, "unknown block node in canonical tree");
    BlockNode::Unknown { node: sx.clone() }
}

fn unknown_inline(name: &str, sx: &Sx) -> InlineNode {
    tracing::warn!(tag = name, "unknown inline node in canonical tree");
    InlineNode::Unknown { node: sx.clone() }
}

pub fn block_from_sx(sx: &Sx) -> Result<BlockNode> {
    let (name, children) = split_tagged(sx)?;
    let Some(sym) = Sym::from_name(name) else {
        return Ok(unknown_block(name, sx));
    };
    let mut args = Args::new(sym, children);

    if let Some(kind) = kind_of(LIST_KINDS, sym) {
        let attrs = args.attrs()?;
        let items = args
            .rest()
            .iter()
            .map(list_item_from_sx)
            .collect::<Result<Vec<_>>>()?;
        return Ok(BlockNode::NestedList { kind, attrs, items });
    }
    if let Some(kind) = kind_of(REGION_KINDS, sym) {
        let attrs = args.attrs()?;
        let blocks = blocks_from_sx(args.next("blocks")?)?;
        let inlines = args.rest_inlines()?;
        return Ok(BlockNode::Region {
            kind,
            attrs,
            blocks,
            inlines,
        });
    }
    if let Some(kind) = kind_of(VERBATIM_KINDS, sym) {
        let attrs = args.attrs()?;
        let content = args.string("content")?;
        args.done()?;
        return Ok(BlockNode::Verbatim {
            kind,
            attrs,
            content,
        });
    }

    let block = match sym {
        Sym::Para => BlockNode::Para {
            inlines: args.rest_inlines()?,
        },
        Sym::Heading => {
            let level = args.int("level")?;
            let level = u8::try_from(level)
                .ok()
                .filter(|l| (1..=6).contains(l))
                .ok_or_else(|| args.shape(format!("level {level} out of range")))?;
            BlockNode::Heading {
                level,
                attrs: args.attrs()?,
                slug: args.string("slug")?,
                fragment: args.string("fragment")?,
                inlines: args.rest_inlines()?,
            }
        }
        Sym::Thematic => {
            let attrs = args.attrs()?;
            args.done()?;
            BlockNode::Hrule { attrs }
        }
        Sym::Description => {
            let attrs = args.attrs()?;
            let rest = args.rest();
            let mut entries = Vec::with_capacity(rest.len() / 2);
            for pair in rest.chunks(2) {
                let term = inlines_from_sx(&pair[0])?;
                let descriptions = match pair.get(1) {
                    Some(descs) => expect_slice(descs, Sym::Block)?
                        .iter()
                        .map(blocks_from_sx)
                        .collect::<Result<Vec<_>>>()?,
                    None => Vec::new(),
                };
                entries.push(Description { term, descriptions });
            }
            BlockNode::DescriptionList { attrs, entries }
        }
        Sym::Table => {
            let attrs = args.attrs()?;
            let header = cells_from_sx(sym, args.list("header")?)?;
            let rows = args
                .rest()
                .iter()
                .map(|row| match row.as_list() {
                    Some(cells) => cells_from_sx(sym, cells),
                    None => Err(expected("table row", row)),
                })
                .collect::<Result<Vec<_>>>()?;
            BlockNode::Table {
                attrs,
                header,
                rows,
            }
        }
        Sym::Transclude => BlockNode::Transclude {
            attrs: args.attrs()?,
            reference: args.reference()?,
            inlines: args.rest_inlines()?,
        },
        Sym::Blob => {
            let description = inlines_from_sx(args.next("description")?)?;
            let syntax = args.string("syntax")?;
            let data = args.blob_data(&syntax)?;
            args.done()?;
            BlockNode::Blob {
                description,
                syntax,
                data,
            }
        }
        _ => unknown_block(name, sx),
    };
    Ok(block)
}

pub fn inline_from_sx(sx: &Sx) -> Result<InlineNode> {
    let (name, children) = split_tagged(sx)?;
    let Some(sym) = Sym::from_name(name) else {
        return Ok(unknown_inline(name, sx));
    };
    let mut args = Args::new(sym, children);

    if let Some(kind) = kind_of(FORMAT_KINDS, sym) {
        return Ok(InlineNode::Format {
            kind,
            attrs: args.attrs()?,
            inlines: args.rest_inlines()?,
        });
    }
    if let Some(kind) = kind_of(LITERAL_KINDS, sym) {
        let attrs = args.attrs()?;
        let content = args.string("content")?;
        args.done()?;
        return Ok(InlineNode::Literal {
            kind,
            attrs,
            content,
        });
    }

    let inline = match sym {
        Sym::Text => {
            let text = args.string("text")?;
            args.done()?;
            InlineNode::Text { text }
        }
        Sym::Soft => {
            args.done()?;
            InlineNode::Soft
        }
        Sym::Hard => {
            args.done()?;
            InlineNode::Hard
        }
        Sym::Link => InlineNode::Link {
            attrs: args.attrs()?,
            reference: args.reference()?,
            inlines: args.rest_inlines()?,
        },
        Sym::Embed => InlineNode::Embed {
            attrs: args.attrs()?,
            reference: args.reference()?,
            syntax: args.string("syntax")?,
            inlines: args.rest_inlines()?,
        },
        Sym::EmbedBlob => {
            let attrs = args.attrs()?;
            let syntax = args.string("syntax")?;
            let data = args.blob_data(&syntax)?;
            InlineNode::EmbedBlob {
                attrs,
                syntax,
                data,
                inlines: args.rest_inlines()?,
            }
        }
        Sym::Cite => InlineNode::Cite {
            attrs: args.attrs()?,
            key: args.string("key")?,
            inlines: args.rest_inlines()?,
        },
        Sym::Mark => InlineNode::Mark {
            mark: args.string("mark")?,
            slug: args.string("slug")?,
            fragment: args.string("fragment")?,
            inlines: args.rest_inlines()?,
        },
        Sym::Endnote => InlineNode::Footnote {
            attrs: args.attrs()?,
            inlines: args.rest_inlines()?,
        },
        _ => unknown_inline(name, sx),
    };
    Ok(inline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Alignment, FormatKind, NestedListKind, VerbatimKind};
    use crate::reference::RefState;
    use crate::sz::{parse_sz, print_sz};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bold_paragraph() {
        let blocks = vec![BlockNode::para(vec![
            InlineNode::text("Hello "),
            InlineNode::Format {
                kind: FormatKind::Strong,
                attrs: Attributes::new(),
                inlines: vec![InlineNode::text("world")],
            },
        ])];
        assert_eq!(
            print_sz(&blocks),
            r#"(BLOCK (PARA (TEXT "Hello ") (FORMAT-STRONG () (TEXT "world"))))"#
        );
    }

    #[test]
    fn test_list_compaction() {
        let blocks = vec![BlockNode::NestedList {
            kind: NestedListKind::Unordered,
            attrs: Attributes::new(),
            items: vec![
                vec![BlockNode::para(vec![InlineNode::text("a")])],
                vec![
                    BlockNode::para(vec![InlineNode::text("b")]),
                    BlockNode::para(vec![InlineNode::text("c")]),
                ],
            ],
        }];
        let text = print_sz(&blocks);
        assert_eq!(
            text,
            r#"(BLOCK (UNORDERED () (INLINE (TEXT "a")) (BLOCK (PARA (TEXT "b")) (PARA (TEXT "c")))))"#
        );
        assert_eq!(parse_sz(&text).unwrap(), blocks);
    }

    #[test]
    fn test_heading_and_attrs() {
        let text = r#"(BLOCK (HEADING 2 (("-" "x") ("class" "a b")) "s" "s-1" (TEXT "T")))"#;
        let blocks = parse_sz(text).unwrap();
        match &blocks[0] {
            BlockNode::Heading {
                level,
                attrs,
                fragment,
                ..
            } => {
                assert_eq!(*level, 2);
                assert_eq!(attrs.get("class"), Some("a b"));
                assert_eq!(fragment, "s-1");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(print_sz(&blocks), text);
    }

    #[test]
    fn test_blob_encodings() {
        let png = vec![BlockNode::Blob {
            description: vec![InlineNode::text("pic")],
            syntax: "png".into(),
            data: vec![0x89, b'P', b'N', b'G'],
        }];
        let text = print_sz(&png);
        assert!(text.contains(r#""png" "iVBORw==""#), "{text}");
        assert_eq!(parse_sz(&text).unwrap(), png);

        let svg = vec![BlockNode::Blob {
            description: Vec::new(),
            syntax: "svg".into(),
            data: b"<svg/>".to_vec(),
        }];
        assert_eq!(print_sz(&svg), r#"(BLOCK (BLOB (INLINE) "svg" "<svg/>"))"#);
    }

    #[test]
    fn test_table_and_reference() {
        let text = r#"(BLOCK (TABLE () ((CELL-LEFT (TEXT "h"))) ((CELL (LINK () (REF-STATE-ZETTEL "20240101000000") (TEXT "z"))))))"#;
        let blocks = parse_sz(text).unwrap();
        match &blocks[0] {
            BlockNode::Table { header, rows, .. } => {
                assert_eq!(header[0].align, Alignment::Left);
                match &rows[0][0].inlines[0] {
                    InlineNode::Link { reference, .. } => {
                        assert_eq!(reference.state, RefState::Zettel)
                    }
                    other => panic!("unexpected {other:?}"),
                }
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(print_sz(&blocks), text);
    }

    #[test]
    fn test_unknown_tags_preserved() {
        let text = r#"(BLOCK (FANCY-BLOCK 1 2) (PARA (SPARKLE "x")))"#;
        let blocks = parse_sz(text).unwrap();
        assert!(matches!(blocks[0], BlockNode::Unknown { .. }));
        assert_eq!(print_sz(&blocks), text);
    }

    #[test]
    fn test_shape_errors() {
        for bad in [
            r#"(BLOCK (HEADING 0 () "" "" ))"#,
            r#"(BLOCK (HEADING "1" () "" ""))"#,
            r#"(BLOCK (VERBATIM-CODE ()))"#,
            r#"(BLOCK (PARA (TEXT 1)))"#,
            r#"(BLOCK (PARA (LINK () (REF-STATE-NOPE "x"))))"#,
            r#"(BLOCK (THEMATIC (("a"))))"#,
            r#"(BLOCK (BLOB (INLINE) "png" "***"))"#,
            r#"(PARA)"#,
            r#"(BLOCK "text")"#,
        ] {
            assert!(parse_sz(bad).is_err(), "{bad} accepted");
        }
        assert!(matches!(parse_sz("(BLOCK"), Err(TransformError::Read(_))));
    }

    #[test]
    fn test_verbatim_roundtrip() {
        let blocks = vec![BlockNode::Verbatim {
            kind: VerbatimKind::Math,
            attrs: Attributes::new(),
            content: "a^2\n".into(),
        }];
        assert_eq!(parse_sz(&print_sz(&blocks)).unwrap(), blocks);
    }
}
