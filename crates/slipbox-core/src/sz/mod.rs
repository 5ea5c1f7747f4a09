// SPDX-License-Identifier: AGPL-3.0-or-later
//! Canonical symbolic form ("sz") of a zettel tree
//!
//! [`Sym`] is the single table of node tags. The transformer in [`trans`]
//! maps typed AST nodes to tagged lists and back using that table only.

mod trans;

pub use trans::{
    block_from_sx, block_to_sx, blocks_from_sx, inline_from_sx, inline_to_sx, inlines_from_sx,
    to_sx, TransformError,
};

use crate::ast::{
    Alignment, BlockSlice, FormatKind, LiteralKind, NestedListKind, RegionKind, VerbatimKind,
};
use crate::reference::RefState;
use crate::sx::Sx;

macro_rules! define_symbols {
    ($( $variant:ident => $name:literal ),* $(,)?) => {
        /// Tags of canonical nodes
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Sym {
            $($variant),*
        }

        impl Sym {
            pub const ALL: &'static [Sym] = &[$(Sym::$variant),*];

            pub const fn name(self) -> &'static str {
                match self {
                    $(Sym::$variant => $name),*
                }
            }

            pub fn from_name(name: &str) -> Option<Sym> {
                match name {
                    $($name => Some(Sym::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

define_symbols! {
    Block => "BLOCK",
    Inline => "INLINE",

    Para => "PARA",
    Heading => "HEADING",
    Thematic => "THEMATIC",
    Ordered => "ORDERED",
    Unordered => "UNORDERED",
    Quotation => "QUOTATION",
    Description => "DESCRIPTION",
    Table => "TABLE",
    Cell => "CELL",
    CellLeft => "CELL-LEFT",
    CellCenter => "CELL-CENTER",
    CellRight => "CELL-RIGHT",
    RegionBlock => "REGION-BLOCK",
    RegionQuote => "REGION-QUOTE",
    RegionVerse => "REGION-VERSE",
    VerbatimCode => "VERBATIM-CODE",
    VerbatimComment => "VERBATIM-COMMENT",
    VerbatimEval => "VERBATIM-EVAL",
    VerbatimHtml => "VERBATIM-HTML",
    VerbatimMath => "VERBATIM-MATH",
    Transclude => "TRANSCLUDE",
    Blob => "BLOB",

    Text => "TEXT",
    Soft => "SOFT",
    Hard => "HARD",
    Link => "LINK",
    Embed => "EMBED",
    EmbedBlob => "EMBED-BLOB",
    Cite => "CITE",
    Mark => "MARK",
    Endnote => "ENDNOTE",
    FormatEmph => "FORMAT-EMPH",
    FormatStrong => "FORMAT-STRONG",
    FormatInsert => "FORMAT-INSERT",
    FormatDelete => "FORMAT-DELETE",
    FormatSuper => "FORMAT-SUPER",
    FormatSub => "FORMAT-SUB",
    FormatQuote => "FORMAT-QUOTE",
    FormatMark => "FORMAT-MARK",
    FormatSpan => "FORMAT-SPAN",
    LiteralCode => "LITERAL-CODE",
    LiteralInput => "LITERAL-INPUT",
    LiteralOutput => "LITERAL-OUTPUT",
    LiteralComment => "LITERAL-COMMENT",
    LiteralHtml => "LITERAL-HTML",
    LiteralMath => "LITERAL-MATH",

    RefStateInvalid => "REF-STATE-INVALID",
    RefStateZettel => "REF-STATE-ZETTEL",
    RefStateSelf => "REF-STATE-SELF",
    RefStateFound => "REF-STATE-FOUND",
    RefStateBroken => "REF-STATE-BROKEN",
    RefStateHosted => "REF-STATE-HOSTED",
    RefStateBased => "REF-STATE-BASED",
    RefStateQuery => "REF-STATE-QUERY",
    RefStateExternal => "REF-STATE-EXTERNAL",
}

impl Sym {
    pub fn to_sx(self) -> Sx {
        Sx::symbol(self.name())
    }
}

/// Pairs of a typed kind and its tag; both directions are looked up here
type KindTable<K> = [(K, Sym)];

const LIST_KINDS: &KindTable<NestedListKind> = &[
    (NestedListKind::Ordered, Sym::Ordered),
    (NestedListKind::Unordered, Sym::Unordered),
    (NestedListKind::Quote, Sym::Quotation),
];

const REGION_KINDS: &KindTable<RegionKind> = &[
    (RegionKind::Block, Sym::RegionBlock),
    (RegionKind::Quote, Sym::RegionQuote),
    (RegionKind::Verse, Sym::RegionVerse),
];

const VERBATIM_KINDS: &KindTable<VerbatimKind> = &[
    (VerbatimKind::Code, Sym::VerbatimCode),
    (VerbatimKind::Comment, Sym::VerbatimComment),
    (VerbatimKind::Eval, Sym::VerbatimEval),
    (VerbatimKind::Html, Sym::VerbatimHtml),
    (VerbatimKind::Math, Sym::VerbatimMath),
];

const CELL_ALIGNMENTS: &KindTable<Alignment> = &[
    (Alignment::Default, Sym::Cell),
    (Alignment::Left, Sym::CellLeft),
    (Alignment::Center, Sym::CellCenter),
    (Alignment::Right, Sym::CellRight),
];

const FORMAT_KINDS: &KindTable<FormatKind> = &[
    (FormatKind::Emph, Sym::FormatEmph),
    (FormatKind::Strong, Sym::FormatStrong),
    (FormatKind::Insert, Sym::FormatInsert),
    (FormatKind::Delete, Sym::FormatDelete),
    (FormatKind::Super, Sym::FormatSuper),
    (FormatKind::Sub, Sym::FormatSub),
    (FormatKind::Quote, Sym::FormatQuote),
    (FormatKind::Mark, Sym::FormatMark),
    (FormatKind::Span, Sym::FormatSpan),
];

const LITERAL_KINDS: &KindTable<LiteralKind> = &[
    (LiteralKind::Code, Sym::LiteralCode),
    (LiteralKind::Input, Sym::LiteralInput),
    (LiteralKind::Output, Sym::LiteralOutput),
    (LiteralKind::Comment, Sym::LiteralComment),
    (LiteralKind::Html, Sym::LiteralHtml),
    (LiteralKind::Math, Sym::LiteralMath),
];

const REF_STATES: &KindTable<RefState> = &[
    (RefState::Invalid, Sym::RefStateInvalid),
    (RefState::Zettel, Sym::RefStateZettel),
    (RefState::SelfRef, Sym::RefStateSelf),
    (RefState::Found, Sym::RefStateFound),
    (RefState::Broken, Sym::RefStateBroken),
    (RefState::Hosted, Sym::RefStateHosted),
    (RefState::Based, Sym::RefStateBased),
    (RefState::Query, Sym::RefStateQuery),
    (RefState::External, Sym::RefStateExternal),
];

fn sym_of<K: Copy + PartialEq>(table: &KindTable<K>, kind: K) -> Sym {
    table
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, sym)| *sym)
        // Every table lists all variants of its kind
        .unwrap_or_else(|| unreachable!("kind table is exhaustive"))
}

fn kind_of<K: Copy>(table: &KindTable<K>, sym: Sym) -> Option<K> {
    table.iter().find(|(_, s)| *s == sym).map(|(k, _)| *k)
}

/// Read the textual canonical form of a block slice
pub fn parse_sz(input: &str) -> Result<BlockSlice, TransformError> {
    let sx = Sx::read(input)?;
    blocks_from_sx(&sx)
}

/// Print a block slice in the textual canonical form
pub fn print_sz(blocks: &BlockSlice) -> String {
    to_sx(blocks).print()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_symbol_names_unique_and_reversible() {
        let mut seen = HashSet::new();
        for sym in Sym::ALL {
            assert!(seen.insert(sym.name()), "duplicate name {}", sym.name());
            assert_eq!(Sym::from_name(sym.name()), Some(*sym));
        }
        assert_eq!(Sym::from_name("NO-SUCH-TAG"), None);
    }

    #[test]
    fn test_kind_tables_bijective() {
        for (kind, sym) in FORMAT_KINDS {
            assert_eq!(kind_of(FORMAT_KINDS, *sym), Some(*kind));
            assert_eq!(sym_of(FORMAT_KINDS, *kind), *sym);
        }
        for (state, sym) in REF_STATES {
            assert_eq!(kind_of(REF_STATES, *sym), Some(*state));
        }
        assert_eq!(kind_of(LIST_KINDS, Sym::Para), None);
    }
}
