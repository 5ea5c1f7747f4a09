// SPDX-License-Identifier: AGPL-3.0-or-later
//! Structural clean-up and identifiers of a parsed tree
//!
//! Cleaning removes empty paragraphs and text nodes and, unless allowed,
//! raw HTML. Adjacent text is merged, and headings and terms lose breaks at
//! their edges. It then gives every heading (and, in a second pass, every mark)
//! a slug and a fragment that is unique within the cleaned tree.

use std::collections::HashSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::ast::{
    merge_texts, BlockNode, BlockSlice, InlineNode, InlineSlice, LiteralKind, VerbatimKind,
};
use crate::encoder::text::plain_text;

/// Clean `blocks` in place
pub fn clean(blocks: &mut BlockSlice, allow_html: bool) {
    let mut cleaner = Cleaner {
        allow_html,
        ids: HashSet::new(),
        has_marks: false,
    };
    cleaner.blocks(blocks);
    if cleaner.has_marks {
        for_each_inlines(blocks, &mut |inlines| cleaner.marks(inlines));
    }
}

/// Lower-case alphanumeric runs joined by `-`, without diacritics
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut gap = false;
    for c in text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
    {
        if c.is_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(c);
        } else {
            gap = true;
        }
    }
    slug
}

fn slug_from(text: &str, fallback: &str) -> String {
    let slug = slugify(text);
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// Headings and terms are single lines
fn trim_breaks(inlines: &mut InlineSlice) {
    while inlines.last().is_some_and(InlineNode::is_break) {
        inlines.pop();
    }
    let leading = inlines.iter().take_while(|inline| inline.is_break()).count();
    inlines.drain(..leading);
}

struct Cleaner {
    allow_html: bool,
    ids: HashSet<String>,
    has_marks: bool,
}

impl Cleaner {
    /// `slug`, or `slug-N` with the first free N
    fn unique(&mut self, slug: &str) -> String {
        if self.ids.insert(slug.to_string()) {
            return slug.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{slug}-{n}");
            if self.ids.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    fn blocks(&mut self, blocks: &mut BlockSlice) {
        blocks.retain_mut(|block| self.block(block));
    }

    /// Returns false when the block is to be removed
    fn block(&mut self, block: &mut BlockNode) -> bool {
        match block {
            BlockNode::Para { inlines } => {
                self.inlines(inlines);
                !inlines.is_empty()
            }
            BlockNode::Heading {
                slug,
                fragment,
                inlines,
                ..
            } => {
                self.inlines(inlines);
                trim_breaks(inlines);
                if slug.is_empty() {
                    *slug = slug_from(&plain_text(inlines), "heading");
                }
                *fragment = self.unique(slug);
                true
            }
            BlockNode::NestedList { items, .. } => {
                for item in items {
                    self.blocks(item);
                }
                true
            }
            BlockNode::DescriptionList { entries, .. } => {
                for entry in entries {
                    self.inlines(&mut entry.term);
                    trim_breaks(&mut entry.term);
                    for description in &mut entry.descriptions {
                        self.blocks(description);
                    }
                }
                true
            }
            BlockNode::Table { header, rows, .. } => {
                for cell in header.iter_mut().chain(rows.iter_mut().flatten()) {
                    self.inlines(&mut cell.inlines);
                }
                true
            }
            BlockNode::Region {
                blocks, inlines, ..
            } => {
                self.blocks(blocks);
                self.inlines(inlines);
                true
            }
            BlockNode::Verbatim {
                kind: VerbatimKind::Html,
                ..
            } => self.allow_html,
            BlockNode::Transclude { inlines, .. } => {
                self.inlines(inlines);
                true
            }
            BlockNode::Blob { description, .. } => {
                self.inlines(description);
                true
            }
            BlockNode::Hrule { .. } | BlockNode::Verbatim { .. } | BlockNode::Unknown { .. } => true,
        }
    }

    fn inlines(&mut self, inlines: &mut InlineSlice) {
        inlines.retain_mut(|inline| self.inline(inline));
        *inlines = merge_texts(std::mem::take(inlines));
    }

    fn inline(&mut self, inline: &mut InlineNode) -> bool {
        match inline {
            InlineNode::Text { text } => !text.is_empty(),
            InlineNode::Mark { inlines, .. } => {
                self.has_marks = true;
                self.inlines(inlines);
                true
            }
            InlineNode::Link { inlines, .. }
            | InlineNode::Embed { inlines, .. }
            | InlineNode::EmbedBlob { inlines, .. }
            | InlineNode::Cite { inlines, .. }
            | InlineNode::Footnote { inlines, .. }
            | InlineNode::Format { inlines, .. } => {
                self.inlines(inlines);
                true
            }
            InlineNode::Literal {
                kind: LiteralKind::Html,
                ..
            } => self.allow_html,
            InlineNode::Soft
            | InlineNode::Hard
            | InlineNode::Literal { .. }
            | InlineNode::Unknown { .. } => true,
        }
    }

    fn marks(&mut self, inlines: &mut InlineSlice) {
        for inline in inlines {
            match inline {
                InlineNode::Mark {
                    mark,
                    slug,
                    fragment,
                    inlines,
                } => {
                    if slug.is_empty() {
                        let base = if mark.is_empty() {
                            plain_text(inlines)
                        } else {
                            mark.clone()
                        };
                        *slug = slug_from(&base, "mark");
                    }
                    *fragment = self.unique(slug);
                    self.marks(inlines);
                }
                InlineNode::Link { inlines, .. }
                | InlineNode::Embed { inlines, .. }
                | InlineNode::EmbedBlob { inlines, .. }
                | InlineNode::Cite { inlines, .. }
                | InlineNode::Footnote { inlines, .. }
                | InlineNode::Format { inlines, .. } => self.marks(inlines),
                _ => {}
            }
        }
    }
}

/// Call `f` on every inline slice held directly by a block, recursively
fn for_each_inlines(blocks: &mut BlockSlice, f: &mut dyn FnMut(&mut InlineSlice)) {
    for block in blocks {
        match block {
            BlockNode::Para { inlines }
            | BlockNode::Heading { inlines, .. }
            | BlockNode::Transclude { inlines, .. } => f(inlines),
            BlockNode::Blob { description, .. } => f(description),
            BlockNode::NestedList { items, .. } => {
                for item in items {
                    for_each_inlines(item, f);
                }
            }
            BlockNode::DescriptionList { entries, .. } => {
                for entry in entries {
                    f(&mut entry.term);
                    for description in &mut entry.descriptions {
                        for_each_inlines(description, f);
                    }
                }
            }
            BlockNode::Table { header, rows, .. } => {
                for cell in header.iter_mut().chain(rows.iter_mut().flatten()) {
                    f(&mut cell.inlines);
                }
            }
            BlockNode::Region {
                blocks, inlines, ..
            } => {
                for_each_inlines(blocks, f);
                f(inlines);
            }
            BlockNode::Hrule { .. } | BlockNode::Verbatim { .. } | BlockNode::Unknown { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Description;
    use crate::attrs::Attributes;
    use crate::parser::zettelmark::parse_document;
    use pretty_assertions::assert_eq;

    fn fragments(blocks: &BlockSlice) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|block| match block {
                BlockNode::Heading { fragment, .. } => Some(fragment.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Héllo, Wörld!"), "hello-world");
        assert_eq!(slugify("  A -- b  "), "a-b");
        assert_eq!(slugify("ﬁle №1"), "file-no1");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_duplicate_headings() {
        let mut blocks = parse_document("= Heading\n= Heading\n= Heading-1\n= !!");
        clean(&mut blocks, false);
        assert_eq!(fragments(&blocks), vec!["heading", "heading-1", "heading-1-1", "heading-2"]);
        match &blocks[1] {
            BlockNode::Heading { slug, .. } => assert_eq!(slug, "heading"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_cleaning_is_deterministic() {
        let mut first = parse_document("= A\n\n[!a|x] [!a] = A");
        let mut second = first.clone();
        clean(&mut first, false);
        clean(&mut second, false);
        assert_eq!(first, second);
        let mut again = first.clone();
        clean(&mut again, false);
        assert_eq!(first, again);
    }

    #[test]
    fn test_marks_after_headings() {
        let mut blocks = parse_document("[!intro|Intro]\n\n= Intro\n\n[!|Other text]");
        clean(&mut blocks, false);
        assert_eq!(fragments(&blocks), vec!["intro"]);
        let marks: Vec<(String, String)> = blocks
            .iter()
            .filter_map(|block| match block.as_para()?.first()? {
                InlineNode::Mark { slug, fragment, .. } => Some((slug.clone(), fragment.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            marks,
            vec![
                ("intro".to_string(), "intro-1".to_string()),
                ("other-text".to_string(), "other-text".to_string())
            ]
        );
    }

    #[test]
    fn test_text_merged_around_removed_html() {
        let mut blocks = vec![BlockNode::para(vec![
            InlineNode::text(":*"),
            InlineNode::Literal {
                kind: LiteralKind::Html,
                attrs: Attributes::new(),
                content: String::new(),
            },
            InlineNode::text("]"),
        ])];
        clean(&mut blocks, false);
        assert_eq!(blocks, vec![BlockNode::para(vec![InlineNode::text(":*]")])]);

        let mut parsed = parse_document("a @@<b>@@ b");
        clean(&mut parsed, false);
        assert_eq!(parsed, vec![BlockNode::para(vec![InlineNode::text("a  b")])]);
    }

    #[test]
    fn test_edge_breaks_trimmed() {
        let mut blocks = vec![
            BlockNode::Heading {
                level: 1,
                attrs: Attributes::new(),
                slug: String::new(),
                fragment: String::new(),
                inlines: vec![InlineNode::Soft, InlineNode::text("Title"), InlineNode::Hard],
            },
            BlockNode::DescriptionList {
                attrs: Attributes::new(),
                entries: vec![Description {
                    term: vec![InlineNode::Soft, InlineNode::text("t"), InlineNode::Soft],
                    descriptions: Vec::new(),
                }],
            },
        ];
        clean(&mut blocks, false);
        match &blocks[0] {
            BlockNode::Heading { inlines, slug, .. } => {
                assert_eq!(inlines, &vec![InlineNode::text("Title")]);
                assert_eq!(slug, "title");
            }
            other => panic!("unexpected {other:?}"),
        }
        match &blocks[1] {
            BlockNode::DescriptionList { entries, .. } => {
                assert_eq!(entries[0].term, vec![InlineNode::text("t")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_structural_cleaning() {
        let mut blocks = vec![
            BlockNode::para(vec![InlineNode::text("")]),
            BlockNode::Verbatim {
                kind: VerbatimKind::Html,
                attrs: Attributes::new(),
                content: "<b>".into(),
            },
            BlockNode::para(vec![
                InlineNode::text("a"),
                InlineNode::Literal {
                    kind: LiteralKind::Html,
                    attrs: Attributes::new(),
                    content: "<i>".into(),
                },
            ]),
        ];
        let mut allowed = blocks.clone();
        clean(&mut blocks, false);
        assert_eq!(blocks, vec![BlockNode::para(vec![InlineNode::text("a")])]);
        clean(&mut allowed, true);
        assert_eq!(allowed.len(), 2);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::parser::zettelmark::parse_document;
    use proptest::prelude::*;

    fn title_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("a"),
            Just("a-1"),
            Just("a 1"),
            Just("A-1-1"),
            Just("heading"),
            Just("heading-1"),
            Just("mark"),
            Just("!!"),
        ]
    }

    fn line_strategy() -> impl Strategy<Value = String> {
        title_strategy().prop_flat_map(|title| {
            prop_oneof![
                Just(format!("= {title}")),
                Just(format!("=== {title}")),
                Just(format!("[!{title}]")),
                Just(format!("[!|{title}] and [!{title}|x]")),
                Just(format!("* [!|{title}]")),
            ]
        })
    }

    fn all_fragments(blocks: &mut BlockSlice) -> Vec<String> {
        fn collect(inlines: &InlineSlice, out: &mut Vec<String>) {
            for inline in inlines {
                match inline {
                    InlineNode::Mark {
                        fragment, inlines, ..
                    } => {
                        out.push(fragment.clone());
                        collect(inlines, out);
                    }
                    InlineNode::Link { inlines, .. }
                    | InlineNode::Embed { inlines, .. }
                    | InlineNode::EmbedBlob { inlines, .. }
                    | InlineNode::Cite { inlines, .. }
                    | InlineNode::Footnote { inlines, .. }
                    | InlineNode::Format { inlines, .. } => collect(inlines, out),
                    _ => {}
                }
            }
        }
        let mut result: Vec<String> = blocks
            .iter()
            .filter_map(|block| match block {
                BlockNode::Heading { fragment, .. } => Some(fragment.clone()),
                _ => None,
            })
            .collect();
        for_each_inlines(blocks, &mut |inlines| collect(inlines, &mut result));
        result
    }

    proptest! {
        #[test]
        fn prop_fragments_are_unique(lines in prop::collection::vec(line_strategy(), 1..12)) {
            let mut blocks = parse_document(&lines.join("\n\n"));
            clean(&mut blocks, false);
            let fragments = all_fragments(&mut blocks);
            let distinct: HashSet<&String> = fragments.iter().collect();
            prop_assert_eq!(distinct.len(), fragments.len(), "{:?}", fragments);
        }
    }
}
