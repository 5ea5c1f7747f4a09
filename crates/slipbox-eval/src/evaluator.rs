// SPDX-License-Identifier: AGPL-3.0-or-later
//! Depth-first evaluation of a parsed zettel
//!
//! Every resolution of an embed or transclusion counts against a budget
//! shared by the whole run. Evaluated zettel are memoised together with the
//! budget they consumed, so that reusing them costs the same as evaluating
//! them again. A zettel that is still being evaluated when it is referenced
//! again forms a cycle.

use std::collections::HashMap;

use slipbox_core::ast::{
    BlockNode, BlockSlice, FormatKind, InlineNode, InlineSlice, LiteralKind, RegionKind,
    VerbatimKind,
};
use slipbox_core::attrs::DEFAULT_KEY;
use slipbox_core::cleaner;
use slipbox_core::parser::{self, blob, draw};
use slipbox_core::{Attributes, Config, Meta, RefState, Reference, ZettelId, ZettelNode};

use crate::fragment;
use crate::query::{render_query_results, Query};
use crate::{Port, PortError};

/// Class of the region that holds rendered query results
pub const QUERY_CLASS: &str = "zs-query";

/// Default attribute of an eval block rendered as a drawing
const DRAW_LANGUAGE: &str = "draw";

/// Evaluate a parsed zettel in place, then assign identifiers again
///
/// Returns the number of transclusions counted against the budget.
pub fn evaluate_zettel<P: Port + ?Sized>(port: &P, config: &Config, zn: &mut ZettelNode) -> usize {
    tracing::debug!(zid = %zn.zid, "evaluating zettel");
    let mut evaluator = Evaluator::new(port, config, zn.inherited.clone());
    evaluator.visits.insert(zn.zid, Visit::InProgress);
    evaluator.blocks(&mut zn.blocks);
    cleaner::clean(&mut zn.blocks, config.parse.allow_html);
    evaluator.transclusions
}

/// Evaluate blocks that belong to zettel `zid`
pub fn evaluate_blocks<P: Port + ?Sized>(
    port: &P,
    config: &Config,
    zid: ZettelId,
    blocks: &mut BlockSlice,
) -> usize {
    let mut evaluator = Evaluator::new(port, config, Meta::new(zid));
    evaluator.visits.insert(zid, Visit::InProgress);
    evaluator.blocks(blocks);
    cleaner::clean(blocks, config.parse.allow_html);
    evaluator.transclusions
}

/// Evaluate inlines that belong to zettel `zid`, e.g. a title
pub fn evaluate_inlines<P: Port + ?Sized>(
    port: &P,
    config: &Config,
    zid: ZettelId,
    inlines: &mut InlineSlice,
) -> usize {
    let mut evaluator = Evaluator::new(port, config, Meta::new(zid));
    evaluator.visits.insert(zid, Visit::InProgress);
    evaluator.inlines(inlines);
    evaluator.transclusions
}

enum Visit {
    InProgress,
    Done { blocks: BlockSlice, cost: usize },
}

#[derive(Clone)]
struct Image {
    meta: Meta,
    syntax: String,
    data: Vec<u8>,
}

/// What a zettel reference resolves to
enum Target {
    /// Not visible to the caller
    Omit,
    Error(String),
    Image(Image),
    Blocks(BlockSlice),
}

#[derive(Clone, Copy)]
enum Existence {
    Found,
    Hidden,
    Missing,
}

struct Evaluator<'a, P: ?Sized> {
    port: &'a P,
    config: &'a Config,
    /// Inherited metadata of the zettel being evaluated
    meta: Meta,
    transclusions: usize,
    visits: HashMap<ZettelId, Visit>,
    images: HashMap<ZettelId, Image>,
    links: HashMap<ZettelId, Existence>,
}

fn error_para(message: impl Into<String>) -> BlockSlice {
    vec![BlockNode::para(vec![InlineNode::error(message)])]
}

fn nothing_message(reference: &Reference) -> String {
    format!("Nothing to transclude: {}", reference.to_text())
}

fn self_message(reference: &Reference) -> String {
    format!("Self transclusion reference: {}", reference.to_text())
}

/// Image syntax named by the extension of a local reference
fn image_syntax(reference: &Reference) -> Option<String> {
    reference
        .extension()
        .filter(|ext| parser::is_image_format(ext))
}

impl<'a, P: Port + ?Sized> Evaluator<'a, P> {
    fn new(port: &'a P, config: &'a Config, meta: Meta) -> Self {
        Self {
            port,
            config,
            meta,
            transclusions: 0,
            visits: HashMap::new(),
            images: HashMap::new(),
            links: HashMap::new(),
        }
    }

    fn over_budget(&self) -> Option<String> {
        let max = self.config.eval.max_transclusions;
        (self.transclusions > max).then(|| {
            format!(
                "Too many transclusions (must be at most {max}, but are {})",
                self.transclusions
            )
        })
    }

    /// Count one resolution; an error message once the budget is exhausted
    fn count(&mut self) -> Option<String> {
        self.transclusions += 1;
        self.over_budget()
    }

    fn blocks(&mut self, blocks: &mut BlockSlice) {
        let mut result = Vec::with_capacity(blocks.len());
        for block in std::mem::take(blocks) {
            match block {
                BlockNode::Transclude {
                    attrs,
                    reference,
                    inlines,
                } => result.extend(self.transclude(attrs, reference, inlines)),
                BlockNode::Verbatim {
                    kind: VerbatimKind::Eval,
                    attrs,
                    content,
                } if attrs.default_value() == Some(DRAW_LANGUAGE) => {
                    result.push(self.draw(attrs, &content));
                }
                mut other => {
                    self.block_children(&mut other);
                    result.push(other);
                }
            }
        }
        *blocks = result;
    }

    fn block_children(&mut self, block: &mut BlockNode) {
        match block {
            BlockNode::Para { inlines } | BlockNode::Heading { inlines, .. } => {
                self.inlines(inlines);
            }
            BlockNode::NestedList { items, .. } => {
                for item in items {
                    self.blocks(item);
                }
            }
            BlockNode::DescriptionList { entries, .. } => {
                for entry in entries {
                    self.inlines(&mut entry.term);
                    for description in &mut entry.descriptions {
                        self.blocks(description);
                    }
                }
            }
            BlockNode::Table { header, rows, .. } => {
                for cell in header.iter_mut().chain(rows.iter_mut().flatten()) {
                    self.inlines(&mut cell.inlines);
                }
            }
            BlockNode::Region {
                blocks, inlines, ..
            } => {
                self.blocks(blocks);
                self.inlines(inlines);
            }
            BlockNode::Hrule { .. }
            | BlockNode::Verbatim { .. }
            | BlockNode::Transclude { .. }
            | BlockNode::Blob { .. }
            | BlockNode::Unknown { .. } => {}
        }
    }

    fn draw(&self, mut attrs: Attributes, content: &str) -> BlockNode {
        let options = draw::DrawOptions::from_attrs(&attrs, &self.meta);
        attrs.remove(DEFAULT_KEY);
        BlockNode::para(vec![draw::draw_inline(content, attrs, &options)])
    }

    fn transclude(
        &mut self,
        attrs: Attributes,
        reference: Reference,
        inlines: InlineSlice,
    ) -> BlockSlice {
        match reference.state {
            RefState::Found | RefState::External => vec![BlockNode::Transclude {
                attrs,
                reference,
                inlines,
            }],
            RefState::Hosted | RefState::Based => match image_syntax(&reference) {
                Some(syntax) => vec![BlockNode::para(vec![InlineNode::Embed {
                    attrs,
                    reference,
                    syntax,
                    inlines,
                }])],
                None => vec![BlockNode::Transclude {
                    attrs,
                    reference,
                    inlines,
                }],
            },
            RefState::Invalid | RefState::Broken => {
                let message = self
                    .count()
                    .unwrap_or_else(|| format!("Unable to transclude {}", reference.to_text()));
                error_para(message)
            }
            RefState::SelfRef => error_para(self.count().unwrap_or_else(|| self_message(&reference))),
            RefState::Query => {
                if let Some(message) = self.count() {
                    return error_para(message);
                }
                self.query(&reference)
            }
            RefState::Zettel => {
                if let Some(message) = self.count() {
                    return error_para(message);
                }
                match self.resolve(&reference) {
                    Target::Omit => Vec::new(),
                    Target::Error(message) => error_para(message),
                    Target::Image(image) => {
                        vec![blob::blob_node(&image.meta, &image.syntax, image.data)]
                    }
                    Target::Blocks(blocks) => match reference.fragment() {
                        None => blocks,
                        Some(fragment) => fragment::extract(&blocks, fragment).unwrap_or_else(|| {
                            vec![BlockNode::Verbatim {
                                kind: VerbatimKind::Comment,
                                attrs: Attributes::new(),
                                content: nothing_message(&reference),
                            }]
                        }),
                    },
                }
            }
        }
    }

    fn query(&mut self, reference: &Reference) -> BlockSlice {
        let query = Query::parse(&reference.value);
        match self.port.query_meta(&query) {
            Ok(metas) => {
                tracing::debug!(query = %query, results = metas.len(), "query evaluated");
                render_query_results(&query, &metas)
                    .map(|block| {
                        vec![BlockNode::Region {
                            kind: RegionKind::Block,
                            attrs: Attributes::new().with("class", QUERY_CLASS),
                            blocks: vec![block],
                            inlines: Vec::new(),
                        }]
                    })
                    .unwrap_or_default()
            }
            Err(PortError::NotAllowed) => Vec::new(),
            Err(err) => {
                tracing::warn!(query = %query, error = %err, "query failed");
                error_para(format!("Unable to search for '{query}': {err}"))
            }
        }
    }

    /// Resolve a counted zettel reference
    fn resolve(&mut self, reference: &Reference) -> Target {
        let Some(zid) = reference.zettel_id() else {
            return Target::Error(format!("Unable to transclude {}", reference.to_text()));
        };
        if zid == self.meta.zid {
            return Target::Error(self_message(reference));
        }
        if let Some(image) = self.images.get(&zid) {
            return Target::Image(image.clone());
        }
        match self.visits.get(&zid) {
            Some(Visit::InProgress) => {
                return Target::Error(format!(
                    "Recursive transclusion of zettel {}",
                    reference.to_text()
                ));
            }
            Some(Visit::Done { blocks, cost }) => {
                let blocks = blocks.clone();
                self.transclusions += *cost;
                return match self.over_budget() {
                    Some(message) => Target::Error(message),
                    None => Target::Blocks(blocks),
                };
            }
            None => {}
        }

        let zettel = match self.port.get_zettel(zid) {
            Ok(zettel) => zettel,
            Err(PortError::NotAllowed) => return Target::Omit,
            Err(err) => {
                tracing::warn!(zid = %zid, error = %err, "unable to get zettel");
                return Target::Error(format!("Unable to get zettel {zid}: {err}"));
            }
        };
        let syntax = zettel
            .meta
            .syntax()
            .unwrap_or(self.config.parse.default_syntax.as_str())
            .to_string();
        if parser::is_image_format(&syntax) {
            let image = Image {
                meta: zettel.meta,
                syntax,
                data: zettel.content,
            };
            self.images.insert(zid, image.clone());
            return Target::Image(image);
        }
        if !parser::is_ast_parser(&syntax) {
            return Target::Error(format!(
                "Unable to transclude zettel {zid} with syntax '{syntax}'"
            ));
        }

        tracing::debug!(zid = %zid, syntax = %syntax, "transcluding zettel");
        self.visits.insert(zid, Visit::InProgress);
        let before = self.transclusions;
        let zn = parser::parse_zettel(&zettel, &syntax, &self.config.parse);
        let outer = std::mem::replace(&mut self.meta, zn.inherited);
        let mut blocks = zn.blocks;
        self.blocks(&mut blocks);
        self.meta = outer;
        let cost = self.transclusions - before;
        self.visits.insert(
            zid,
            Visit::Done {
                blocks: blocks.clone(),
                cost,
            },
        );
        Target::Blocks(blocks)
    }

    fn inlines(&mut self, inlines: &mut InlineSlice) {
        let mut result = Vec::with_capacity(inlines.len());
        for inline in std::mem::take(inlines) {
            match inline {
                InlineNode::Link {
                    attrs,
                    reference,
                    mut inlines,
                } => {
                    self.inlines(&mut inlines);
                    result.push(self.link(attrs, reference, inlines));
                }
                InlineNode::Embed {
                    attrs,
                    reference,
                    syntax,
                    inlines,
                } => result.extend(self.embed(attrs, reference, syntax, inlines)),
                mut other => {
                    self.inline_children(&mut other);
                    result.push(other);
                }
            }
        }
        *inlines = result;
    }

    fn inline_children(&mut self, inline: &mut InlineNode) {
        match inline {
            InlineNode::Link { inlines, .. }
            | InlineNode::Embed { inlines, .. }
            | InlineNode::EmbedBlob { inlines, .. }
            | InlineNode::Cite { inlines, .. }
            | InlineNode::Mark { inlines, .. }
            | InlineNode::Footnote { inlines, .. }
            | InlineNode::Format { inlines, .. } => self.inlines(inlines),
            InlineNode::Text { .. }
            | InlineNode::Soft
            | InlineNode::Hard
            | InlineNode::Literal { .. }
            | InlineNode::Unknown { .. } => {}
        }
    }

    fn existence(&mut self, zid: ZettelId) -> Existence {
        if let Some(existence) = self.links.get(&zid) {
            return *existence;
        }
        let existence = if matches!(self.visits.get(&zid), Some(Visit::Done { .. }))
            || self.images.contains_key(&zid)
        {
            Existence::Found
        } else {
            match self.port.get_zettel(zid) {
                Ok(_) => Existence::Found,
                Err(PortError::NotAllowed) => Existence::Hidden,
                Err(err) => {
                    tracing::debug!(zid = %zid, error = %err, "link target not available");
                    Existence::Missing
                }
            }
        };
        self.links.insert(zid, existence);
        existence
    }

    fn link(&mut self, attrs: Attributes, reference: Reference, inlines: InlineSlice) -> InlineNode {
        match reference.state {
            RefState::Zettel => {
                let Some(zid) = reference.zettel_id() else {
                    return InlineNode::Link {
                        attrs,
                        reference,
                        inlines,
                    };
                };
                let state = match self.existence(zid) {
                    Existence::Found => RefState::Found,
                    Existence::Missing => RefState::Broken,
                    Existence::Hidden => {
                        return InlineNode::Format {
                            kind: FormatKind::Span,
                            attrs,
                            inlines,
                        };
                    }
                };
                InlineNode::Link {
                    attrs,
                    reference: Reference::new(state, reference.value),
                    inlines,
                }
            }
            RefState::Hosted | RefState::Based => match image_syntax(&reference) {
                Some(syntax) => InlineNode::Embed {
                    attrs,
                    reference,
                    syntax,
                    inlines,
                },
                None => InlineNode::Link {
                    attrs,
                    reference,
                    inlines,
                },
            },
            _ => InlineNode::Link {
                attrs,
                reference,
                inlines,
            },
        }
    }

    fn embed(
        &mut self,
        attrs: Attributes,
        reference: Reference,
        syntax: String,
        mut inlines: InlineSlice,
    ) -> InlineSlice {
        match reference.state {
            RefState::Invalid | RefState::Broken => {
                let message = self
                    .count()
                    .unwrap_or_else(|| format!("Unable to embed {}", reference.to_text()));
                vec![InlineNode::error(message)]
            }
            RefState::SelfRef => {
                vec![InlineNode::error(
                    self.count().unwrap_or_else(|| self_message(&reference)),
                )]
            }
            RefState::Zettel => {
                if let Some(message) = self.count() {
                    return vec![InlineNode::error(message)];
                }
                self.inlines(&mut inlines);
                match self.resolve(&reference) {
                    Target::Omit => Vec::new(),
                    Target::Error(message) => vec![InlineNode::error(message)],
                    Target::Image(image) => {
                        let inlines = if inlines.is_empty() {
                            blob::blob_description(&image.meta)
                        } else {
                            inlines
                        };
                        vec![InlineNode::EmbedBlob {
                            attrs,
                            syntax: image.syntax,
                            data: image.data,
                            inlines,
                        }]
                    }
                    Target::Blocks(blocks) => {
                        let blocks = match reference.fragment() {
                            None => Some(blocks),
                            Some(fragment) => fragment::extract(&blocks, fragment),
                        };
                        match blocks
                            .as_ref()
                            .and_then(|blocks| blocks.iter().find_map(BlockNode::as_para))
                        {
                            Some(para) => para.clone(),
                            None => vec![InlineNode::Literal {
                                kind: LiteralKind::Comment,
                                attrs: Attributes::new(),
                                content: nothing_message(&reference),
                            }],
                        }
                    }
                }
            }
            RefState::Hosted | RefState::Based if syntax.is_empty() => {
                self.inlines(&mut inlines);
                let syntax = image_syntax(&reference).unwrap_or_default();
                vec![InlineNode::Embed {
                    attrs,
                    reference,
                    syntax,
                    inlines,
                }]
            }
            _ => {
                self.inlines(&mut inlines);
                vec![InlineNode::Embed {
                    attrs,
                    reference,
                    syntax,
                    inlines,
                }]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use pretty_assertions::assert_eq;
    use slipbox_core::parser::zettelmark::parse_document;

    /// A port that knows no zettel and finds nothing
    struct EmptyPort;

    impl Port for EmptyPort {
        fn get_zettel(&self, zid: ZettelId) -> Result<slipbox_core::Zettel> {
            Err(PortError::NotFound(zid))
        }

        fn query_meta(&self, _: &Query) -> Result<Vec<Meta>> {
            Ok(Vec::new())
        }
    }

    fn zid() -> ZettelId {
        ZettelId::new(20240101000000).unwrap()
    }

    fn evaluate(input: &str) -> BlockSlice {
        let mut blocks = parse_document(input);
        evaluate_blocks(&EmptyPort, &Config::default(), zid(), &mut blocks);
        blocks
    }

    #[test]
    fn test_broken_link() {
        let blocks = evaluate("[[x|20230101000000]]");
        match &blocks[0].as_para().unwrap()[0] {
            InlineNode::Link { reference, .. } => assert_eq!(reference.state, RefState::Broken),
            other => panic!("not a link: {other:?}"),
        }
    }

    #[test]
    fn test_missing_transclusion_is_visible() {
        let blocks = evaluate("{{{20230101000000}}}");
        assert_eq!(
            blocks,
            error_para("Unable to get zettel 20230101000000: Zettel 20230101000000 not found")
        );
    }

    #[test]
    fn test_hosted_image_link_becomes_embed() {
        let blocks = evaluate("[[Logo|/img/logo.PNG]]");
        match &blocks[0].as_para().unwrap()[0] {
            InlineNode::Embed { syntax, .. } => assert_eq!(syntax, "png"),
            other => panic!("not an embed: {other:?}"),
        }
    }

    #[test]
    fn test_draw_block() {
        let blocks = evaluate("~~~draw\n+--+\n|  |\n+--+\n~~~");
        match &blocks[0].as_para().unwrap()[0] {
            InlineNode::EmbedBlob { syntax, data, .. } => {
                assert_eq!(syntax, "svg");
                assert!(String::from_utf8_lossy(data).starts_with("<svg"));
            }
            other => panic!("not a drawing: {other:?}"),
        }
    }

    #[test]
    fn test_empty_query_renders_nothing() {
        assert_eq!(evaluate("{{{query:tags:#none}}}"), Vec::new());
    }
}
