// SPDX-License-Identifier: AGPL-3.0-or-later
//! Query expressions and the rendering of their results
//!
//! A query is `search-expression | ACTION...`. The search part is handed to
//! the [`Port`](crate::Port); the actions shape the rendered result.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use slipbox_core::ast::{BlockNode, FormatKind, InlineNode, InlineSlice, NestedListKind};
use slipbox_core::meta::KeyType;
use slipbox_core::parser::parse_meta_inlines;
use slipbox_core::{Attributes, Meta, RefState, Reference};

/// Number of font size classes of a tag cloud
pub const FONT_SIZES: usize = 6;

/// A parsed query expression
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub search: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
}

impl Query {
    pub fn parse(expr: &str) -> Self {
        match expr.split_once('|') {
            Some((search, actions)) => Self {
                search: search.trim().to_string(),
                actions: actions.split_whitespace().map(str::to_string).collect(),
            },
            None => Self {
                search: expr.trim().to_string(),
                actions: Vec::new(),
            },
        }
    }

    /// Whether the outer layer should rebuild its index before searching
    pub fn wants_reindex(&self) -> bool {
        self.actions.iter().any(|a| a.eq_ignore_ascii_case("REINDEX"))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.search)?;
        if !self.actions.is_empty() {
            write!(f, " | {}", self.actions.join(" "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Actions<'a> {
    numbered: bool,
    min: Option<usize>,
    max: Option<usize>,
    key: Option<&'a str>,
}

fn count_action(action: &str, prefix: &str) -> Option<usize> {
    let head = action.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    action[prefix.len()..].parse().ok()
}

impl<'a> Actions<'a> {
    fn parse(actions: &'a [String]) -> Self {
        let mut result = Actions::default();
        for action in actions {
            if action == "N" {
                result.numbered = true;
            } else if let Some(n) = count_action(action, "MIN") {
                result.min = Some(n);
            } else if let Some(n) = count_action(action, "MAX") {
                result.max = Some(n);
            } else if action.eq_ignore_ascii_case("REINDEX") {
                // handled before the search runs
            } else {
                result.key = Some(action.as_str());
            }
        }
        result
    }

    fn keeps(&self, count: usize) -> bool {
        self.min.map_or(true, |min| count >= min) && self.max.map_or(true, |max| count <= max)
    }

    fn list_kind(&self) -> NestedListKind {
        if self.numbered {
            NestedListKind::Ordered
        } else {
            NestedListKind::Unordered
        }
    }
}

fn link(reference: Reference, inlines: InlineSlice) -> InlineNode {
    InlineNode::Link {
        attrs: Attributes::new(),
        reference,
        inlines,
    }
}

fn list(kind: NestedListKind, entries: Vec<InlineNode>) -> BlockNode {
    BlockNode::NestedList {
        kind,
        attrs: Attributes::new(),
        items: entries
            .into_iter()
            .map(|entry| vec![BlockNode::para(vec![entry])])
            .collect(),
    }
}

/// Render the metadata found for `query`; empty results render nothing
pub fn render_query_results(query: &Query, metas: &[Meta]) -> Option<BlockNode> {
    if metas.is_empty() {
        return None;
    }
    let actions = Actions::parse(&query.actions);
    match actions.key {
        None => Some(title_list(&actions, metas)),
        Some(key) => {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for meta in metas {
                for value in meta.values(key) {
                    *counts.entry(value).or_default() += 1;
                }
            }
            counts.retain(|_, count| actions.keeps(*count));
            if counts.is_empty() {
                return None;
            }
            match KeyType::of(key) {
                KeyType::TagSet => Some(tag_cloud(key, &counts)),
                _ => Some(value_list(&actions, key, &counts)),
            }
        }
    }
}

fn title_list(actions: &Actions<'_>, metas: &[Meta]) -> BlockNode {
    let entries = metas
        .iter()
        .map(|meta| {
            let zid = meta.zid.to_string();
            let inlines = match meta.title() {
                Some(title) => parse_meta_inlines(title),
                None => vec![InlineNode::text(zid.as_str())],
            };
            link(Reference::new(RefState::Found, zid), inlines)
        })
        .collect();
    list(actions.list_kind(), entries)
}

fn value_list(actions: &Actions<'_>, key: &str, counts: &BTreeMap<&str, usize>) -> BlockNode {
    let entries = counts
        .keys()
        .map(|value| {
            link(
                Reference::new(RefState::Query, format!("{key}:{value}")),
                vec![InlineNode::text(*value)],
            )
        })
        .collect();
    list(actions.list_kind(), entries)
}

fn tag_cloud(key: &str, counts: &BTreeMap<&str, usize>) -> BlockNode {
    let sizes = font_sizes(counts.values().copied());
    let mut inlines = Vec::with_capacity(counts.len() * 3);
    for (idx, (tag, count)) in counts.iter().enumerate() {
        if idx > 0 {
            inlines.push(InlineNode::text(" "));
        }
        let size = sizes.get(count).copied().unwrap_or_default();
        inlines.push(InlineNode::Link {
            attrs: Attributes::new().with("class", format!("zs-font-size-{size}")),
            reference: Reference::new(RefState::Query, format!("{key}:{tag}")),
            inlines: vec![InlineNode::text(*tag)],
        });
        inlines.push(InlineNode::Format {
            kind: FormatKind::Super,
            attrs: Attributes::new(),
            inlines: vec![InlineNode::text(count.to_string())],
        });
    }
    BlockNode::para(inlines)
}

fn rounded_div(total: usize, parts: usize) -> usize {
    (total + parts / 2) / parts
}

/// Font size class for every distinct tag count
///
/// Few distinct counts are centred on the middle classes. Otherwise the
/// classes are filled from a running budget so that each represents about
/// the same number of tags.
pub fn font_sizes(counts: impl IntoIterator<Item = usize>) -> BTreeMap<usize, usize> {
    let mut tags_per_count: BTreeMap<usize, usize> = BTreeMap::new();
    for count in counts {
        *tags_per_count.entry(count).or_default() += 1;
    }
    if tags_per_count.len() <= FONT_SIZES {
        let offset = (FONT_SIZES - tags_per_count.len()) / 2;
        return tags_per_count
            .keys()
            .enumerate()
            .map(|(idx, count)| (*count, offset + idx))
            .collect();
    }

    let mut remaining: usize = tags_per_count.values().sum();
    let mut size = 0;
    let mut budget = rounded_div(remaining, FONT_SIZES);
    let mut filled = 0;
    let mut result = BTreeMap::new();
    for (count, tags) in tags_per_count {
        result.insert(count, size);
        filled += tags;
        if filled >= budget && size + 1 < FONT_SIZES {
            remaining -= filled;
            filled = 0;
            size += 1;
            budget = rounded_div(remaining, FONT_SIZES - size);
        }
    }
    result
}
