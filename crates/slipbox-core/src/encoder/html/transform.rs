// SPDX-License-Identifier: AGPL-3.0-or-later
//! Transformation of the AST into HTML as symbolic expressions ("sHTML")
//!
//! Elements are lists `(tag (@ (key "value")...) child...)`, text is a
//! string, raw HTML is `(@H "...")` and comments are `(@@ "...")`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::quotes::quotes;
use crate::ast::{
    Alignment, BlockNode, BlockSlice, FormatKind, InlineNode, InlineSlice, LiteralKind,
    NestedListKind, RegionKind, TableCell, VerbatimKind,
};
use crate::attrs::{Attributes, DEFAULT_KEY};
use crate::encoder::text::{plain_text, unknown_text};
use crate::parser::zettelmark::inline::NBSP;
use crate::reference::{RefState, Reference};
use crate::sx::Sx;

pub const ATTRS_SYMBOL: &str = "@";
pub const RAW_SYMBOL: &str = "@H";
pub const COMMENT_SYMBOL: &str = "@@";

pub fn element(tag: &str, attrs: &Attributes, children: Vec<Sx>) -> Sx {
    let mut list = Vec::with_capacity(children.len() + 2);
    list.push(Sx::symbol(tag));
    if !attrs.is_empty() {
        let mut pairs = vec![Sx::symbol(ATTRS_SYMBOL)];
        pairs.extend(
            attrs
                .iter()
                .map(|(k, v)| Sx::List(vec![Sx::symbol(k), Sx::string(v)])),
        );
        list.push(Sx::List(pairs));
    }
    list.extend(children);
    Sx::List(list)
}

fn plain(tag: &str, children: Vec<Sx>) -> Sx {
    element(tag, &Attributes::new(), children)
}

pub fn raw(html: &str) -> Sx {
    Sx::List(vec![Sx::symbol(RAW_SYMBOL), Sx::string(html)])
}

pub fn comment(text: &str) -> Sx {
    Sx::List(vec![Sx::symbol(COMMENT_SYMBOL), Sx::string(text)])
}

fn unknown(node: &Sx) -> Sx {
    element(
        "span",
        &Attributes::new().with("class", "zs-unknown"),
        vec![Sx::string(unknown_text(node))],
    )
}

fn is_attr_name(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
        && key.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Attributes that are meaningful in HTML
fn html_attrs(attrs: &Attributes) -> Attributes {
    attrs
        .iter()
        .filter(|(k, _)| *k != DEFAULT_KEY && is_attr_name(k))
        .collect()
}

fn mime_type(syntax: &str) -> String {
    match syntax {
        "svg" => "image/svg+xml".to_string(),
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        other => format!("image/{other}"),
    }
}

pub fn data_uri(syntax: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type(syntax), BASE64.encode(data))
}

fn align_style(align: Alignment) -> Option<&'static str> {
    match align {
        Alignment::Default => None,
        Alignment::Left => Some("text-align:left"),
        Alignment::Center => Some("text-align:center"),
        Alignment::Right => Some("text-align:right"),
    }
}

/// Transformation state of one encoding run
pub struct Transformer {
    langs: Vec<String>,
    quote_depth: usize,
    in_verse: bool,
    endnotes: Vec<Vec<Sx>>,
}

impl Transformer {
    pub fn new(lang: &str) -> Self {
        Self {
            langs: vec![lang.to_string()],
            quote_depth: 0,
            in_verse: false,
            endnotes: Vec::new(),
        }
    }

    fn lang(&self) -> &str {
        self.langs.last().map(String::as_str).unwrap_or_default()
    }

    /// Run `f` with the language of `attrs`, if any
    fn with_lang<T>(&mut self, attrs: &Attributes, f: impl FnOnce(&mut Self) -> T) -> T {
        match attrs.get("lang") {
            Some(lang) => {
                self.langs.push(lang.to_string());
                let result = f(self);
                self.langs.pop();
                result
            }
            None => f(self),
        }
    }

    pub fn blocks(&mut self, blocks: &BlockSlice) -> Vec<Sx> {
        blocks.iter().filter_map(|b| self.block(b)).collect()
    }

    /// The collected endnotes as an ordered list
    pub fn endnotes(&mut self) -> Option<Sx> {
        if self.endnotes.is_empty() {
            return None;
        }
        let items = std::mem::take(&mut self.endnotes)
            .into_iter()
            .enumerate()
            .map(|(idx, mut children)| {
                let n = idx + 1;
                children.push(Sx::string(" "));
                children.push(element(
                    "a",
                    &Attributes::new()
                        .with("class", "zs-endnote-backref")
                        .with("href", format!("#fnref:{n}"))
                        .with("role", "doc-backlink"),
                    vec![Sx::string("\u{21a9}\u{fe0e}")],
                ));
                element(
                    "li",
                    &Attributes::new()
                        .with("id", format!("fn:{n}"))
                        .with("value", n.to_string()),
                    children,
                )
            })
            .collect();
        Some(element(
            "ol",
            &Attributes::new().with("class", "endnotes"),
            items,
        ))
    }

    fn item(&mut self, blocks: &BlockSlice) -> Vec<Sx> {
        match blocks.as_slice() {
            [BlockNode::Para { inlines }] => self.inlines(inlines),
            _ => self.blocks(blocks),
        }
    }

    fn block(&mut self, block: &BlockNode) -> Option<Sx> {
        Some(match block {
            BlockNode::Para { inlines } => plain("p", self.inlines(inlines)),
            BlockNode::Heading {
                level,
                attrs,
                fragment,
                inlines,
                ..
            } => {
                let mut attrs = html_attrs(attrs);
                if !fragment.is_empty() {
                    attrs.set("id", fragment.as_str());
                }
                let tag = format!("h{}", (level + 1).min(6));
                element(&tag, &attrs, self.inlines(inlines))
            }
            BlockNode::Hrule { attrs } => element("hr", &html_attrs(attrs), Vec::new()),
            BlockNode::NestedList { kind, attrs, items } => {
                let attrs = html_attrs(attrs);
                match kind {
                    NestedListKind::Quote => {
                        let children = items.iter().flat_map(|item| self.blocks(item)).collect();
                        element("blockquote", &attrs, children)
                    }
                    _ => {
                        let tag = if *kind == NestedListKind::Ordered {
                            "ol"
                        } else {
                            "ul"
                        };
                        let children = items
                            .iter()
                            .map(|item| plain("li", self.item(item)))
                            .collect();
                        element(tag, &attrs, children)
                    }
                }
            }
            BlockNode::DescriptionList { attrs, entries } => {
                let mut children = Vec::new();
                for entry in entries {
                    children.push(plain("dt", self.inlines(&entry.term)));
                    for description in &entry.descriptions {
                        children.push(plain("dd", self.item(description)));
                    }
                }
                element("dl", &html_attrs(attrs), children)
            }
            BlockNode::Table {
                attrs,
                header,
                rows,
            } => {
                let mut children = Vec::new();
                if !header.is_empty() {
                    let row = self.row("th", header);
                    children.push(plain("thead", vec![row]));
                }
                if !rows.is_empty() {
                    let body = rows.iter().map(|row| self.row("td", row)).collect();
                    children.push(plain("tbody", body));
                }
                element("table", &html_attrs(attrs), children)
            }
            BlockNode::Region {
                kind,
                attrs,
                blocks,
                inlines,
            } => self.with_lang(attrs, |this| {
                let verse = this.in_verse;
                this.in_verse = verse || *kind == RegionKind::Verse;
                let mut children = this.blocks(blocks);
                if !inlines.is_empty() {
                    children.push(plain("cite", this.inlines(inlines)));
                }
                this.in_verse = verse;
                let tag = if *kind == RegionKind::Quote {
                    "blockquote"
                } else {
                    "div"
                };
                element(tag, &html_attrs(attrs), children)
            }),
            BlockNode::Verbatim {
                kind,
                attrs,
                content,
            } => match kind {
                VerbatimKind::Comment => comment(content),
                VerbatimKind::Html => raw(content),
                VerbatimKind::Code | VerbatimKind::Eval | VerbatimKind::Math => {
                    let mut code_attrs = html_attrs(attrs);
                    match kind {
                        VerbatimKind::Math => code_attrs.add_class("zs-math"),
                        _ => {
                            if let Some(lang) = attrs.default_value() {
                                code_attrs.add_class(&format!("language-{lang}"));
                            }
                        }
                    }
                    plain(
                        "pre",
                        vec![element("code", &code_attrs, vec![Sx::string(content.as_str())])],
                    )
                }
            },
            BlockNode::Transclude {
                attrs, reference, ..
            } => plain(
                "p",
                vec![self.link(
                    &html_attrs(attrs),
                    reference,
                    vec![Sx::string(reference.to_text())],
                )],
            ),
            BlockNode::Blob {
                description,
                syntax,
                data,
            } => plain(
                "p",
                vec![element(
                    "img",
                    &Attributes::new()
                        .with("alt", plain_text(description))
                        .with("src", data_uri(syntax, data)),
                    Vec::new(),
                )],
            ),
            BlockNode::Unknown { node } => {
                tracing::warn!(node = %node, "unknown node shown as text");
                plain("p", vec![unknown(node)])
            }
        })
    }

    fn row(&mut self, tag: &str, cells: &[TableCell]) -> Sx {
        let children = cells
            .iter()
            .map(|cell| {
                let mut attrs = Attributes::new();
                if let Some(style) = align_style(cell.align) {
                    attrs.set("style", style);
                }
                element(tag, &attrs, self.inlines(&cell.inlines))
            })
            .collect();
        plain("tr", children)
    }

    pub fn inlines(&mut self, inlines: &InlineSlice) -> Vec<Sx> {
        let mut children = Vec::with_capacity(inlines.len());
        for inline in inlines {
            self.inline(inline, &mut children);
        }
        children
    }

    fn link(&mut self, attrs: &Attributes, reference: &Reference, children: Vec<Sx>) -> Sx {
        let mut attrs = attrs.clone();
        match reference.state {
            RefState::Invalid => {
                attrs.add_class("broken");
                return element("span", &attrs, children);
            }
            RefState::Broken => {
                attrs.add_class("broken");
                attrs.set("href", reference.to_text());
            }
            RefState::External => {
                attrs.add_class("external");
                attrs.set("href", reference.value.as_str());
            }
            RefState::Query => {
                attrs.set(
                    "href",
                    format!("?q={}", urlencoding::encode(&reference.value)),
                );
            }
            _ => attrs.set("href", reference.value.as_str()),
        }
        element("a", &attrs, children)
    }

    fn image(&self, attrs: &Attributes, src: String, inlines: &InlineSlice) -> Sx {
        let mut attrs = html_attrs(attrs);
        attrs.set("src", src);
        attrs.set("alt", plain_text(inlines));
        element("img", &attrs, Vec::new())
    }

    fn inline(&mut self, inline: &InlineNode, out: &mut Vec<Sx>) {
        match inline {
            InlineNode::Text { text } => {
                if self.in_verse {
                    out.push(Sx::string(text.replace(' ', &NBSP.to_string())));
                } else {
                    out.push(Sx::string(text.as_str()));
                }
            }
            InlineNode::Soft => {
                if self.in_verse {
                    out.push(plain("br", Vec::new()));
                } else {
                    out.push(Sx::string("\n"));
                }
            }
            InlineNode::Hard => out.push(plain("br", Vec::new())),
            InlineNode::Link {
                attrs,
                reference,
                inlines,
            } => {
                let children = if inlines.is_empty() {
                    vec![Sx::string(reference.to_text())]
                } else {
                    self.inlines(inlines)
                };
                out.push(self.link(&html_attrs(attrs), reference, children));
            }
            InlineNode::Embed {
                attrs,
                reference,
                inlines,
                ..
            } => out.push(self.image(attrs, reference.to_text(), inlines)),
            InlineNode::EmbedBlob {
                attrs,
                syntax,
                data,
                inlines,
            } => out.push(self.image(attrs, data_uri(syntax, data), inlines)),
            InlineNode::Cite {
                attrs,
                key,
                inlines,
            } => {
                let mut children = vec![Sx::string(key.as_str())];
                if !inlines.is_empty() {
                    children.push(Sx::string(", "));
                    children.extend(self.inlines(inlines));
                }
                let mut attrs = html_attrs(attrs);
                attrs.add_class("cite");
                out.push(element("span", &attrs, children));
            }
            InlineNode::Mark {
                fragment, inlines, ..
            } => {
                let children = self.inlines(inlines);
                if fragment.is_empty() {
                    out.extend(children);
                } else {
                    let attrs = Attributes::new().with("id", fragment.as_str());
                    out.push(element("a", &attrs, children));
                }
            }
            InlineNode::Footnote { attrs, inlines } => {
                let n = self.endnotes.len() + 1;
                // reserve the number before nested notes take theirs
                self.endnotes.push(Vec::new());
                let note = self.with_lang(attrs, |this| this.inlines(inlines));
                self.endnotes[n - 1] = note;
                let anchor = element(
                    "a",
                    &Attributes::new()
                        .with("class", "zs-noteref")
                        .with("href", format!("#fn:{n}"))
                        .with("role", "doc-noteref"),
                    vec![Sx::string(n.to_string())],
                );
                out.push(element(
                    "sup",
                    &Attributes::new().with("id", format!("fnref:{n}")),
                    vec![anchor],
                ));
            }
            InlineNode::Format {
                kind,
                attrs,
                inlines,
            } => out.push(self.format(*kind, attrs, inlines)),
            InlineNode::Literal {
                kind,
                attrs,
                content,
            } => {
                let attrs = html_attrs(attrs);
                let text = vec![Sx::string(content.as_str())];
                out.push(match kind {
                    LiteralKind::Code => element("code", &attrs, text),
                    LiteralKind::Input => element("kbd", &attrs, text),
                    LiteralKind::Output => element("samp", &attrs, text),
                    LiteralKind::Math => {
                        let mut attrs = attrs;
                        attrs.add_class("zs-math");
                        element("code", &attrs, text)
                    }
                    LiteralKind::Comment => comment(content),
                    LiteralKind::Html => raw(content),
                });
            }
            InlineNode::Unknown { node } => {
                tracing::warn!(node = %node, "unknown inline node shown as text");
                out.push(unknown(node));
            }
        }
    }

    fn format(&mut self, kind: FormatKind, attrs: &Attributes, inlines: &InlineSlice) -> Sx {
        let html = html_attrs(attrs);
        self.with_lang(attrs, |this| {
            let tag = match kind {
                FormatKind::Emph => "em",
                FormatKind::Strong => "strong",
                FormatKind::Insert => "ins",
                FormatKind::Delete => "del",
                FormatKind::Super => "sup",
                FormatKind::Sub => "sub",
                FormatKind::Mark => "mark",
                FormatKind::Span => "span",
                FormatKind::Quote => {
                    let (open, close) = quotes(this.lang()).marks(this.quote_depth);
                    this.quote_depth += 1;
                    let mut children = vec![Sx::string(open)];
                    children.extend(this.inlines(inlines));
                    children.push(Sx::string(close));
                    this.quote_depth -= 1;
                    return element("q", &html, children);
                }
            };
            element(tag, &html, this.inlines(inlines))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::zettelmark::parse_document;
    use crate::sz::parse_sz;
    use pretty_assertions::assert_eq;

    fn shtml(input: &str) -> String {
        let mut transformer = Transformer::new("en");
        let nodes = transformer.blocks(&parse_document(input));
        nodes.iter().map(Sx::print).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_paragraph_and_heading() {
        assert_eq!(shtml("**bold**"), r#"(p (strong "bold"))"#);
        let mut blocks = parse_document("= Intro {lang=de}");
        crate::cleaner::clean(&mut blocks, false);
        let nodes = Transformer::new("en").blocks(&blocks);
        assert_eq!(nodes[0].print(), r#"(h2 (@ (id "intro") (lang "de")) "Intro")"#);
    }

    #[test]
    fn test_attributes_filtered() {
        assert_eq!(
            shtml("``x``{go title=t}"),
            r#"(p (code (@ (title "t")) "x"))"#
        );
    }

    #[test]
    fn test_quotes_by_language_and_depth() {
        let quote = |inlines| InlineNode::Format {
            kind: FormatKind::Quote,
            attrs: Attributes::new(),
            inlines,
        };
        let nested = quote(vec![
            InlineNode::text("a "),
            quote(vec![InlineNode::text("b")]),
        ]);
        let nodes = Transformer::new("en").inlines(&vec![nested]);
        assert_eq!(
            nodes[0].print(),
            "(q \"\u{201c}\" \"a \" (q \"\u{2018}\" \"b\" \"\u{2019}\") \"\u{201d}\")"
        );
        assert_eq!(
            shtml(r#"""x""{lang=de}"#),
            "(p (q (@ (lang \"de\")) \"\u{201e}\" \"x\" \"\u{201c}\"))"
        );
    }

    #[test]
    fn test_endnotes() {
        let mut transformer = Transformer::new("en");
        let nodes = transformer.blocks(&parse_document("a[^one[^two]]"));
        assert_eq!(
            nodes[0].print(),
            r##"(p "a" (sup (@ (id "fnref:1")) (a (@ (class "zs-noteref") (href "#fn:1") (role "doc-noteref")) "1")))"##
        );
        let notes = transformer.endnotes().unwrap().print();
        assert!(notes.starts_with(r#"(ol (@ (class "endnotes")) (li (@ (id "fn:1") (value "1")) "one""#));
        assert!(notes.contains(r#"(li (@ (id "fn:2") (value "2")) "two""#));
        assert!(transformer.endnotes().is_none());
    }

    #[test]
    fn test_links() {
        assert_eq!(
            shtml("[[q|query:tags:#a b]]"),
            r#"(p (a (@ (href "?q=tags%3A%23a%20b")) "q"))"#
        );
        assert_eq!(
            shtml("[[https://example.com]]"),
            r#"(p (a (@ (class "external") (href "https://example.com")) "https://example.com"))"#
        );
    }

    #[test]
    fn test_unknown_nodes_stay_visible() {
        let blocks =
            parse_sz(r#"(BLOCK (PARA (TEXT "a") (BOGUS-INLINE (TEXT "x")) (TEXT "b")) (BOGUS-BLOCK))"#)
                .unwrap();
        let nodes = Transformer::new("en").blocks(&blocks);
        assert_eq!(
            nodes[0].print(),
            r#"(p "a" (span (@ (class "zs-unknown")) "[unknown: (BOGUS-INLINE (TEXT \"x\"))]") "b")"#
        );
        assert_eq!(
            nodes[1].print(),
            r#"(p (span (@ (class "zs-unknown")) "[unknown: (BOGUS-BLOCK)]"))"#
        );
    }

    #[test]
    fn test_blob_image() {
        let blocks = vec![BlockNode::Blob {
            description: vec![InlineNode::text("Pic")],
            syntax: "png".into(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        }];
        let nodes = Transformer::new("en").blocks(&blocks);
        assert_eq!(
            nodes[0].print(),
            r#"(p (img (@ (alt "Pic") (src "data:image/png;base64,iVBORw=="))))"#
        );
    }
}
