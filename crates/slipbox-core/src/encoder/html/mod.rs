// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTML5 and sHTML encoders
//!
//! Both encoders share one transformation into sHTML. The HTML encoder
//! prints the result as markup, the sHTML encoder prints the expressions.

pub mod printer;
pub mod quotes;
pub mod transform;

use std::io::Write;

use crate::ast::{BlockSlice, InlineSlice};
use crate::attrs::Attributes;
use crate::encoder::text::plain_text;
use crate::meta::{Meta, KEY_LANG, KEY_TITLE};
use crate::parser::parse_meta_inlines;
use crate::sx::Sx;
use crate::traits::{write_str, Encoder, Result};
use crate::zettel::ZettelNode;
use transform::{element, Transformer};

/// Body nodes of `blocks`, followed by the endnotes they collected
fn body_nodes(lang: &str, blocks: &BlockSlice) -> Vec<Sx> {
    let mut transformer = Transformer::new(lang);
    let mut nodes = transformer.blocks(blocks);
    nodes.extend(transformer.endnotes());
    nodes
}

fn meta_nodes(meta: &Meta) -> Vec<Sx> {
    meta.iter()
        .filter(|(key, _)| *key != KEY_TITLE)
        .map(|(key, value)| {
            element(
                "meta",
                &Attributes::new().with("name", key).with("content", value),
                Vec::new(),
            )
        })
        .collect()
}

fn zettel_lang<'a>(zn: &'a ZettelNode, fallback: &'a str) -> &'a str {
    zn.inherited.get_non_empty(KEY_LANG).unwrap_or(fallback)
}

pub struct HtmlEncoder {
    lang: String,
}

impl HtmlEncoder {
    pub fn new(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
        }
    }
}

impl Encoder for HtmlEncoder {
    fn write_zettel(&self, w: &mut dyn Write, zn: &ZettelNode) -> Result<usize> {
        let lang = zettel_lang(zn, &self.lang);
        let mut head = vec![element(
            "meta",
            &Attributes::new().with("charset", "utf-8"),
            Vec::new(),
        )];
        if let Some(title) = zn.inherited.title() {
            let text = plain_text(&parse_meta_inlines(title));
            head.push(element("title", &Attributes::new(), vec![Sx::string(text)]));
        }
        head.extend(meta_nodes(&zn.inherited));

        let mut output = String::from("<!DOCTYPE html>\n");
        output.push_str(&format!("<html lang=\"{}\">\n<head>\n", html_escape::encode_double_quoted_attribute(lang)));
        output.push_str(&printer::print_nodes(&head));
        output.push_str("\n</head>\n<body>\n");
        let body = printer::print_nodes(&body_nodes(lang, &zn.blocks));
        if !body.is_empty() {
            output.push_str(&body);
            output.push('\n');
        }
        output.push_str("</body>\n</html>");
        write_str(w, &output)
    }

    fn write_meta(&self, w: &mut dyn Write, meta: &Meta) -> Result<usize> {
        write_str(w, &printer::print_nodes(&meta_nodes(meta)))
    }

    fn write_blocks(&self, w: &mut dyn Write, blocks: &BlockSlice) -> Result<usize> {
        write_str(w, &printer::print_nodes(&body_nodes(&self.lang, blocks)))
    }

    fn write_inlines(&self, w: &mut dyn Write, inlines: &InlineSlice) -> Result<usize> {
        let mut output = String::new();
        for node in Transformer::new(&self.lang).inlines(inlines) {
            printer::print_node(&mut output, &node);
        }
        write_str(w, &output)
    }
}

pub struct ShtmlEncoder {
    lang: String,
}

impl ShtmlEncoder {
    pub fn new(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
        }
    }
}

fn print_list(nodes: Vec<Sx>) -> String {
    Sx::List(nodes).print()
}

impl Encoder for ShtmlEncoder {
    fn write_zettel(&self, w: &mut dyn Write, zn: &ZettelNode) -> Result<usize> {
        let lang = zettel_lang(zn, &self.lang);
        let mut output = print_list(meta_nodes(&zn.inherited));
        output.push('\n');
        output.push_str(&print_list(body_nodes(lang, &zn.blocks)));
        write_str(w, &output)
    }

    fn write_meta(&self, w: &mut dyn Write, meta: &Meta) -> Result<usize> {
        write_str(w, &print_list(meta_nodes(meta)))
    }

    fn write_blocks(&self, w: &mut dyn Write, blocks: &BlockSlice) -> Result<usize> {
        write_str(w, &print_list(body_nodes(&self.lang, blocks)))
    }

    fn write_inlines(&self, w: &mut dyn Write, inlines: &InlineSlice) -> Result<usize> {
        write_str(w, &print_list(Transformer::new(&self.lang).inlines(inlines)))
    }
}
