// SPDX-License-Identifier: AGPL-3.0-or-later
//! Printing sHTML as HTML text

use super::transform::{ATTRS_SYMBOL, COMMENT_SYMBOL, RAW_SYMBOL};
use crate::sx::Sx;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Print a sequence of top-level nodes, one per line
pub fn print_nodes(nodes: &[Sx]) -> String {
    let mut output = String::new();
    for (idx, node) in nodes.iter().enumerate() {
        if idx > 0 {
            output.push('\n');
        }
        print_node(&mut output, node);
    }
    output
}

pub fn print_node(output: &mut String, node: &Sx) {
    match node {
        Sx::String(text) => output.push_str(&html_escape::encode_text(text)),
        Sx::Int(n) => output.push_str(&n.to_string()),
        Sx::Symbol(name) => output.push_str(&html_escape::encode_text(name)),
        Sx::List(list) => print_list(output, list),
    }
}

fn print_list(output: &mut String, list: &[Sx]) {
    let Some((head, rest)) = list.split_first() else {
        return;
    };
    let Some(tag) = head.as_symbol() else {
        for node in list {
            print_node(output, node);
        }
        return;
    };
    match tag {
        RAW_SYMBOL => {
            for node in rest {
                if let Some(html) = node.as_str() {
                    output.push_str(html);
                }
            }
        }
        COMMENT_SYMBOL => {
            output.push_str("<!--");
            for node in rest {
                if let Some(text) = node.as_str() {
                    output.push(' ');
                    output.push_str(&text.replace("--", "-&#45;"));
                }
            }
            output.push_str(" -->");
        }
        _ => {
            output.push('<');
            output.push_str(tag);
            let children = match rest.first() {
                Some(first) if first.tag() == Some(ATTRS_SYMBOL) => {
                    print_attrs(output, first);
                    &rest[1..]
                }
                _ => rest,
            };
            output.push('>');
            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            for child in children {
                print_node(output, child);
            }
            output.push_str(&format!("</{tag}>"));
        }
    }
}

fn print_attrs(output: &mut String, attrs: &Sx) {
    let Some(pairs) = attrs.as_list() else {
        return;
    };
    let mut pairs: Vec<(&str, &str)> = pairs[1..]
        .iter()
        .filter_map(|pair| {
            let pair = pair.as_list()?;
            let key = pair.first()?.as_symbol()?;
            let value = pair.get(1).and_then(Sx::as_str).unwrap_or_default();
            Some((key, value))
        })
        .collect();
    pairs.sort_unstable();
    for (key, value) in pairs {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        output.push_str(&html_escape::encode_double_quoted_attribute(value));
        output.push('"');
    }
}
