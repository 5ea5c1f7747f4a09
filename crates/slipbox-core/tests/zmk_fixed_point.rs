// SPDX-License-Identifier: AGPL-3.0-or-later
//! Zettelmarkup output reads back into the same tree and the same text

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use slipbox_core::encoder::{create, CreateParameter, EncoderKind};
use slipbox_core::parser::parse_zettel;
use slipbox_core::{Meta, ParseConfig, Zettel, ZettelId};

const MARKDOWN: &[&str] = &[
    "# Title\n\nA paragraph with *emph*, **strong** and `code`.",
    "Line one\nline two",
    "- one\n- two\n  - nested\n- three",
    "1. first\n2. second",
    "> quoted text\n>\n> more",
    "```rust\nfn main() {}\n```",
    "[a link](https://example.com) and [another](20240101000001)",
    "---",
    "| a | b |\n|---|---|\n| 1 | 2 |",
    "Stars \\* and brackets \\[x\\] stay text",
    "## Second\n\n### Third\n\nbody",
];

/// Inputs whose first encoding used to differ from the second
const FORMERLY_UNSTABLE: &[&str] = &[
    "|",
    "|\n|",
    "a\n\n|\n|\n\nb",
    ":*@@@@]",
    ";\n :",
];

const ZETTELMARKUP: &[&str] = &[
    "=== Heading {.x}\n\nText with __emph__ and **strong**",
    "* a\n** b\n* c",
    "; term\n: definition",
    ":::\nregion\n::: Citation",
    "|=h1|=h2\n|c1|c2>",
    "[[Link|https://example.com]]{title=\"t\"} [@key p. 5] [^note] [!mark|marked]",
    "``literal``{go} ''input'' ==output== $$x^2$$",
    "%% a comment\ntext",
    "{{{20240101000002}}}",
];

fn zmk(syntax: &str, content: &str) -> String {
    let meta = Meta::new(ZettelId::new(20240101000000).unwrap()).with("syntax", syntax);
    let zn = parse_zettel(&Zettel::new(meta, content), "", &ParseConfig::default());
    let mut out = Vec::new();
    create(EncoderKind::Zmk, &CreateParameter::default())
        .write_content(&mut out, &zn)
        .unwrap();
    String::from_utf8(out).unwrap()
}

fn assert_fixed_point(syntax: &str, input: &str) {
    let first = zmk(syntax, input);
    assert!(!first.is_empty(), "{syntax} input {input:?} encoded to nothing");
    let second = zmk("zmk", &first);
    assert_eq!(second, first, "{syntax} input {input:?}");
}

#[test]
fn test_markdown_through_zmk() {
    for input in MARKDOWN {
        assert_fixed_point("markdown", input);
    }
}

#[test]
fn test_zmk_through_zmk() {
    for input in ZETTELMARKUP {
        assert_fixed_point("zmk", input);
    }
}

#[test]
fn test_markdown_shapes() {
    assert_eq!(
        zmk("markdown", "# Title\n\nA *b* **c** `d`"),
        "= Title\n\nA __b__ **c** ``d``"
    );
    assert_eq!(zmk("markdown", "- one\n  - two"), "* one\n** two");
    assert_eq!(zmk("markdown", "> q"), "> q");
}

#[test]
fn test_formerly_unstable_inputs() {
    for input in FORMERLY_UNSTABLE {
        let first = zmk("zmk", input);
        assert_eq!(zmk("zmk", &first), first, "input {input:?}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_zmk_is_a_fixed_point(input in "[=*#;:|\\[\\]{}!^@%~`\"<>_/'^,a \n]{0,60}") {
        let first = zmk("zmk", &input);
        prop_assert_eq!(zmk("zmk", &first), first);
    }
}
