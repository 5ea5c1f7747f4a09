// SPDX-License-Identifier: AGPL-3.0-or-later
//! Hostile input through every parser and every encoder

use proptest::prelude::*;
use slipbox_core::encoder::{create, CreateParameter, EncoderKind};
use slipbox_core::parser::{parse_zettel, syntaxes};
use slipbox_core::sz::{parse_sz, print_sz};
use slipbox_core::{Meta, ParseConfig, Zettel, ZettelId};

const NAUGHTY: &[&str] = &[
    "",
    " ",
    "\n\n\n",
    "\r\n\r\n",
    "\t\t",
    "\u{0}",
    "\u{feff}BOM",
    "=",
    "======= ",
    "* ",
    "# # #",
    "; : ;",
    "|",
    "|=|=|",
    "| a | b\n| c",
    "[[",
    "]]",
    "[[|]]",
    "[[a|",
    "{{{",
    "{{{}}}",
    "{{{ }}}",
    "{{|}}",
    "[^",
    "[^[^[^]]]",
    "[!",
    "[!|]",
    "[@",
    "{",
    "{=",
    "{a=\"",
    "\"\"\"\"\"\"",
    "**__//~~^^,,::''",
    "%%",
    "%%%\nunclosed",
    "~~~",
    "```\ncode",
    "````draw\n+--+\n|  |\n+--+\n````",
    "<<<\n<<<",
    "\"\"\"\n\"\"\"",
    ":::\n:::\n:::",
    "<script>alert(1)</script>",
    "<!-- -->",
    "&amp;&lt;&#x0;",
    "javascript:alert(1)",
    "\\",
    "\\\\\\",
    "ÅÍÎÏ˝ÓÔÒÚÆ☃",
    "田中さんにあげて下さい",
    "👾 🙇 💁 🙅",
    "\u{202e}RTL override",
    "Z̮̞̠͙͔ͅḀ̗̞͈̻̗Ḷ͙̻G̲̝Ǫ̳",
    "(BLOCK (PARA",
    "(PARA (TEXT \"x\"))",
    "))))",
    "\u{7f}\u{80}\u{9f}",
];

fn zettel(content: &[u8]) -> Zettel {
    let zid = ZettelId::new(20240101000000).unwrap();
    Zettel::new(Meta::new(zid).with("title", "Naughty **title** [[x|y]]"), content)
}

fn exercise(content: &[u8]) {
    let zettel = zettel(content);
    let config = ParseConfig::default();
    for syntax in syntaxes() {
        let zn = parse_zettel(&zettel, syntax, &config);
        for kind in EncoderKind::ALL {
            let mut out = Vec::new();
            create(kind, &CreateParameter::default())
                .write_zettel(&mut out, &zn)
                .unwrap_or_else(|err| panic!("{} of {syntax} failed: {err}", kind.name()));
            assert!(
                String::from_utf8(out).is_ok(),
                "{} of {syntax} produced invalid UTF-8",
                kind.name()
            );
        }
        let canonical = print_sz(&zn.blocks);
        assert_eq!(parse_sz(&canonical).as_ref(), Ok(&zn.blocks), "{syntax}: {canonical}");
    }
}

#[test]
fn test_naughty_strings() {
    for input in NAUGHTY {
        exercise(input.as_bytes());
    }
}

#[test]
fn test_invalid_utf8() {
    exercise(&[0xff, 0xfe, b'a', 0xc3, b'\n', 0x80]);
}

#[test]
fn test_deep_nesting() {
    exercise("*".repeat(200).as_bytes());
    exercise(">".repeat(64).as_bytes());
    exercise("[[".repeat(200).as_bytes());
    exercise("{{".repeat(200).as_bytes());
    exercise(":::\n".repeat(50).as_bytes());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_arbitrary_text(input in "\\PC{0,80}") {
        exercise(input.as_bytes());
    }

    #[test]
    fn prop_markup_soup(input in "[=*#;:|\\[\\]{}!^@%~`\"<>_/'^,a \n]{0,60}") {
        exercise(input.as_bytes());
    }
}
