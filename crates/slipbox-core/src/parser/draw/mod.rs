// SPDX-License-Identifier: AGPL-3.0-or-later
//! ASCII art drawings, rendered as SVG
//!
//! The zettel metadata (or the attributes of an evaluated verbatim block)
//! select the font and the size of a character cell.

mod canvas;
mod svg;

pub use canvas::{Canvas, DrawError};

use super::{blob, ParserInfo};
use crate::ast::{BlockNode, BlockSlice, InlineNode, InlineSlice};
use crate::attrs::Attributes;
use crate::config::ParseConfig;
use crate::meta::{Meta, KEY_FONT, KEY_X_SCALE, KEY_Y_SCALE};
use crate::traits::SyntaxParser;

/// Syntax name of the generated images
pub const SVG_SYNTAX: &str = "svg";
pub const DEFAULT_X_SCALE: u32 = 10;
pub const DEFAULT_Y_SCALE: u32 = 20;
const MAX_SCALE: u32 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOptions {
    /// Font family; empty leaves the font to the viewer
    pub font: String,
    /// Width of a character cell
    pub x_scale: u32,
    /// Height of a character cell
    pub y_scale: u32,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            font: String::new(),
            x_scale: DEFAULT_X_SCALE,
            y_scale: DEFAULT_Y_SCALE,
        }
    }
}

fn scale(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| (1..=MAX_SCALE).contains(v))
        .unwrap_or(default)
}

impl DrawOptions {
    /// Options from textual values; bad or out-of-range scales use the defaults
    pub fn from_values(font: Option<&str>, x_scale: Option<&str>, y_scale: Option<&str>) -> Self {
        Self {
            font: font.unwrap_or_default().to_string(),
            x_scale: scale(x_scale, DEFAULT_X_SCALE),
            y_scale: scale(y_scale, DEFAULT_Y_SCALE),
        }
    }

    pub fn from_meta(meta: &Meta) -> Self {
        Self::from_values(
            meta.get(KEY_FONT),
            meta.get(KEY_X_SCALE),
            meta.get(KEY_Y_SCALE),
        )
    }

    /// Attributes take precedence over metadata
    pub fn from_attrs(attrs: &Attributes, meta: &Meta) -> Self {
        let pick = |key: &str| attrs.get(key).or_else(|| meta.get(key));
        Self::from_values(pick(KEY_FONT), pick(KEY_X_SCALE), pick(KEY_Y_SCALE))
    }
}

/// Render ASCII art as an SVG document
pub fn to_svg(text: &str, options: &DrawOptions) -> Result<String, DrawError> {
    let canvas = Canvas::parse(text)?;
    svg::render(&canvas, options)
}

pub fn error_text(err: &DrawError) -> InlineNode {
    InlineNode::text(format!("Error: {err}"))
}

/// A BLOB with the rendered drawing, or a paragraph describing the error
pub fn draw_blocks(text: &str, meta: &Meta, options: &DrawOptions) -> BlockSlice {
    match to_svg(text, options) {
        Ok(svg) => vec![blob::blob_node(meta, SVG_SYNTAX, svg.into_bytes())],
        Err(err) => {
            tracing::debug!(zid = %meta.zid, error = %err, "drawing not rendered");
            vec![BlockNode::para(vec![error_text(&err)])]
        }
    }
}

/// The rendered drawing as an inline image, or the error text
pub fn draw_inline(text: &str, attrs: Attributes, options: &DrawOptions) -> InlineNode {
    match to_svg(text, options) {
        Ok(svg) => InlineNode::EmbedBlob {
            attrs,
            syntax: SVG_SYNTAX.to_string(),
            data: svg.into_bytes(),
            inlines: Vec::new(),
        },
        Err(err) => error_text(&err),
    }
}

struct DrawParser;

impl SyntaxParser for DrawParser {
    fn parse_blocks(&self, input: &[u8], meta: &Meta, _: &str, _: &ParseConfig) -> BlockSlice {
        let text = String::from_utf8_lossy(input);
        draw_blocks(&text, meta, &DrawOptions::from_meta(meta))
    }

    fn parse_inlines(&self, input: &str, _: &str) -> InlineSlice {
        vec![draw_inline(input, Attributes::new(), &DrawOptions::default())]
    }
}

pub(super) fn info() -> ParserInfo {
    ParserInfo {
        name: "draw",
        alt_names: &[],
        is_ast_parser: true,
        is_text_format: true,
        is_image_format: false,
        parser: Box::new(DrawParser),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ZettelId;
    use crate::parser::parse_blocks;

    fn meta() -> Meta {
        Meta::new(ZettelId::new(20240101000000).unwrap()).with("title", "Sketch")
    }

    #[test]
    fn test_scale_bounds() {
        let options = DrawOptions::from_values(Some("serif"), Some("0"), Some("x"));
        assert_eq!(options.font, "serif");
        assert_eq!(options.x_scale, DEFAULT_X_SCALE);
        assert_eq!(options.y_scale, DEFAULT_Y_SCALE);
        assert_eq!(DrawOptions::from_values(None, Some("1000000"), None).x_scale, 1_000_000);
        assert_eq!(DrawOptions::from_values(None, Some("1000001"), None).x_scale, DEFAULT_X_SCALE);
    }

    #[test]
    fn test_attrs_override_meta() {
        let meta = meta().with("x-scale", "7").with("font", "mono");
        let attrs = Attributes::new().with("x-scale", "12");
        let options = DrawOptions::from_attrs(&attrs, &meta);
        assert_eq!(options.x_scale, 12);
        assert_eq!(options.font, "mono");
    }

    #[test]
    fn test_parse_to_svg_blob() {
        let blocks = parse_blocks(b"+--+\n|  |\n+--+", &meta(), "draw", &ParseConfig::default());
        match &blocks[0] {
            BlockNode::Blob {
                description,
                syntax,
                data,
            } => {
                assert_eq!(syntax, "svg");
                assert_eq!(description, &vec![InlineNode::text("Sketch")]);
                assert!(String::from_utf8_lossy(data).starts_with("<svg"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_errors_become_paragraphs() {
        let blocks = parse_blocks(b"a\x01b", &meta(), "draw", &ParseConfig::default());
        assert_eq!(
            blocks,
            vec![BlockNode::para(vec![InlineNode::text(
                "Error: control character in line 1, column 2"
            )])]
        );
        let empty = parse_blocks(b"   \n", &meta(), "draw", &ParseConfig::default());
        assert_eq!(
            empty,
            vec![BlockNode::para(vec![InlineNode::text("Error: drawing is empty")])]
        );
    }
}
