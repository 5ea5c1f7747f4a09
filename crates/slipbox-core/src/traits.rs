// SPDX-License-Identifier: AGPL-3.0-or-later
//! Syntax parser and encoder traits

use crate::ast::{BlockSlice, InlineSlice};
use crate::config::ParseConfig;
use crate::meta::Meta;
use crate::sz::TransformError;
use crate::zettel::ZettelNode;
use std::io::Write;

/// Error type for encoders
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoder {encoder} does not implement {operation}")]
    NotImplemented {
        encoder: &'static str,
        operation: &'static str,
    },

    #[error("Unknown encoder: {0}")]
    UnknownEncoder(String),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),
}

pub type Result<T> = std::result::Result<T, EncodeError>;

/// Parser for one markup syntax
///
/// Parsers never fail: malformed input degrades to literal text or to a
/// visible diagnostic inside the returned tree.
pub trait SyntaxParser: Send + Sync {
    /// Parse zettel content into blocks
    fn parse_blocks(&self, input: &[u8], meta: &Meta, syntax: &str, config: &ParseConfig)
        -> BlockSlice;

    /// Parse a single line of inline text, e.g. a title
    fn parse_inlines(&self, input: &str, syntax: &str) -> InlineSlice;
}

/// Encoder of a parsed zettel into an output format
///
/// Every operation writes into `w` and returns the number of bytes written.
pub trait Encoder {
    fn write_zettel(&self, w: &mut dyn Write, zn: &ZettelNode) -> Result<usize>;

    fn write_meta(&self, w: &mut dyn Write, meta: &Meta) -> Result<usize>;

    /// Content of a zettel without its metadata
    fn write_content(&self, w: &mut dyn Write, zn: &ZettelNode) -> Result<usize> {
        self.write_blocks(w, &zn.blocks)
    }

    fn write_blocks(&self, w: &mut dyn Write, blocks: &BlockSlice) -> Result<usize>;

    fn write_inlines(&self, w: &mut dyn Write, inlines: &InlineSlice) -> Result<usize>;
}

/// Write a rendered string and report its length
pub fn write_str(w: &mut dyn Write, output: &str) -> Result<usize> {
    w.write_all(output.as_bytes())?;
    Ok(output.len())
}
