// SPDX-License-Identifier: AGPL-3.0-or-later
//! Slipbox Core - canonical zettel tree, markup parsers and encoders
//!
//! This crate provides:
//! - A typed tree for zettel content and its S-expression form ("sz")
//! - Parsers for Zettelmarkup, Markdown, plain text, SVG, drawings and images
//! - A cleaner that assigns unique heading and mark identifiers
//! - Encoders for HTML, sHTML, Markdown, Zettelmarkup, plain text and sz

pub mod ast;
pub mod attrs;
pub mod cleaner;
pub mod config;
pub mod encoder;
pub mod id;
pub mod meta;
pub mod parser;
pub mod reference;
pub mod sx;
pub mod sz;
pub mod traits;
pub mod zettel;

pub use ast::{BlockNode, BlockSlice, InlineNode, InlineSlice};
pub use attrs::Attributes;
pub use config::{Config, ConfigError, EncodeConfig, EvalConfig, ParseConfig};
pub use encoder::{create, create_by_name, CreateParameter, EncoderKind};
pub use id::ZettelId;
pub use meta::Meta;
pub use reference::{RefState, Reference};
pub use sx::Sx;
pub use traits::{EncodeError, Encoder, SyntaxParser};
pub use zettel::{Zettel, ZettelNode};
