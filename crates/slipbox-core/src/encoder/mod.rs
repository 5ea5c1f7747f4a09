// SPDX-License-Identifier: AGPL-3.0-or-later
//! Encoders for all supported output formats

pub mod html;
pub mod md;
pub mod sz;
pub mod text;
pub mod zmk;

use std::fmt;
use std::str::FromStr;

use crate::config::{EncodeConfig, DEFAULT_LANG};
use crate::traits::{EncodeError, Encoder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncoderKind {
    Html,
    Md,
    Sz,
    Shtml,
    Text,
    Zmk,
}

impl EncoderKind {
    pub const ALL: [EncoderKind; 6] = [
        EncoderKind::Html,
        EncoderKind::Md,
        EncoderKind::Sz,
        EncoderKind::Shtml,
        EncoderKind::Text,
        EncoderKind::Zmk,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EncoderKind::Html => "html",
            EncoderKind::Md => "md",
            EncoderKind::Sz => "sz",
            EncoderKind::Shtml => "shtml",
            EncoderKind::Text => "text",
            EncoderKind::Zmk => "zmk",
        }
    }
}

impl FromStr for EncoderKind {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EncoderKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| EncodeError::UnknownEncoder(s.to_string()))
    }
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters that tune a created encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateParameter {
    /// Language for quotation marks
    pub lang: String,
}

impl Default for CreateParameter {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
        }
    }
}

impl From<&EncodeConfig> for CreateParameter {
    fn from(config: &EncodeConfig) -> Self {
        Self {
            lang: config.lang.clone(),
        }
    }
}

pub fn create(kind: EncoderKind, params: &CreateParameter) -> Box<dyn Encoder> {
    match kind {
        EncoderKind::Html => Box::new(html::HtmlEncoder::new(&params.lang)),
        EncoderKind::Shtml => Box::new(html::ShtmlEncoder::new(&params.lang)),
        EncoderKind::Md => Box::new(md::MdEncoder),
        EncoderKind::Sz => Box::new(sz::SzEncoder),
        EncoderKind::Text => Box::new(text::TextEncoder),
        EncoderKind::Zmk => Box::new(zmk::ZmkEncoder),
    }
}

/// Create an encoder by format name
pub fn create_by_name(name: &str, params: &CreateParameter) -> Result<Box<dyn Encoder>, EncodeError> {
    Ok(create(name.parse()?, params))
}
