// SPDX-License-Identifier: AGPL-3.0-or-later
//! Zettel as stored and zettel as parsed

use crate::ast::BlockSlice;
use crate::id::ZettelId;
use crate::meta::Meta;
use serde::{Deserialize, Serialize};

/// Metadata plus raw content, as delivered by a port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zettel {
    pub meta: Meta,
    pub content: Vec<u8>,
}

impl Zettel {
    pub fn new(meta: Meta, content: impl Into<Vec<u8>>) -> Self {
        Self {
            meta,
            content: content.into(),
        }
    }

    pub fn zid(&self) -> ZettelId {
        self.meta.zid
    }

    /// Content as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// A parsed zettel
///
/// Created by the parser registry, replaced in place by the evaluator and
/// only read by encoders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZettelNode {
    pub meta: Meta,
    /// Metadata with defaults applied for `syntax` and `lang`
    pub inherited: Meta,
    pub content: Vec<u8>,
    pub syntax: String,
    pub zid: ZettelId,
    pub blocks: BlockSlice,
}
