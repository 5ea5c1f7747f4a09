// SPDX-License-Identifier: AGPL-3.0-or-later
//! Slipbox Eval - resolution of links, embeds, transclusions and queries
//!
//! The evaluator walks a parsed zettel depth-first, left to right, and
//! fetches everything it needs through a [`Port`]:
//! - Transclusions are replaced by the evaluated content of the target
//! - Embeds of image zettel become inline BLOBs
//! - Queries are run and rendered as lists or tag clouds
//! - Links to zettel are checked for existence

pub mod evaluator;
pub mod fragment;
pub mod query;

use slipbox_core::{Meta, Zettel, ZettelId};
use thiserror::Error;

pub use evaluator::{evaluate_blocks, evaluate_inlines, evaluate_zettel};
pub use query::{render_query_results, Query};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// The caller may not see the zettel; the reference is omitted silently
    #[error("Access not allowed")]
    NotAllowed,

    #[error("Zettel {0} not found")]
    NotFound(ZettelId),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PortError>;

/// Access to other zettel and to the metadata search
///
/// Calls are synchronous. Implementations decide about caching, retries
/// and cancellation.
pub trait Port {
    fn get_zettel(&self, zid: ZettelId) -> Result<Zettel>;

    /// Metadata of all zettel matching the search part of `query`
    fn query_meta(&self, query: &Query) -> Result<Vec<Meta>>;
}
