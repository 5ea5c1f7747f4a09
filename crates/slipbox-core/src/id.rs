// SPDX-License-Identifier: AGPL-3.0-or-later
//! Zettel identifiers: 14 decimal digits (`YYYYMMDDhhmmss`), never zero

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of digits in a textual zettel identifier
pub const ID_LENGTH: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZettelId(u64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid zettel identifier: {0:?}")]
pub struct InvalidZettelId(pub String);

impl ZettelId {
    pub const MAX: u64 = 99_999_999_999_999;

    pub fn new(value: u64) -> Option<Self> {
        (value != 0 && value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Check the textual shape without allocating
    pub fn is_valid(s: &str) -> bool {
        s.len() == ID_LENGTH && s.bytes().all(|b| b.is_ascii_digit()) && s.bytes().any(|b| b != b'0')
    }
}

impl FromStr for ZettelId {
    type Err = InvalidZettelId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !Self::is_valid(s) {
            return Err(InvalidZettelId(s.to_string()));
        }
        s.parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| InvalidZettelId(s.to_string()))
    }
}

impl TryFrom<String> for ZettelId {
    type Error = InvalidZettelId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ZettelId> for String {
    fn from(zid: ZettelId) -> Self {
        zid.to_string()
    }
}

impl fmt::Display for ZettelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:014}", self.0)
    }
}
