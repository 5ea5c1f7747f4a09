// SPDX-License-Identifier: AGPL-3.0-or-later
//! Zettel metadata: identifier plus a sorted key/value map

use crate::id::ZettelId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const KEY_TITLE: &str = "title";
pub const KEY_SYNTAX: &str = "syntax";
pub const KEY_SUMMARY: &str = "summary";
pub const KEY_LANG: &str = "lang";
pub const KEY_TAGS: &str = "tags";
pub const KEY_ROLE: &str = "role";
pub const KEY_FONT: &str = "font";
pub const KEY_X_SCALE: &str = "x-scale";
pub const KEY_Y_SCALE: &str = "y-scale";

/// How a metadata value is interpreted by query actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Free text
    String,
    /// A single word
    Word,
    /// Space separated words
    WordSet,
    /// Space separated `#tag` words
    TagSet,
}

impl KeyType {
    pub fn of(key: &str) -> Self {
        match key {
            KEY_TAGS => Self::TagSet,
            KEY_ROLE | KEY_SYNTAX | KEY_LANG | "visibility" | "status" => Self::Word,
            _ if key.ends_with("-tags") => Self::TagSet,
            _ if key.ends_with("-role") => Self::Word,
            _ if key.ends_with("-set") => Self::WordSet,
            _ => Self::String,
        }
    }

    pub fn is_set(self) -> bool {
        matches!(self, Self::WordSet | Self::TagSet)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub zid: ZettelId,
    #[serde(default)]
    pairs: BTreeMap<String, String>,
}

impl Meta {
    pub fn new(zid: ZettelId) -> Self {
        Self {
            zid,
            pairs: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    /// Value of a key, ignoring empty ones
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn title(&self) -> Option<&str> {
        self.get_non_empty(KEY_TITLE)
    }

    pub fn syntax(&self) -> Option<&str> {
        self.get_non_empty(KEY_SYNTAX)
    }

    /// Values of a key, split into words when its type is a set
    pub fn values(&self, key: &str) -> Vec<&str> {
        match self.get_non_empty(key) {
            None => Vec::new(),
            Some(value) if KeyType::of(key).is_set() => value.split_whitespace().collect(),
            Some(value) => vec![value.trim()],
        }
    }

    /// Copy with `syntax` and `lang` filled in where missing
    pub fn with_defaults(&self, default_syntax: &str, default_lang: &str) -> Meta {
        let mut inherited = self.clone();
        if inherited.syntax().is_none() {
            inherited.set(KEY_SYNTAX, default_syntax);
        }
        if inherited.get_non_empty(KEY_LANG).is_none() {
            inherited.set(KEY_LANG, default_lang);
        }
        inherited
    }
}
