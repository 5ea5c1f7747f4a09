// SPDX-License-Identifier: AGPL-3.0-or-later
//! Attribute maps attached to blocks and inlines
//!
//! Keys are kept sorted so that every consumer (canonical printer, HTML
//! printer, Zettelmarkup encoder) sees the same order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key that stores bare tokens such as `{python}` or the word after a fence
pub const DEFAULT_KEY: &str = "-";

/// Key that collects `.name` tokens
pub const CLASS_KEY: &str = "class";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    map: BTreeMap<String, String>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Value of the default key, if any
    pub fn default_value(&self) -> Option<&str> {
        self.get(DEFAULT_KEY)
    }

    /// Builder-style insert that replaces an existing value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }

    /// Append a value, separating it from an existing one by a space
    pub fn append(&mut self, key: impl Into<String>, value: &str) {
        let entry = self.map.entry(key.into()).or_default();
        if !entry.is_empty() && !value.is_empty() {
            entry.push(' ');
        }
        entry.push_str(value);
    }

    pub fn add_class(&mut self, class: &str) {
        let present = self
            .get(CLASS_KEY)
            .is_some_and(|classes| classes.split(' ').any(|c| c == class));
        if !present {
            self.append(CLASS_KEY, class);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.map.remove(key)
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_iteration() {
        let attrs: Attributes = [("z", "1"), ("a", "2"), ("-", "3")].into_iter().collect();
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["-", "a", "z"]);
    }

    #[test]
    fn test_append_and_class() {
        let mut attrs = Attributes::new();
        attrs.append(DEFAULT_KEY, "python");
        attrs.append(DEFAULT_KEY, "linenos");
        attrs.add_class("note");
        attrs.add_class("wide");
        attrs.add_class("note");
        assert_eq!(attrs.default_value(), Some("python linenos"));
        assert_eq!(attrs.get(CLASS_KEY), Some("note wide"));
    }

    #[test]
    fn test_with_replaces() {
        let attrs = Attributes::new().with("lang", "de").with("lang", "fr");
        assert_eq!(attrs.get("lang"), Some("fr"));
        assert_eq!(attrs.len(), 1);
    }
}
