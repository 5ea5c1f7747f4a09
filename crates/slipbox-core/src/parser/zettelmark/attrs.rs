// SPDX-License-Identifier: AGPL-3.0-or-later
//! Attribute syntax: `{key=value key="quoted" .class bare}`

use crate::attrs::{Attributes, DEFAULT_KEY};

/// Parse an attribute block starting at `chars[pos] == '{'`
///
/// Returns the attributes and the position after the closing brace, or
/// `None` when the block is malformed or unterminated.
pub(crate) fn parse_attrs(chars: &[char], pos: usize) -> Option<(Attributes, usize)> {
    if chars.get(pos) != Some(&'{') {
        return None;
    }
    let mut attrs = Attributes::new();
    let mut i = pos + 1;
    loop {
        while chars.get(i).is_some_and(|c| c.is_whitespace()) {
            i += 1;
        }
        match *chars.get(i)? {
            '}' => return Some((attrs, i + 1)),
            '"' => {
                let (value, end) = quoted(chars, i)?;
                attrs.append(DEFAULT_KEY, &value);
                i = end;
            }
            '.' => {
                let start = i + 1;
                i = word_end(chars, start);
                if i == start {
                    return None;
                }
                let class: String = chars[start..i].iter().collect();
                attrs.add_class(&class);
            }
            _ => {
                let start = i;
                i = word_end(chars, start);
                if i == start {
                    return None;
                }
                let word: String = chars[start..i].iter().collect();
                if chars.get(i) == Some(&'=') {
                    i += 1;
                    let value = if chars.get(i) == Some(&'"') {
                        let (value, end) = quoted(chars, i)?;
                        i = end;
                        value
                    } else {
                        let vstart = i;
                        i = word_end(chars, vstart);
                        chars[vstart..i].iter().collect()
                    };
                    attrs.set(word, value);
                } else {
                    attrs.append(DEFAULT_KEY, &word);
                }
            }
        }
    }
}

fn word_end(chars: &[char], mut i: usize) -> usize {
    while let Some(&c) = chars.get(i) {
        if c.is_whitespace() || matches!(c, '=' | '}' | '{' | '"') {
            break;
        }
        i += 1;
    }
    i
}

/// Quoted string with `\"` and `\\` escapes; `chars[pos] == '"'`
fn quoted(chars: &[char], pos: usize) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut i = pos + 1;
    loop {
        match *chars.get(i)? {
            '"' => return Some((value, i + 1)),
            '\\' => {
                let next = *chars.get(i + 1)?;
                value.push(next);
                i += 2;
            }
            c => {
                value.push(c);
                i += 1;
            }
        }
    }
}

/// Parse a complete string as attributes, e.g. the rest of a fence line
pub(crate) fn parse_attrs_str(s: &str) -> Option<Attributes> {
    let chars: Vec<char> = s.chars().collect();
    match parse_attrs(&chars, 0) {
        Some((attrs, end)) if chars[end..].iter().all(|c| c.is_whitespace()) => Some(attrs),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Option<Attributes> {
        parse_attrs_str(s)
    }

    #[test]
    fn test_all_token_kinds() {
        let attrs = parse(r#"{python .wide lang=de title="a \"b\"" .note}"#).unwrap();
        assert_eq!(attrs.default_value(), Some("python"));
        assert_eq!(attrs.get("class"), Some("wide note"));
        assert_eq!(attrs.get("lang"), Some("de"));
        assert_eq!(attrs.get("title"), Some("a \"b\""));
    }

    #[test]
    fn test_explicit_default_key() {
        let attrs = parse(r#"{-="a b" x=""}"#).unwrap();
        assert_eq!(attrs.default_value(), Some("a b"));
        assert_eq!(attrs.get("x"), Some(""));
    }

    #[test]
    fn test_malformed() {
        assert!(parse("{unterminated").is_none());
        assert!(parse(r#"{a="open}"#).is_none());
        assert!(parse("{.}").is_none());
        assert!(parse("{a} trailing").is_none());
        assert_eq!(parse("{}").unwrap(), Attributes::new());
    }
}
