// SPDX-License-Identifier: AGPL-3.0-or-later
//! Generic s-expression values with a deterministic reader and printer
//!
//! This is the value type behind the canonical "sz" form and the
//! intermediate sHTML form. Attribute maps are not a separate variant; they
//! are lists of two-element `("key" "value")` lists.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// A symbolic expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sx {
    Symbol(String),
    String(String),
    Int(i64),
    List(Vec<Sx>),
}

/// Reader failure, with the byte offset where it was detected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SxError {
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEnd(usize),

    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { offset: usize, found: char },

    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),

    #[error("integer out of range at offset {0}")]
    IntOutOfRange(usize),

    #[error("trailing input at offset {0}")]
    TrailingInput(usize),
}

impl Sx {
    pub fn nil() -> Self {
        Sx::List(Vec::new())
    }

    pub fn symbol(name: &str) -> Self {
        Sx::Symbol(name.to_string())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Sx::String(s.into())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Sx::List(l) if l.is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Sx::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Sx::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Sx::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Sx]> {
        match self {
            Sx::List(l) => Some(l),
            _ => None,
        }
    }

    /// Tag symbol of a tagged list: `(TAG ...)`
    pub fn tag(&self) -> Option<&str> {
        self.as_list()
            .and_then(|l| l.first())
            .and_then(Sx::as_symbol)
    }

    /// Print into a string
    pub fn print(&self) -> String {
        let mut out = String::new();
        self.print_into(&mut out);
        out
    }

    pub fn print_into(&self, out: &mut String) {
        match self {
            Sx::Symbol(s) => out.push_str(s),
            Sx::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Sx::String(s) => print_string(out, s),
            Sx::List(elems) => {
                out.push('(');
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    elem.print_into(out);
                }
                out.push(')');
            }
        }
    }

    /// Read exactly one expression; surrounding whitespace is allowed
    pub fn read(input: &str) -> Result<Sx, SxError> {
        let mut reader = Reader::new(input);
        reader.skip_ws();
        let sx = reader.read_value()?;
        reader.skip_ws();
        if reader.pos < reader.src.len() {
            return Err(SxError::TrailingInput(reader.pos));
        }
        Ok(sx)
    }

    /// Read all top-level expressions of the input
    pub fn read_all(input: &str) -> Result<Vec<Sx>, SxError> {
        let mut reader = Reader::new(input);
        let mut result = Vec::new();
        loop {
            reader.skip_ws();
            if reader.pos >= reader.src.len() {
                return Ok(result);
            }
            result.push(reader.read_value()?);
        }
    }
}

impl fmt::Display for Sx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print())
    }
}

fn print_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Characters that may appear in a symbol
fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | ';')
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else if ch == ';' {
                // Line comment
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn read_value(&mut self) -> Result<Sx, SxError> {
        match self.peek() {
            None => Err(SxError::UnexpectedEnd(self.pos)),
            Some('(') => self.read_list(),
            Some('"') => self.read_string(),
            Some(')') => Err(SxError::UnexpectedChar {
                offset: self.pos,
                found: ')',
            }),
            Some(_) => self.read_atom(),
        }
    }

    fn read_list(&mut self) -> Result<Sx, SxError> {
        self.bump();
        let mut elems = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(SxError::UnexpectedEnd(self.pos)),
                Some(')') => {
                    self.bump();
                    return Ok(Sx::List(elems));
                }
                Some(_) => elems.push(self.read_value()?),
            }
        }
    }

    fn read_string(&mut self) -> Result<Sx, SxError> {
        self.bump();
        let mut s = String::new();
        loop {
            let start = self.pos;
            match self.bump() {
                None => return Err(SxError::UnexpectedEnd(self.pos)),
                Some('"') => return Ok(Sx::String(s)),
                Some('\\') => match self.bump() {
                    Some('"') => s.push('"'),
                    Some('\\') => s.push('\\'),
                    Some('n') => s.push('\n'),
                    Some('r') => s.push('\r'),
                    Some('t') => s.push('\t'),
                    Some('u') => {
                        let hex_start = self.pos;
                        let hex_end = hex_start + 4;
                        let hex = self
                            .src
                            .get(hex_start..hex_end)
                            .ok_or(SxError::InvalidEscape(start))?;
                        let code = u32::from_str_radix(hex, 16)
                            .map_err(|_| SxError::InvalidEscape(start))?;
                        let ch = char::from_u32(code).ok_or(SxError::InvalidEscape(start))?;
                        s.push(ch);
                        self.pos = hex_end;
                    }
                    Some(_) => return Err(SxError::InvalidEscape(start)),
                    None => return Err(SxError::UnexpectedEnd(self.pos)),
                },
                Some(c) => s.push(c),
            }
        }
    }

    fn read_atom(&mut self) -> Result<Sx, SxError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !is_symbol_char(ch) {
                break;
            }
            self.bump();
        }
        let text = &self.src[start..self.pos];
        if text.is_empty() {
            let found = self.peek().unwrap_or(' ');
            return Err(SxError::UnexpectedChar {
                offset: start,
                found,
            });
        }
        let digits = text.strip_prefix('-').unwrap_or(text);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return text
                .parse::<i64>()
                .map(Sx::Int)
                .map_err(|_| SxError::IntOutOfRange(start));
        }
        Ok(Sx::Symbol(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_print_nested() {
        let sx = Sx::List(vec![
            Sx::symbol("BLOCK"),
            Sx::List(vec![
                Sx::symbol("PARA"),
                Sx::List(vec![Sx::symbol("TEXT"), Sx::string("hi")]),
            ]),
        ]);
        assert_eq!(sx.print(), r#"(BLOCK (PARA (TEXT "hi")))"#);
    }

    #[test]
    fn test_read_heading() {
        let sx = Sx::read(r#"(HEADING 1 () "slug" "frag" (TEXT "Heading"))"#).unwrap();
        let list = sx.as_list().unwrap();
        assert_eq!(sx.tag(), Some("HEADING"));
        assert_eq!(list[1], Sx::Int(1));
        assert!(list[2].is_nil());
        assert_eq!(list[3].as_str(), Some("slug"));
    }

    #[test]
    fn test_string_escapes_roundtrip() {
        let sx = Sx::string("a \"quoted\"\\ line\nnext\ttab\u{1}");
        let printed = sx.print();
        assert_eq!(printed, r#""a \"quoted\"\\ line\nnext\ttab\u0001""#);
        assert_eq!(Sx::read(&printed).unwrap(), sx);
    }

    #[test]
    fn test_negative_int_and_symbol() {
        assert_eq!(Sx::read("-12").unwrap(), Sx::Int(-12));
        assert_eq!(Sx::read("-").unwrap(), Sx::symbol("-"));
        assert_eq!(Sx::read("@H").unwrap(), Sx::symbol("@H"));
    }

    #[test]
    fn test_errors() {
        assert_eq!(Sx::read("(A"), Err(SxError::UnexpectedEnd(2)));
        assert!(matches!(Sx::read(")"), Err(SxError::UnexpectedChar { .. })));
        assert_eq!(Sx::read("A B"), Err(SxError::TrailingInput(2)));
        assert!(matches!(
            Sx::read("99999999999999999999"),
            Err(SxError::IntOutOfRange(0))
        ));
    }

    #[test]
    fn test_comments_skipped() {
        let all = Sx::read_all("; header\n(A) ; trailing\n(B)").unwrap();
        assert_eq!(all.len(), 2);
    }
}
