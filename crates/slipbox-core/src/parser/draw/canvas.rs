// SPDX-License-Identifier: AGPL-3.0-or-later
//! Character grid of an ASCII drawing

use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

const TAB_WIDTH: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("control character in line {line}, column {column}")]
    ControlCharacter { line: usize, column: usize },

    #[error("drawing is empty")]
    Empty,
}

/// Grid of grapheme clusters; cells outside the text read as blanks
#[derive(Debug)]
pub struct Canvas<'a> {
    rows: Vec<Vec<&'a str>>,
    width: usize,
}

impl<'a> Canvas<'a> {
    pub fn parse(text: &'a str) -> Result<Self, DrawError> {
        let mut rows = Vec::new();
        for (idx, line) in text.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let mut row: Vec<&'a str> = Vec::new();
            for grapheme in line.graphemes(true) {
                if grapheme == "\t" {
                    let pad = TAB_WIDTH - row.len() % TAB_WIDTH;
                    row.extend(std::iter::repeat(" ").take(pad));
                    continue;
                }
                if grapheme.chars().any(char::is_control) {
                    return Err(DrawError::ControlCharacter {
                        line: idx + 1,
                        column: row.len() + 1,
                    });
                }
                row.push(grapheme);
            }
            while row.last() == Some(&" ") {
                row.pop();
            }
            rows.push(row);
        }
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Ok(Self { rows, width })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn at(&self, x: isize, y: isize) -> &'a str {
        if x < 0 || y < 0 {
            return " ";
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .unwrap_or(" ")
    }
}
