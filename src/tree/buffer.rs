//! Append-only character store shared by every text in a tree
//!
//! Texts are concatenated back to back, each one already ending in its
//! unit's terminator. A [`TextSpan`] per text maps buffer positions back to
//! `(unit, text, offset)` triples.

use super::types::*;
use std::ops::Range;

/// Boundary of one inserted text in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan {
    /// Unit the text belongs to
    pub unit: UnitId,
    /// Insertion number of the text
    pub text_nr: TextNr,
    /// Start position in the buffer (inclusive)
    pub start: TextPosition,
    /// End position in the buffer (exclusive, after the terminator)
    pub end: TextPosition,
}

impl TextSpan {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Resolve an absolute buffer position inside this span
    #[inline]
    pub fn pattern_info(&self, pos: TextPosition) -> PatternInfo {
        PatternInfo {
            type_nr: self.unit,
            pattern_nr: self.text_nr,
            start_pos: pos - self.start,
        }
    }
}

/// Append-only text store; positions never move
#[derive(Debug, Default, Clone)]
pub struct TextBuffer {
    chars: Vec<char>,
    spans: Vec<TextSpan>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of characters appended so far; this is the tree's global position
    #[inline]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[inline]
    pub fn char_at(&self, pos: TextPosition) -> char {
        self.chars[pos]
    }

    #[inline]
    pub fn get(&self, pos: TextPosition) -> Option<char> {
        self.chars.get(pos).copied()
    }

    #[inline]
    pub fn slice(&self, range: Range<TextPosition>) -> &[char] {
        &self.chars[range]
    }

    /// All characters as one slice
    #[inline]
    pub fn as_slice(&self) -> &[char] {
        &self.chars
    }

    /// Open a new span at the current end of the buffer
    pub(crate) fn begin_text(&mut self, unit: UnitId, text_nr: TextNr, len: usize) -> TextSpan {
        let start = self.chars.len();
        let span = TextSpan {
            unit,
            text_nr,
            start,
            end: start + len,
        };
        self.chars.reserve(len);
        self.spans.push(span);
        span
    }

    #[inline]
    pub(crate) fn push(&mut self, ch: char) {
        self.chars.push(ch);
    }

    pub(crate) fn extend_from_slice(&mut self, chars: &[char]) {
        self.chars.extend_from_slice(chars);
    }

    /// Spans of all texts, in insertion order
    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    /// Span of a text by insertion number
    pub fn span(&self, text_nr: TextNr) -> Option<&TextSpan> {
        self.spans.get(text_nr as usize)
    }

    /// Find the text containing a buffer position using binary search
    pub fn span_of(&self, pos: TextPosition) -> Option<&TextSpan> {
        let idx = self
            .spans
            .binary_search_by(|s| {
                if pos < s.start {
                    std::cmp::Ordering::Greater
                } else if pos >= s.end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()?;
        Some(&self.spans[idx])
    }

    /// Characters of one text, terminator included
    pub fn text(&self, text_nr: TextNr) -> Option<&[char]> {
        self.span(text_nr).map(|s| &self.chars[s.start..s.end.min(self.chars.len())])
    }

    /// Render a range as a `String`
    pub fn render(&self, range: Range<TextPosition>) -> String {
        self.chars[range].iter().collect()
    }
}
