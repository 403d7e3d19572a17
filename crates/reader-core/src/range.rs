//! Character-offset ranges over the source text.
//!
//! All offsets in this crate are Unicode scalar values (chars), not bytes or
//! UTF-16 code units. Platform layers convert before handing ranges over.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::AnnotateError;

/// A validated `[start, end)` range over one source text, with a cached copy
/// of the text it covers.
///
/// The cached `text` is checked against the source at construction and never
/// re-derived, so it stays meaningful for display after the source moves on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTextRange")]
pub struct TextRange {
    start: usize,
    end: usize,
    text: SmolStr,
}

/// Unchecked wire form of [`TextRange`].
#[derive(Deserialize)]
struct RawTextRange {
    start: usize,
    end: usize,
    text: SmolStr,
}

impl TryFrom<RawTextRange> for TextRange {
    type Error = AnnotateError;

    /// Only the shape can be checked here; callers holding the source text
    /// re-check the content with [`TextRange::with_text`].
    fn try_from(raw: RawTextRange) -> Result<Self, Self::Error> {
        let RawTextRange { start, end, text } = raw;
        if start > end || char_len(&text) != end - start {
            return Err(AnnotateError::TextMismatch { start, end });
        }
        Ok(Self { start, end, text })
    }
}

impl TextRange {
    /// Build a range by slicing `source`.
    pub fn from_source(source: &str, start: usize, end: usize) -> Result<Self, AnnotateError> {
        let text = char_slice(source, start..end).ok_or_else(|| AnnotateError::OutOfBounds {
            start,
            end,
            len: char_len(source),
        })?;
        Ok(Self {
            start,
            end,
            text: SmolStr::new(text),
        })
    }

    /// Build a range from offsets plus the text a platform reported for them.
    ///
    /// Fails if the reported text does not match `source` at those offsets.
    pub fn with_text(
        source: &str,
        start: usize,
        end: usize,
        text: &str,
    ) -> Result<Self, AnnotateError> {
        let range = Self::from_source(source, start, end)?;
        if range.text != text {
            return Err(AnnotateError::TextMismatch { start, end });
        }
        Ok(range)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the covered text is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Same start and end, regardless of cached text.
    pub fn same_bounds(&self, other: &TextRange) -> bool {
        self.start == other.start && self.end == other.end
    }

    /// Whether `[a, b)` lies entirely inside this range.
    pub fn covers(&self, a: usize, b: usize) -> bool {
        self.start <= a && b <= self.end
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Length of `s` in chars.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Slice `s` by char offsets. Returns `None` if the range is inverted or runs
/// past the end.
pub fn char_slice(s: &str, range: Range<usize>) -> Option<&str> {
    if range.start > range.end {
        return None;
    }
    let start = char_to_byte(s, range.start)?;
    let end = start + char_to_byte(&s[start..], range.end - range.start)?;
    Some(&s[start..end])
}

/// Convert a char offset to a byte offset. `offset == char_len(s)` maps to
/// `s.len()`.
pub fn char_to_byte(s: &str, offset: usize) -> Option<usize> {
    if offset == 0 {
        return Some(0);
    }
    match s.char_indices().nth(offset) {
        Some((byte, _)) => Some(byte),
        None if char_len(s) == offset => Some(s.len()),
        None => None,
    }
}
