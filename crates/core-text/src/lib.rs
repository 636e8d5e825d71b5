//! Char-indexed line buffer used by the line editor.
//!
//! Every index in this crate is a char index into the buffer, never a byte
//! offset. All range arguments are clamped into `[0, len]`; out-of-range input
//! degrades to the nearest valid range (or a no-op) instead of panicking.

use std::fmt;
use std::ops::Range;

pub mod motion;
pub mod segment;
pub mod width;

// Re-export width helpers for callers that already depend on core-text.
pub use width::{char_width, str_width, unit_width};

/// Growable owned text buffer. May contain embedded `'\n'` for multi-line input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    chars: Vec<char>,
}

impl From<&str> for LineBuffer {
    fn from(value: &str) -> Self {
        Self {
            chars: value.chars().collect(),
        }
    }
}

impl fmt::Display for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            fmt::Write::write_char(f, *c)?;
        }
        Ok(())
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }

    /// Clamp an index into `[0, len]`.
    pub fn clamp(&self, idx: usize) -> usize {
        idx.min(self.chars.len())
    }

    fn clamp_range(&self, range: Range<usize>) -> Range<usize> {
        let end = self.clamp(range.end);
        let start = range.start.min(end);
        start..end
    }

    /// Splice `text` in at `at` (clamped). Returns the number of chars inserted.
    pub fn insert_str(&mut self, at: usize, text: &str) -> usize {
        let at = self.clamp(at);
        let before = self.chars.len();
        self.chars.splice(at..at, text.chars());
        self.chars.len() - before
    }

    /// Remove the chars in `range` (clamped). Returns the number of chars removed.
    pub fn remove_range(&mut self, range: Range<usize>) -> usize {
        let r = self.clamp_range(range);
        let n = r.len();
        self.chars.drain(r);
        n
    }

    /// Replace the entire content.
    pub fn replace(&mut self, text: &str) {
        self.chars.clear();
        self.chars.extend(text.chars());
    }

    /// Swap two chars; no-op when either index is out of range.
    pub fn swap(&mut self, a: usize, b: usize) {
        if a < self.chars.len() && b < self.chars.len() {
            self.chars.swap(a, b);
        }
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        let suffix: Vec<char> = suffix.chars().collect();
        self.chars.ends_with(&suffix)
    }

    pub fn is_multiline(&self) -> bool {
        self.chars.contains(&'\n')
    }

    /// Start of the logical line containing `idx`: one past the last `'\n'`
    /// strictly before `idx`, or 0. A line break is a boundary and is never part
    /// of the line that follows it.
    pub fn line_start(&self, idx: usize) -> usize {
        let idx = self.clamp(idx);
        self.chars[..idx]
            .iter()
            .rposition(|c| *c == '\n')
            .map_or(0, |p| p + 1)
    }

    /// End of the logical line containing `idx`: index of the next `'\n'` at or
    /// after `idx`, or the buffer length.
    pub fn line_end(&self, idx: usize) -> usize {
        let idx = self.clamp(idx);
        self.chars[idx..]
            .iter()
            .position(|c| *c == '\n')
            .map_or(self.chars.len(), |p| idx + p)
    }
}
