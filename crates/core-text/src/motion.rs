//! Caret motion helpers.
//!
//! These operate purely on a `LineBuffer` + caret index pair and are free of
//! screen state. Word boundaries come from a caller supplied separator set;
//! a line break always counts as a separator.

use crate::LineBuffer;

/// Separator set used when the caller does not configure one.
pub const DEFAULT_WORD_SEPARATORS: &[char] = &[' '];

fn is_separator(c: char, separators: &[char]) -> bool {
    c == '\n' || separators.contains(&c)
}

/// Index reached by moving left over any separators, then over the word
/// before them. Returns 0 when no word precedes the caret.
pub fn word_left(buf: &LineBuffer, caret: usize, separators: &[char]) -> usize {
    let chars = buf.as_chars();
    let mut pos = buf.clamp(caret);
    while pos > 0 && is_separator(chars[pos - 1], separators) {
        pos -= 1;
    }
    while pos > 0 && !is_separator(chars[pos - 1], separators) {
        pos -= 1;
    }
    pos
}

/// Index reached by moving right over any separators, then to the end of the
/// following word.
pub fn word_right(buf: &LineBuffer, caret: usize, separators: &[char]) -> usize {
    let chars = buf.as_chars();
    let len = chars.len();
    let mut pos = buf.clamp(caret);
    while pos < len && is_separator(chars[pos], separators) {
        pos += 1;
    }
    while pos < len && !is_separator(chars[pos], separators) {
        pos += 1;
    }
    pos
}

/// Target index for moving the caret one logical line up, keeping the column
/// offset where the previous line is long enough. On the first line the caret
/// goes to the buffer start.
pub fn line_up(buf: &LineBuffer, caret: usize) -> usize {
    let caret = buf.clamp(caret);
    let start = buf.line_start(caret);
    if start == 0 {
        return 0;
    }
    let prev_end = start - 1;
    let prev_start = buf.line_start(prev_end);
    (prev_start + (caret - start)).min(prev_end)
}

/// Target index for moving the caret one logical line down, keeping the column
/// offset where the next line is long enough. On the last line the caret goes
/// to the buffer end.
pub fn line_down(buf: &LineBuffer, caret: usize) -> usize {
    let caret = buf.clamp(caret);
    let end = buf.line_end(caret);
    if end == buf.len() {
        return buf.len();
    }
    let next_start = end + 1;
    let next_end = buf.line_end(next_start);
    (next_start + (caret - buf.line_start(caret))).min(next_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_left_twice_reaches_start() {
        let b = LineBuffer::from("hello world");
        let first = word_left(&b, b.len(), DEFAULT_WORD_SEPARATORS);
        assert_eq!(first, 6);
        assert_eq!(word_left(&b, first, DEFAULT_WORD_SEPARATORS), 0);
        assert_eq!(word_left(&b, 0, DEFAULT_WORD_SEPARATORS), 0);
    }

    #[test]
    fn word_right_stops_at_word_end() {
        let b = LineBuffer::from("hello  world");
        assert_eq!(word_right(&b, 0, DEFAULT_WORD_SEPARATORS), 5);
        assert_eq!(word_right(&b, 5, DEFAULT_WORD_SEPARATORS), 12);
        assert_eq!(word_right(&b, 12, DEFAULT_WORD_SEPARATORS), 12);
    }

    #[test]
    fn custom_separators() {
        let b = LineBuffer::from("src/core/lib.rs");
        let seps = ['/', '.'];
        assert_eq!(word_left(&b, b.len(), &seps), 13);
        assert_eq!(word_left(&b, 13, &seps), 9);
        assert_eq!(word_right(&b, 0, &seps), 3);
    }

    #[test]
    fn line_break_is_a_word_boundary() {
        let b = LineBuffer::from("one\ntwo");
        assert_eq!(word_left(&b, b.len(), &[]), 4);
    }

    #[test]
    fn vertical_motion_keeps_column() {
        let b = LineBuffer::from("line1\nline2");
        assert_eq!(line_down(&b, 3), 9);
        assert_eq!(line_up(&b, 9), 3);
        assert_eq!(line_up(&b, 3), 0);
        assert_eq!(line_down(&b, 9), b.len());
    }

    #[test]
    fn vertical_motion_clamps_to_shorter_line() {
        let b = LineBuffer::from("a\nlonger");
        assert_eq!(line_up(&b, 7), 1, "clamped to end of 'a'");
        assert_eq!(line_down(&b, 1), 3);
    }
}
