//! Display width helpers.
//!
//! `char_width` is the default width function used by the renderer to turn
//! buffer chars into terminal columns. The renderer accepts any `fn(char) ->
//! usize`, so hosts with different expectations (e.g. treating every char
//! as a single cell) can swap it out.
//!
//! Invariants:
//! - Control chars report width 0; they are never inserted by the editor but
//!   may arrive through a host calling `insert` directly.
//! - Truncation never splits a grapheme cluster.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Suffix appended by [`truncate_with_ellipsis`].
pub const ELLIPSIS: &str = "...";

/// Terminal column width of a single char.
#[inline]
pub fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

/// Width every char as one cell (matches terminals without wide-glyph support).
#[inline]
pub fn unit_width(c: char) -> usize {
    usize::from(c != '\n')
}

/// Terminal column width of a string.
#[inline]
pub fn str_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Shorten `s` so that it fits in `max_width` columns, replacing the tail with
/// [`ELLIPSIS`]. Strings that already fit are returned unchanged. When even the
/// ellipsis does not fit, the result is as many leading clusters as fit.
pub fn truncate_with_ellipsis(s: &str, max_width: usize) -> String {
    if str_width(s) <= max_width {
        return s.to_string();
    }
    let ellipsis_width = str_width(ELLIPSIS);
    let budget = max_width.saturating_sub(ellipsis_width);
    let mut out = String::new();
    let mut used = 0usize;
    for g in s.graphemes(true) {
        let w = str_width(g);
        if used + w > budget {
            break;
        }
        out.push_str(g);
        used += w;
    }
    if max_width >= ellipsis_width {
        out.push_str(ELLIPSIS);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii() {
        assert_eq!(char_width('a'), 1);
    }

    #[test]
    fn wide_cjk() {
        assert_eq!(char_width('界'), 2);
        assert_eq!(str_width("界a"), 3);
    }

    #[test]
    fn control_is_zero() {
        assert_eq!(char_width('\u{1b}'), 0);
    }

    #[test]
    fn truncation_keeps_short_strings() {
        assert_eq!(truncate_with_ellipsis("init", 10), "init");
    }

    #[test]
    fn truncation_appends_ellipsis_within_budget() {
        let t = truncate_with_ellipsis("a-very-long-candidate", 10);
        assert_eq!(t, "a-very-...");
        assert_eq!(str_width(&t), 10);
    }

    #[test]
    fn truncation_never_splits_wide_glyphs() {
        let t = truncate_with_ellipsis("界界界界", 6);
        assert_eq!(t, "界...");
    }
}
