//! Caret index to screen coordinate mapping.
//!
//! Positions are relative to the row the input starts on (row 0) and use
//! absolute columns. The scan is a single left-to-right pass over the chars
//! preceding the index:
//! * `'\n'` moves to the next row at `input_start` (continuation rows are
//!   indented to line up with the first row).
//! * A glyph too wide for the remaining columns wraps to column 0 of the next
//!   row before it is placed.
//! * A glyph that exactly fills the last column leaves the position at
//!   column 0 of the next row, mirroring where the terminal puts the next
//!   printed glyph.
//!
//! Zero-width chars (combining marks) never move the position.

use core_terminal::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub struct ScreenPos {
    pub row: usize,
    pub col: usize,
}

impl ScreenPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Position of the first char of the buffer.
    pub fn origin(vp: &Viewport) -> Self {
        Self::new(0, vp.input_start as usize)
    }
}

/// Advance `pos` past one displayed char.
pub fn advance(pos: ScreenPos, c: char, vp: &Viewport, width_of: fn(char) -> usize) -> ScreenPos {
    if c == '\n' {
        return ScreenPos::new(pos.row + 1, vp.input_start as usize);
    }
    let w = width_of(c);
    if w == 0 {
        return pos;
    }
    let width = vp.width as usize;
    let mut next = pos;
    if next.col + w > width && next.col > 0 {
        next = ScreenPos::new(next.row + 1, 0);
    }
    next.col += w;
    if next.col >= width {
        next = ScreenPos::new(next.row + 1, 0);
    }
    next
}

/// Position reached after displaying `chars` from the origin.
pub fn position_after<I>(chars: I, vp: &Viewport, width_of: fn(char) -> usize) -> ScreenPos
where
    I: IntoIterator<Item = char>,
{
    chars
        .into_iter()
        .fold(ScreenPos::origin(vp), |pos, c| advance(pos, c, vp, width_of))
}
