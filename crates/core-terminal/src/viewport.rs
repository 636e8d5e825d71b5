//! Viewport geometry for one read session.
//!
//! Geometry is read once when a session starts and treated as immutable until
//! the line is submitted; live resize is not tracked.
//!
//! Current guarantees:
//! * `input_start` is the column where the first char of the buffer lands
//!   (the column right after the prompt). Rows after an embedded line break
//!   are indented to this column as well; rows produced by wrapping start at 0.
//! * `width` is at least 2 so that wrap arithmetic (`width - 1`) always has a
//!   usable column, and `input_start < width`.

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub input_start: u16,
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(input_start: u16, width: u16, height: u16) -> Self {
        let width = width.max(2);
        Self {
            input_start: input_start.min(width - 1),
            width,
            height: height.max(1),
        }
    }

    /// Read the terminal size and the current cursor column (raw mode must be
    /// active for the cursor position query to succeed).
    pub fn probe() -> Result<Self> {
        let (width, height) = crossterm::terminal::size()?;
        let (column, _row) = crossterm::cursor::position()?;
        let vp = Self::new(column, width, height);
        tracing::debug!(
            target: "terminal",
            input_start = vp.input_start,
            width = vp.width,
            height = vp.height,
            "viewport_probed"
        );
        Ok(vp)
    }
}
