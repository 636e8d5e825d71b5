//! Screen model: the edited buffer, its caret, and the screen position the
//! terminal cursor is known to be at.
//!
//! Invariants (hold after every public call):
//! * `caret <= text.len()`.
//! * `pos == position_of(caret)`: the cached screen position is always
//!   recomputed from buffer content, never read back from the terminal.
//! * `previous_render_row` is the last row the buffer occupied on screen, so
//!   a shorter render can erase the rows it no longer covers.
//!
//! Content changes redraw from the first affected index to the end of the
//! buffer. With a highlighter installed the whole buffer is re-emitted since
//! highlighting of a span may depend on what precedes it.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use core_terminal::Viewport;
use core_text::{LineBuffer, char_width, motion};
use tracing::trace;

use crate::geometry::{self, ScreenPos};
use crate::style::Highlighter;
use crate::writer::Writer;

/// How buffer chars are echoed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Echo {
    #[default]
    Plain,
    /// Every glyph is shown as the mask char; line breaks are kept.
    Masked(char),
    /// Nothing is echoed; the terminal cursor never moves.
    Hidden,
}

pub struct Renderer<W: Write> {
    out: W,
    viewport: Viewport,
    text: LineBuffer,
    caret: usize,
    pos: ScreenPos,
    caret_visible: bool,
    previous_render_row: usize,
    highlighter: Option<Arc<dyn Highlighter>>,
    width_of: fn(char) -> usize,
    echo: Echo,
    prompt: Option<String>,
}

impl<W: Write> Renderer<W> {
    /// The terminal cursor is assumed to sit at `viewport.input_start` on the
    /// current row, right after the prompt.
    pub fn new(out: W, viewport: Viewport) -> Self {
        Self {
            out,
            viewport,
            text: LineBuffer::new(),
            caret: 0,
            pos: ScreenPos::origin(&viewport),
            caret_visible: true,
            previous_render_row: 0,
            highlighter: None,
            width_of: char_width,
            echo: Echo::Plain,
            prompt: None,
        }
    }

    /// Prompt reprinted by [`Renderer::clear_screen`].
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn set_highlighter(&mut self, highlighter: Option<Arc<dyn Highlighter>>) {
        self.highlighter = highlighter;
    }

    pub fn set_echo(&mut self, echo: Echo) {
        self.echo = echo;
        self.pos = self.position_of(self.caret);
    }

    pub fn set_width_fn(&mut self, width_of: fn(char) -> usize) {
        self.width_of = width_of;
        self.pos = self.position_of(self.caret);
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.text
    }

    pub fn text(&self) -> String {
        self.text.to_string()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn caret_visible(&self) -> bool {
        self.caret_visible
    }

    pub fn screen_position(&self) -> ScreenPos {
        self.pos
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Screen position of `index` (clamped) under the current buffer.
    pub fn position_of(&self, index: usize) -> ScreenPos {
        let index = self.text.clamp(index);
        geometry::position_after(
            self.text.as_chars()[..index]
                .iter()
                .filter_map(|c| self.display_char(*c)),
            &self.viewport,
            self.width_of,
        )
    }

    /// Row of the last buffer position, relative to the first input row.
    pub fn last_input_row(&self) -> usize {
        self.position_of(self.text.len()).row
    }

    /// Splice `input` in at the caret and leave the caret after it.
    pub fn insert(&mut self, input: &str) -> Result<()> {
        let at = self.caret;
        let n = self.text.insert_str(at, input);
        if n == 0 {
            return Ok(());
        }
        let mut w = self.begin();
        let from = self.redraw_origin(at);
        self.emit_tail(&mut w, from);
        self.emit_move(&mut w, at + n);
        trace!(target: "render", at, inserted = n, len = self.text.len(), "insert");
        self.commit(w)
    }

    /// Delete up to `count` chars before the caret.
    pub fn remove_left(&mut self, count: usize) -> Result<()> {
        let count = count.min(self.caret);
        if count == 0 {
            return Ok(());
        }
        let start = self.caret - count;
        self.text.remove_range(start..self.caret);
        self.redraw_after_removal(start, count)
    }

    /// Delete up to `count` chars after the caret.
    pub fn remove_right(&mut self, count: usize) -> Result<()> {
        let at = self.caret;
        let count = count.min(self.text.len().saturating_sub(at));
        if count == 0 {
            return Ok(());
        }
        self.text.remove_range(at..at + count);
        self.redraw_after_removal(at, count)
    }

    /// Exchange the chars at `a` and `b`, keeping the caret index. No-op when
    /// either index is out of range.
    pub fn swap_chars(&mut self, a: usize, b: usize) -> Result<()> {
        let len = self.text.len();
        if a == b || a >= len || b >= len {
            return Ok(());
        }
        self.text.swap(a, b);
        let caret = self.caret;
        let mut w = self.begin();
        let from = self.redraw_origin(a.min(b));
        self.emit_tail(&mut w, from);
        self.emit_move(&mut w, caret);
        trace!(target: "render", a, b, "swap");
        self.commit(w)
    }

    /// Remove from `from` (default: start of the current logical line) up to
    /// the caret. `from` is clamped into `[line_start, caret]`; the line break
    /// ending the previous line is never removed.
    pub fn clear_line_left(&mut self, from: Option<usize>) -> Result<()> {
        let start = self.text.line_start(self.caret);
        let from = from.map_or(start, |i| i.clamp(start, self.caret));
        let count = self.caret - from;
        if count == 0 {
            return Ok(());
        }
        self.text.remove_range(from..self.caret);
        self.redraw_after_removal(from, count)
    }

    /// Remove from the caret (first moved to `from` when given) to the end of
    /// the current logical line. The terminating line break stays.
    pub fn clear_line_right(&mut self, from: Option<usize>) -> Result<()> {
        let mut w = self.begin();
        if let Some(index) = from {
            self.emit_move(&mut w, index);
        }
        let at = self.caret;
        let end = self.text.line_end(at);
        if end > at {
            self.text.remove_range(at..end);
            let origin = self.redraw_origin(at);
            self.emit_tail(&mut w, origin);
            self.emit_move(&mut w, at);
            trace!(target: "render", at, removed = end - at, len = self.text.len(), "remove");
        }
        self.commit(w)
    }

    /// Move the caret with a minimal relative cursor movement.
    pub fn set_caret(&mut self, index: usize) -> Result<()> {
        let mut w = Writer::new();
        self.emit_move(&mut w, index);
        w.flush_to(&mut self.out)
    }

    pub fn set_caret_visible(&mut self, visible: bool) -> Result<()> {
        if visible == self.caret_visible {
            return Ok(());
        }
        let mut w = Writer::new();
        if visible {
            w.show_cursor();
        } else {
            w.hide_cursor();
        }
        self.caret_visible = visible;
        w.flush_to(&mut self.out)
    }

    pub fn caret_up(&mut self) -> Result<()> {
        let target = motion::line_up(&self.text, self.caret);
        self.set_caret(target)
    }

    pub fn caret_down(&mut self) -> Result<()> {
        let target = motion::line_down(&self.text, self.caret);
        self.set_caret(target)
    }

    /// Replace the whole buffer; the caret ends up at the end.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.text.replace(text);
        let mut w = self.begin();
        self.emit_tail(&mut w, 0);
        trace!(target: "render", len = self.text.len(), "set_text");
        self.commit(w)
    }

    /// Clear the terminal, reprint the prompt and the buffer, and restore the
    /// caret.
    pub fn clear_screen(&mut self) -> Result<()> {
        let caret = self.caret;
        let mut w = self.begin();
        w.clear_screen();
        if let Some(prompt) = &self.prompt {
            for (i, line) in prompt.split('\n').enumerate() {
                if i > 0 {
                    w.line_break();
                }
                w.print(line);
            }
        }
        self.pos = ScreenPos::origin(&self.viewport);
        self.caret = 0;
        self.previous_render_row = 0;
        self.emit_tail(&mut w, 0);
        self.emit_move(&mut w, caret);
        trace!(target: "render", "clear_screen");
        self.commit(w)
    }

    /// Write `lines` on the rows below the last input row, each on a freshly
    /// cleared row, then return to the caret. Lines must fit the viewport
    /// width.
    pub fn write_lines_outside(&mut self, lines: &[String]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        let here = self.pos;
        let below = self.last_input_row().saturating_sub(here.row);
        let mut w = self.begin();
        w.down(below);
        for line in lines {
            w.line_break();
            w.clear_to_eol();
            w.print(line.as_str());
        }
        w.up(below + lines.len());
        w.column_start();
        w.forward(here.col);
        self.commit(w)
    }

    /// Park the cursor after the buffer and move to a fresh line.
    pub fn finish(&mut self) -> Result<()> {
        let mut w = Writer::new();
        self.emit_move(&mut w, self.text.len());
        if !self.caret_visible {
            w.show_cursor();
            self.caret_visible = true;
        }
        w.line_break();
        w.flush_to(&mut self.out)
    }

    fn display_char(&self, c: char) -> Option<char> {
        match self.echo {
            Echo::Plain => Some(c),
            Echo::Masked(mask) if c != '\n' => Some(mask),
            Echo::Masked(_) => Some(c),
            Echo::Hidden => None,
        }
    }

    fn highlighting(&self) -> bool {
        self.highlighter.is_some() && self.echo == Echo::Plain
    }

    fn redraw_origin(&self, from: usize) -> usize {
        if self.highlighting() { 0 } else { from }
    }

    fn redraw_after_removal(&mut self, at: usize, count: usize) -> Result<()> {
        let mut w = self.begin();
        let from = self.redraw_origin(at);
        self.emit_tail(&mut w, from);
        self.emit_move(&mut w, at);
        trace!(target: "render", at, removed = count, len = self.text.len(), "remove");
        self.commit(w)
    }

    fn begin(&self) -> Writer {
        let mut w = Writer::new();
        if self.caret_visible {
            w.hide_cursor();
        }
        w
    }

    fn commit(&mut self, mut w: Writer) -> Result<()> {
        if self.caret_visible {
            w.show_cursor();
        }
        w.flush_to(&mut self.out)
    }

    fn emit_move(&mut self, w: &mut Writer, index: usize) {
        let index = self.text.clamp(index);
        let target = self.position_of(index);
        w.move_between(self.pos, target);
        self.pos = target;
        self.caret = index;
    }

    /// Redraw from `from` to the end of the buffer. Leaves the caret at the
    /// end and erases rows a previous, longer render left behind.
    fn emit_tail(&mut self, w: &mut Writer, from: usize) {
        let from = self.text.clamp(from);
        self.emit_move(w, from);
        let wrap_pending = self.emit_text(w, from);
        let len = self.text.len();
        let end = self.position_of(len);
        if wrap_pending {
            w.line_break();
        }
        w.clear_to_eol();
        self.pos = end;
        self.caret = len;

        if self.previous_render_row > end.row {
            let orphaned = self.previous_render_row - end.row;
            for _ in 0..orphaned {
                w.down(1);
                w.column_start();
                w.clear_to_eol();
            }
            w.up(orphaned);
            w.forward(end.col);
            trace!(target: "render", orphaned, "shrink_cleanup");
        }
        self.previous_render_row = end.row;
    }

    /// Print the buffer from `from`, starting at the cached position of
    /// `from`. Returns true when the last glyph printed filled the last
    /// column.
    ///
    /// The terminal holds the cursor on the last column until the next glyph
    /// arrives, while the position scan already counts the next row. A
    /// logical line that ends that way gets a forced line break before its
    /// row is cleared, so the cursor lands where the scan expects.
    fn emit_text(&self, w: &mut Writer, from: usize) -> bool {
        let display: String = self.text.as_chars()[from..]
            .iter()
            .filter_map(|c| self.display_char(*c))
            .collect();
        if display.is_empty() {
            return false;
        }

        let mut line_fills = Vec::new();
        let mut pos = self.pos;
        let mut filled = false;
        for c in display.chars() {
            let next = geometry::advance(pos, c, &self.viewport, self.width_of);
            if c == '\n' {
                line_fills.push(filled);
                filled = false;
            } else if next != pos {
                filled = next.col == 0;
            }
            pos = next;
        }
        line_fills.push(filled);

        let rendered = match &self.highlighter {
            Some(h) if self.highlighting() => h.highlight(&display),
            _ => display,
        };
        let indent = " ".repeat(self.viewport.input_start as usize);
        for (i, line) in rendered.split('\n').enumerate() {
            if i > 0 {
                if line_fills.get(i - 1).copied().unwrap_or(false) {
                    w.line_break();
                }
                w.clear_to_eol();
                w.line_break();
                w.print(indent.as_str());
            }
            w.print(line);
        }
        line_fills.last().copied().unwrap_or(false)
    }
}
