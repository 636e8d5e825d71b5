//! Terminal command buffer.
//!
//! Every renderer operation collects its escape sequences into a `Writer` and
//! flushes them in one go, so a multi-step redraw reaches the terminal as a
//! single write.
//!
//! Invariants:
//! * Commands preserve ordering; nothing is flushed mid-operation.
//! * Movement is relative (`nA`/`nB`/`nC`/`nD`). Absolute positioning is only
//!   used after a full screen clear.
//! * Zero-distance moves and empty prints are never recorded.
//! * Line breaks are `\r\n`: raw mode disables output post-processing.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveDown, MoveLeft, MoveRight, MoveTo, MoveToColumn, MoveUp, Show},
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::Write;

use crate::geometry::ScreenPos;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Up(u16),
    Down(u16),
    Forward(u16),
    Back(u16),
    ColumnStart,
    ClearToEol,
    HideCursor,
    ShowCursor,
    LineBreak,
    ClearScreen,
    Print(String),
}

fn distance(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    pub fn up(&mut self, n: usize) {
        if n > 0 {
            self.cmds.push(Command::Up(distance(n)));
        }
    }

    pub fn down(&mut self, n: usize) {
        if n > 0 {
            self.cmds.push(Command::Down(distance(n)));
        }
    }

    pub fn forward(&mut self, n: usize) {
        if n > 0 {
            self.cmds.push(Command::Forward(distance(n)));
        }
    }

    pub fn back(&mut self, n: usize) {
        if n > 0 {
            self.cmds.push(Command::Back(distance(n)));
        }
    }

    /// Vertical then horizontal delta movement between two cached positions.
    pub fn move_between(&mut self, from: ScreenPos, to: ScreenPos) {
        if to.row > from.row {
            self.down(to.row - from.row);
        } else {
            self.up(from.row - to.row);
        }
        if to.col > from.col {
            self.forward(to.col - from.col);
        } else {
            self.back(from.col - to.col);
        }
    }

    pub fn column_start(&mut self) {
        self.cmds.push(Command::ColumnStart);
    }

    pub fn clear_to_eol(&mut self) {
        self.cmds.push(Command::ClearToEol);
    }

    pub fn hide_cursor(&mut self) {
        self.cmds.push(Command::HideCursor);
    }

    pub fn show_cursor(&mut self) {
        self.cmds.push(Command::ShowCursor);
    }

    pub fn line_break(&mut self) {
        self.cmds.push(Command::LineBreak);
    }

    pub fn clear_screen(&mut self) {
        self.cmds.push(Command::ClearScreen);
    }

    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }

    /// Emit all commands into `out` and flush it.
    pub fn flush_to<W: Write>(self, out: &mut W) -> Result<()> {
        if self.cmds.is_empty() {
            return Ok(());
        }
        for c in self.cmds {
            match c {
                Command::Up(n) => queue!(out, MoveUp(n))?,
                Command::Down(n) => queue!(out, MoveDown(n))?,
                Command::Forward(n) => queue!(out, MoveRight(n))?,
                Command::Back(n) => queue!(out, MoveLeft(n))?,
                Command::ColumnStart => queue!(out, MoveToColumn(0))?,
                Command::ClearToEol => queue!(out, Clear(ClearType::UntilNewLine))?,
                Command::HideCursor => queue!(out, Hide)?,
                Command::ShowCursor => queue!(out, Show)?,
                Command::LineBreak => queue!(out, Print("\r\n"))?,
                Command::ClearScreen => queue!(out, Clear(ClearType::All), MoveTo(0, 0))?,
                Command::Print(s) => queue!(out, Print(s))?,
            }
        }
        out.flush()?;
        Ok(())
    }
}
