//! Terminal backend abstraction and crossterm implementation.
//!
//! A line editor shares the screen with the host's previous output: the
//! backend only toggles raw mode and bracketed paste and never enters the
//! alternate screen.

use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, is_raw_mode_enabled},
};
use std::io::stdout;
use tracing::{debug, warn};

pub mod viewport;
pub use viewport::Viewport;

/// Switches the terminal between cooked and raw input for one read.
pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn is_entered(&self) -> bool;
}

pub struct CrosstermBackend {
    entered: bool,
    bracketed_paste: bool,
    // Raw mode was already on before we entered; leave it on.
    inherited_raw: bool,
}

/// Leaves the backend when dropped, including on early return or unwind.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self {
            entered: false,
            bracketed_paste: true,
            inherited_raw: false,
        }
    }

    /// Paste arrives as individual key events when disabled.
    pub fn with_bracketed_paste(mut self, enabled: bool) -> Self {
        self.bracketed_paste = enabled;
        self
    }

    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard { backend: self })
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if self.entered {
            return Ok(());
        }
        self.inherited_raw = is_raw_mode_enabled().unwrap_or(false);
        if !self.inherited_raw {
            enable_raw_mode()?;
        }
        if self.bracketed_paste {
            execute!(stdout(), EnableBracketedPaste)?;
        }
        self.entered = true;
        debug!(
            target: "terminal",
            inherited_raw = self.inherited_raw,
            bracketed_paste = self.bracketed_paste,
            "raw_mode_entered"
        );
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if !self.entered {
            return Ok(());
        }
        self.entered = false;
        if self.bracketed_paste {
            execute!(stdout(), DisableBracketedPaste)?;
        }
        if !self.inherited_raw {
            disable_raw_mode()?;
        }
        debug!(target: "terminal", "raw_mode_left");
        Ok(())
    }

    fn is_entered(&self) -> bool {
        self.entered
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        if let Err(err) = self.leave() {
            warn!(target: "terminal", error = %err, "restore_failed");
        }
    }
}

impl TerminalGuard<'_> {
    pub fn backend(&self) -> &CrosstermBackend {
        self.backend
    }
}

impl Drop for TerminalGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.backend.leave() {
            warn!(target: "terminal", error = %err, "restore_failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_backend_is_not_entered() {
        let backend = CrosstermBackend::new().with_bracketed_paste(false);
        assert!(!backend.is_entered());
        assert!(!backend.bracketed_paste);
    }

    #[test]
    fn leave_without_enter_is_a_no_op() {
        let mut backend = CrosstermBackend::default();
        backend.leave().unwrap();
        assert!(!backend.is_entered());
    }
}
