//! Line history: the collaborator trait consulted by the dispatcher and the
//! in-memory, session-scoped store owned by each line editor.
//!
//! Navigation model: entries are indexed oldest first and the cursor ranges
//! over `0..=len`, where `len` is the fresh line being typed. Leaving the
//! fresh line stashes its text as a draft so coming back down restores it.

use tracing::{debug, trace};

/// History source queried on Up/Down when the caret is not moving inside a
/// multi-line buffer. `None` means there is no further entry in that
/// direction and the buffer is left untouched.
pub trait History {
    fn previous(&mut self, current: &str, caret: usize) -> Option<String>;

    /// `was_edited` reports whether the line was typed into since it was last
    /// loaded, in which case it is treated as a provisional entry.
    fn next(&mut self, current: &str, caret: usize, was_edited: bool) -> Option<String>;

    /// Reset navigation state at the start of a read.
    fn begin_session(&mut self) {}
}

#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    entries: Vec<String>,
    cursor: usize,
    draft: Option<String>,
    /// 0 keeps every entry.
    max_entries: usize,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::default()
        }
    }

    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries;
        self.evict();
        self.cursor = self.entries.len();
    }

    /// Append a submitted line, evicting the oldest entry once the bound is
    /// reached. Navigation restarts from the fresh line.
    pub fn add(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
        let evicted = self.evict();
        self.cursor = self.entries.len();
        self.draft = None;
        debug!(target: "history", len = self.entries.len(), evicted, "entry_added");
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.draft = None;
        debug!(target: "history", "cleared");
    }

    fn evict(&mut self) -> usize {
        if self.max_entries == 0 || self.entries.len() <= self.max_entries {
            return 0;
        }
        let excess = self.entries.len() - self.max_entries;
        self.entries.drain(..excess);
        excess
    }

    fn at_fresh_line(&self) -> bool {
        self.cursor >= self.entries.len()
    }
}

impl<S: Into<String>> Extend<S> for SessionHistory {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for line in iter {
            self.add(line);
        }
    }
}

impl History for SessionHistory {
    fn previous(&mut self, current: &str, _caret: usize) -> Option<String> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        if self.at_fresh_line() {
            self.draft = Some(current.to_string());
            self.cursor = self.entries.len();
        }
        self.cursor -= 1;
        trace!(target: "history", cursor = self.cursor, len = self.entries.len(), "previous");
        self.entries.get(self.cursor).cloned()
    }

    fn next(&mut self, current: &str, _caret: usize, was_edited: bool) -> Option<String> {
        if was_edited {
            self.draft = Some(current.to_string());
            self.cursor = self.entries.len();
            trace!(target: "history", draft_len = current.chars().count(), "edited_line_adopted");
            return None;
        }
        if self.at_fresh_line() {
            return None;
        }
        self.cursor += 1;
        trace!(target: "history", cursor = self.cursor, len = self.entries.len(), "next");
        if self.at_fresh_line() {
            Some(self.draft.clone().unwrap_or_default())
        } else {
            self.entries.get(self.cursor).cloned()
        }
    }

    fn begin_session(&mut self) {
        self.cursor = self.entries.len();
        self.draft = None;
    }
}
