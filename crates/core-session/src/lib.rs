//! `LineEditor`: an explicit instance owning its history, shortcuts and
//! collaborators, so independent editors can coexist in one process.
//!
//! A read prints the prompt, enters raw mode for the duration of the read,
//! probes the viewport once and feeds key events to a `KeyHandler` until
//! Enter submits the line.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use core_actions::{Binding, CompletionSource, KeyHandler};
use core_config::{Config, EditorSettings};
use core_events::{InputEvent, KeyEvent};
use core_history::{History, SessionHistory};
use core_input::{CrosstermKeySource, KeySource};
use core_keymap::{KeyPress, ShortcutBag};
use core_render::{Echo, Highlighter, ListingLayout, Renderer};
use core_terminal::{CrosstermBackend, Viewport};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("read interrupted")]
    Interrupted,
    #[error("input closed before the line was submitted")]
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadMode {
    Line,
    Password,
}

pub struct LineEditor {
    settings: EditorSettings,
    history: SessionHistory,
    history_enabled: bool,
    completion: Option<Arc<dyn CompletionSource>>,
    highlighter: Option<Arc<dyn Highlighter>>,
    shortcuts: ShortcutBag<Binding>,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineEditor {
    pub fn new() -> Self {
        Self::with_settings(EditorSettings::default())
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        Self {
            history: SessionHistory::with_max_entries(settings.history_max_entries),
            history_enabled: settings.history_enabled,
            settings,
            completion: None,
            highlighter: None,
            shortcuts: ShortcutBag::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_settings(config.settings())
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn add_history<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.history.extend(entries);
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Whether submitted lines are appended to history. Recall of existing
    /// entries works either way.
    pub fn set_history_enabled(&mut self, enabled: bool) {
        self.history_enabled = enabled;
    }

    pub fn set_completion_source(&mut self, source: Option<Arc<dyn CompletionSource>>) {
        self.completion = source;
    }

    pub fn set_highlighter(&mut self, highlighter: Option<Arc<dyn Highlighter>>) {
        self.highlighter = highlighter;
    }

    /// Bind `key` ahead of the built-in table. Returns the binding it replaced.
    pub fn register_shortcut(&mut self, key: KeyPress, binding: impl Into<Binding>) -> Option<Binding> {
        self.shortcuts.insert(key, binding.into())
    }

    /// Read one line from the terminal. A blank line is replaced by `default`
    /// (or the configured default value when `default` is empty).
    pub fn read(&mut self, prompt: &str, default: &str) -> Result<String> {
        self.read_terminal(prompt, default, ReadMode::Line)
    }

    /// Read a secret: masked echo, no history, no completion.
    pub fn read_password(&mut self, prompt: &str) -> Result<String> {
        self.read_terminal(prompt, "", ReadMode::Password)
    }

    /// Terminal-agnostic read loop. `viewport.input_start` is the column the
    /// caller's prompt left the cursor at.
    pub fn read_with<K: KeySource, W: Write>(
        &mut self,
        keys: &mut K,
        out: W,
        viewport: Viewport,
        default: &str,
    ) -> Result<String> {
        self.run(keys, Renderer::new(out, viewport), default, ReadMode::Line)
    }

    pub fn read_password_with<K: KeySource, W: Write>(
        &mut self,
        keys: &mut K,
        out: W,
        viewport: Viewport,
    ) -> Result<String> {
        self.run(keys, Renderer::new(out, viewport), "", ReadMode::Password)
    }

    fn read_terminal(&mut self, prompt: &str, default: &str, mode: ReadMode) -> Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut backend = CrosstermBackend::new();
        let _guard = backend.enter_guard()?;
        let viewport = Viewport::probe()?;
        let renderer = Renderer::new(stdout.lock(), viewport).with_prompt(prompt);
        let mut keys = CrosstermKeySource::new();
        self.run(&mut keys, renderer, default, mode)
    }

    fn run<K: KeySource, W: Write>(
        &mut self,
        keys: &mut K,
        mut renderer: Renderer<W>,
        default: &str,
        mode: ReadMode,
    ) -> Result<String> {
        let password = mode == ReadMode::Password;
        if password {
            renderer.set_echo(self.settings.password_mask.map_or(Echo::Hidden, Echo::Masked));
        } else {
            renderer.set_highlighter(self.highlighter.clone());
        }
        self.history.begin_session();
        debug!(target: "session", ?mode, "read_started");

        let layout = ListingLayout {
            max_columns: self.settings.completion_max_columns,
            max_rows: self.settings.completion_max_rows,
            margin: self.settings.completion_margin,
        };
        let mut completion: Option<&dyn CompletionSource> = None;
        let mut history: Option<&mut dyn History> = None;
        if !password {
            completion = self.completion.as_deref();
            history = Some(&mut self.history);
        }
        let mut handler = KeyHandler::new(renderer, &self.shortcuts)
            .with_completion(completion, layout)
            .with_history(history)
            .with_separators(&self.settings.word_separators)
            .with_continuation_marker(self.settings.continuation_marker.clone());

        loop {
            let Some(event) = keys.next_event()? else {
                handler.finish()?;
                info!(target: "session", "input_closed");
                return Err(SessionError::InputClosed.into());
            };
            match event {
                InputEvent::Key(key) if is_interrupt(&key) => {
                    handler.finish()?;
                    info!(target: "session", "interrupted");
                    return Err(SessionError::Interrupted.into());
                }
                InputEvent::Key(key) => {
                    if handler.handle(&key)?.submit {
                        break;
                    }
                }
                InputEvent::Paste(text) => {
                    handler.handle_paste(&text)?;
                }
                InputEvent::Resize(width, height) => {
                    debug!(target: "session", width, height, "resize_ignored");
                }
            }
        }
        let text = handler.finish()?;
        drop(handler);
        let len = text.chars().count();

        if password {
            debug!(target: "session", len, "password_submitted");
            return Ok(text);
        }
        let default = if default.is_empty() {
            self.settings.default_value.as_str()
        } else {
            default
        };
        if text.trim().is_empty() && !default.trim().is_empty() {
            debug!(target: "session", "default_substituted");
            return Ok(default.to_string());
        }
        if self.history_enabled {
            self.history.add(text.clone());
        }
        debug!(target: "session", len, history_len = self.history.len(), "line_submitted");
        Ok(text)
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    KeyPress::from_event(key) == KeyPress::ctrl('c')
}
