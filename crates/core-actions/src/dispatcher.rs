//! Key event dispatch for one read.
//!
//! Order of evaluation for a key:
//! 1. Any key other than a completion cycle key tears down an active
//!    completion first.
//! 2. A user shortcut, if bound.
//! 3. Enter: continuation or submit.
//! 4. The built-in default table.
//! 5. Literal insertion. Ctrl/Alt chords that reach this point are ignored.

use std::io::Write;

use anyhow::Result;
use core_events::{KeyCode, KeyEvent};
use core_history::History;
use core_keymap::{EditAction, Resolution, ShortcutBag, resolve};
use core_render::{ListingLayout, Renderer};
use core_text::motion::{self, DEFAULT_WORD_SEPARATORS};
use core_text::segment::normalize_input;
use tracing::{debug, trace};

use crate::binding::{Binding, LineContext};
use crate::completion::{CompletionOverlay, CompletionSource};
use crate::history_cursor::HistoryCursor;

/// Result of dispatching a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// The buffer content changed.
    pub dirty: bool,
    /// Enter was pressed without a continuation marker; the line is done.
    pub submit: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            submit: false,
        }
    }
    pub fn clean() -> Self {
        Self {
            dirty: false,
            submit: false,
        }
    }
    pub fn submit() -> Self {
        Self {
            dirty: false,
            submit: true,
        }
    }
}

pub struct KeyHandler<'a, W: Write> {
    renderer: Renderer<W>,
    shortcuts: &'a ShortcutBag<Binding>,
    source: Option<&'a dyn CompletionSource>,
    completion: CompletionOverlay,
    history: HistoryCursor<'a>,
    separators: Vec<char>,
    continuation_marker: Option<String>,
    edited: bool,
}

impl<'a, W: Write> KeyHandler<'a, W> {
    pub fn new(renderer: Renderer<W>, shortcuts: &'a ShortcutBag<Binding>) -> Self {
        Self {
            renderer,
            shortcuts,
            source: None,
            completion: CompletionOverlay::new(ListingLayout::default()),
            history: HistoryCursor::detached(),
            separators: DEFAULT_WORD_SEPARATORS.to_vec(),
            continuation_marker: None,
            edited: false,
        }
    }

    pub fn with_completion(
        mut self,
        source: Option<&'a dyn CompletionSource>,
        layout: ListingLayout,
    ) -> Self {
        self.source = source;
        self.completion = CompletionOverlay::new(layout);
        self
    }

    pub fn with_history(mut self, history: Option<&'a mut dyn History>) -> Self {
        self.history = HistoryCursor::new(history);
        self
    }

    /// An empty set falls back to the default separators.
    pub fn with_separators(mut self, separators: &[char]) -> Self {
        self.separators = if separators.is_empty() {
            DEFAULT_WORD_SEPARATORS.to_vec()
        } else {
            separators.to_vec()
        };
        self
    }

    pub fn with_continuation_marker(mut self, marker: Option<String>) -> Self {
        self.continuation_marker = marker.filter(|m| !m.is_empty());
        self
    }

    pub fn renderer(&self) -> &Renderer<W> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<W> {
        &mut self.renderer
    }

    pub fn completion(&self) -> &CompletionOverlay {
        &self.completion
    }

    /// Whether the line was typed into since it was last loaded from history.
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn handle(&mut self, key: &KeyEvent) -> Result<DispatchResult> {
        let shortcuts = self.shortcuts;
        let resolution = resolve(shortcuts, key);
        let cycling = matches!(
            effective_action(&resolution),
            Some(EditAction::CompleteNext | EditAction::CompletePrevious)
        );
        if self.completion.is_active() && !cycling {
            self.completion.reset(&mut self.renderer)?;
        }

        let result = match resolution {
            Resolution::User(Binding::Action(action)) => self.apply(*action)?,
            Resolution::User(Binding::Custom(f)) => {
                let before = self.renderer.buffer().len();
                let ctx: &mut dyn LineContext = &mut *self;
                f(ctx)?;
                trace!(target: "actions.dispatch", key = %key, "custom_binding");
                if self.renderer.buffer().len() != before {
                    DispatchResult::dirty()
                } else {
                    DispatchResult::clean()
                }
            }
            _ if key.code == KeyCode::Enter => self.enter()?,
            Resolution::Default(action) => self.apply(action)?,
            Resolution::Literal(c) => {
                let mut buf = [0u8; 4];
                self.renderer.insert(c.encode_utf8(&mut buf))?;
                self.edited = true;
                DispatchResult::dirty()
            }
            Resolution::Unbound => {
                trace!(target: "actions.dispatch", key = %key, "unbound_key_ignored");
                DispatchResult::clean()
            }
        };
        Ok(result)
    }

    /// Insert pasted text in one edit.
    pub fn handle_paste(&mut self, text: &str) -> Result<DispatchResult> {
        self.completion.reset(&mut self.renderer)?;
        let text = normalize_input(text);
        if text.is_empty() {
            return Ok(DispatchResult::clean());
        }
        self.renderer.insert(&text)?;
        self.edited = true;
        debug!(target: "actions.dispatch", paste_len = text.chars().count(), "paste_inserted");
        Ok(DispatchResult::dirty())
    }

    /// Tear down any completion and move the terminal cursor past the line.
    pub fn finish(&mut self) -> Result<String> {
        self.completion.reset(&mut self.renderer)?;
        self.renderer.finish()?;
        self.edited = false;
        Ok(self.renderer.text())
    }

    fn enter(&mut self) -> Result<DispatchResult> {
        if let Some(marker) = &self.continuation_marker {
            if self.renderer.buffer().ends_with(marker) {
                let end = self.renderer.buffer().len();
                self.renderer.set_caret(end)?;
                self.renderer.insert("\n")?;
                debug!(target: "actions.dispatch", len = end + 1, "line_continued");
                return Ok(DispatchResult::dirty());
            }
        }
        let end = self.renderer.buffer().len();
        self.renderer.set_caret(end)?;
        debug!(target: "actions.dispatch", len = end, "line_submitted");
        Ok(DispatchResult::submit())
    }

    /// Run a built-in action against the current line.
    pub fn apply(&mut self, action: EditAction) -> Result<DispatchResult> {
        trace!(target: "actions.dispatch", ?action, caret = self.renderer.caret(), "apply");
        let caret = self.renderer.caret();
        let r = &mut self.renderer;
        match action {
            EditAction::CaretLeft => r.set_caret(caret.saturating_sub(1))?,
            EditAction::CaretRight => r.set_caret(caret + 1)?,
            EditAction::WordLeft => {
                let target = motion::word_left(r.buffer(), caret, &self.separators);
                r.set_caret(target)?
            }
            EditAction::WordRight => {
                let target = motion::word_right(r.buffer(), caret, &self.separators);
                r.set_caret(target)?
            }
            EditAction::Home => {
                let target = r.buffer().line_start(caret);
                r.set_caret(target)?
            }
            EditAction::End => {
                let target = r.buffer().line_end(caret);
                r.set_caret(target)?
            }
            EditAction::Backspace => return self.removal(|r| r.remove_left(1)),
            EditAction::Delete => return self.removal(|r| r.remove_right(1)),
            EditAction::DeleteWordLeft => {
                let target = motion::word_left(r.buffer(), caret, &self.separators);
                return self.removal(|r| r.clear_line_left(Some(target)));
            }
            EditAction::ClearToStart => return self.removal(|r| r.clear_line_left(None)),
            EditAction::ClearToEnd => return self.removal(|r| r.clear_line_right(None)),
            EditAction::ClearScreen => r.clear_screen()?,
            EditAction::HistoryPrevious => {
                if self.history.up(r)? {
                    self.edited = false;
                    return Ok(DispatchResult::dirty());
                }
            }
            EditAction::HistoryNext => {
                if self.history.down(r, self.edited)? {
                    self.edited = false;
                    return Ok(DispatchResult::dirty());
                }
            }
            EditAction::TransposeChars => return self.transpose(),
            EditAction::CompleteNext => {
                if self.completion.is_active() {
                    self.completion.next(r)?;
                    return Ok(DispatchResult::dirty());
                }
                if let Some(source) = self.source {
                    if self.completion.start_new(source, r)? {
                        return Ok(DispatchResult::dirty());
                    }
                }
            }
            EditAction::CompletePrevious => {
                if self.completion.is_active() {
                    self.completion.previous(r)?;
                    return Ok(DispatchResult::dirty());
                }
            }
        }
        Ok(DispatchResult::clean())
    }

    fn removal(
        &mut self,
        op: impl FnOnce(&mut Renderer<W>) -> Result<()>,
    ) -> Result<DispatchResult> {
        let before = self.renderer.buffer().len();
        op(&mut self.renderer)?;
        if self.renderer.buffer().len() == before {
            Ok(DispatchResult::clean())
        } else {
            Ok(DispatchResult::dirty())
        }
    }

    /// Swap the chars around the caret and step past them. At the end of the
    /// buffer the last two chars are swapped instead.
    fn transpose(&mut self) -> Result<DispatchResult> {
        let caret = self.renderer.caret();
        let len = self.renderer.buffer().len();
        if caret == 0 || len < 2 {
            return Ok(DispatchResult::clean());
        }
        let first = if caret == len { len - 2 } else { caret - 1 };
        let visible = self.renderer.caret_visible();
        self.renderer.set_caret_visible(false)?;
        self.renderer.swap_chars(first, first + 1)?;
        self.renderer.set_caret(first + 2)?;
        self.renderer.set_caret_visible(visible)?;
        self.edited = true;
        Ok(DispatchResult::dirty())
    }
}

fn effective_action(resolution: &Resolution<'_, Binding>) -> Option<EditAction> {
    match resolution {
        Resolution::User(binding) => binding.action(),
        Resolution::Default(action) => Some(*action),
        _ => None,
    }
}

impl<W: Write> LineContext for KeyHandler<'_, W> {
    fn text(&self) -> String {
        self.renderer.text()
    }

    fn caret(&self) -> usize {
        self.renderer.caret()
    }

    fn set_caret(&mut self, index: usize) -> Result<()> {
        self.renderer.set_caret(index)
    }

    fn insert(&mut self, text: &str) -> Result<()> {
        self.edited = true;
        self.renderer.insert(text)
    }

    fn remove_left(&mut self, count: usize) -> Result<()> {
        self.renderer.remove_left(count)
    }

    fn remove_right(&mut self, count: usize) -> Result<()> {
        self.renderer.remove_right(count)
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        self.renderer.set_text(text)
    }

    fn perform(&mut self, action: EditAction) -> Result<()> {
        self.apply(action).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::KeyModifiers;
    use core_terminal::Viewport;
    use pretty_assertions::assert_eq;

    fn handler(shortcuts: &ShortcutBag<Binding>) -> KeyHandler<'_, Vec<u8>> {
        KeyHandler::new(
            Renderer::new(Vec::new(), Viewport::new(2, 40, 24)),
            shortcuts,
        )
    }

    fn type_str(h: &mut KeyHandler<'_, Vec<u8>>, s: &str) {
        for c in s.chars() {
            h.handle(&KeyEvent::plain(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn transpose_in_middle_swaps_and_advances() {
        let bag = ShortcutBag::new();
        let mut h = handler(&bag);
        type_str(&mut h, "abcd");
        h.renderer_mut().set_caret(2).unwrap();
        h.handle(&KeyEvent::ctrl(KeyCode::Char('t'))).unwrap();
        assert_eq!(h.renderer().text(), "acbd");
        assert_eq!(h.renderer().caret(), 3);
    }

    #[test]
    fn transpose_at_end_swaps_last_two() {
        let bag = ShortcutBag::new();
        let mut h = handler(&bag);
        type_str(&mut h, "abcd");
        h.handle(&KeyEvent::ctrl(KeyCode::Char('t'))).unwrap();
        assert_eq!(h.renderer().text(), "abdc");
        assert_eq!(h.renderer().caret(), 4);
    }

    #[test]
    fn transpose_at_start_is_a_no_op() {
        let bag = ShortcutBag::new();
        let mut h = handler(&bag);
        type_str(&mut h, "ab");
        h.renderer_mut().set_caret(0).unwrap();
        let res = h.handle(&KeyEvent::ctrl(KeyCode::Char('t'))).unwrap();
        assert_eq!(res, DispatchResult::clean());
        assert_eq!(h.renderer().text(), "ab");
    }

    #[test]
    fn delete_word_left_stops_at_line_break() {
        let bag = ShortcutBag::new();
        let mut h = handler(&bag);
        h.renderer_mut().insert("one two\nthree").unwrap();
        h.handle(&KeyEvent::ctrl(KeyCode::Char('w'))).unwrap();
        assert_eq!(h.renderer().text(), "one two\n");
        h.handle(&KeyEvent::ctrl(KeyCode::Char('w'))).unwrap();
        assert_eq!(h.renderer().text(), "one two\n");
    }

    #[test]
    fn delete_word_left_removes_trailing_separators() {
        let bag = ShortcutBag::new();
        let mut h = handler(&bag);
        type_str(&mut h, "git commit  ");
        h.handle(&KeyEvent::ctrl(KeyCode::Char('w'))).unwrap();
        assert_eq!(h.renderer().text(), "git ");
    }

    #[test]
    fn home_and_end_follow_logical_line() {
        let bag = ShortcutBag::new();
        let mut h = handler(&bag);
        h.renderer_mut().insert("ab\ncdef").unwrap();
        h.renderer_mut().set_caret(5).unwrap();
        h.handle(&KeyEvent::plain(KeyCode::Home)).unwrap();
        assert_eq!(h.renderer().caret(), 3);
        h.handle(&KeyEvent::ctrl(KeyCode::Char('e'))).unwrap();
        assert_eq!(h.renderer().caret(), 7);
    }

    #[test]
    fn modified_unbound_chars_are_not_inserted() {
        let bag = ShortcutBag::new();
        let mut h = handler(&bag);
        let res = h
            .handle(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT))
            .unwrap();
        assert_eq!(res, DispatchResult::clean());
        h.handle(&KeyEvent::ctrl(KeyCode::Char('z'))).unwrap();
        assert_eq!(h.renderer().text(), "");
        assert!(!h.is_edited());
    }

    #[test]
    fn enter_continues_after_marker() {
        let bag = ShortcutBag::new();
        let mut h = handler(&bag).with_continuation_marker(Some("\\".to_string()));
        type_str(&mut h, "echo \\");
        h.renderer_mut().set_caret(2).unwrap();
        let res = h.handle(&KeyEvent::plain(KeyCode::Enter)).unwrap();
        assert_eq!(res, DispatchResult::dirty());
        assert_eq!(h.renderer().text(), "echo \\\n");
        assert_eq!(h.renderer().caret(), 7);
        type_str(&mut h, "hi");
        let res = h.handle(&KeyEvent::plain(KeyCode::Enter)).unwrap();
        assert!(res.submit);
        assert_eq!(h.finish().unwrap(), "echo \\\nhi");
    }

    #[test]
    fn enter_without_marker_submits() {
        let bag = ShortcutBag::new();
        let mut h = handler(&bag);
        type_str(&mut h, "echo \\");
        assert!(h.handle(&KeyEvent::plain(KeyCode::Enter)).unwrap().submit);
        assert_eq!(h.renderer().text(), "echo \\");
    }

    #[test]
    fn paste_is_normalized_and_marks_edit() {
        let bag = ShortcutBag::new();
        let mut h = handler(&bag);
        h.handle_paste("a\r\nb\tc").unwrap();
        assert_eq!(h.renderer().text(), "a\nb c");
        assert!(h.is_edited());
    }

    #[test]
    fn user_rebinding_replaces_default() {
        let mut bag = ShortcutBag::new();
        bag.insert(
            core_keymap::KeyPress::ctrl('a'),
            Binding::Action(EditAction::End),
        );
        let mut h = handler(&bag);
        type_str(&mut h, "abc");
        h.handle(&KeyEvent::plain(KeyCode::Home)).unwrap();
        assert_eq!(h.renderer().caret(), 0);
        h.handle(&KeyEvent::ctrl(KeyCode::Char('a'))).unwrap();
        assert_eq!(h.renderer().caret(), 3);
    }

    #[test]
    fn custom_binding_sees_line_context() {
        let mut bag = ShortcutBag::new();
        bag.insert(
            core_keymap::KeyPress::alt('u'),
            Binding::custom(|ctx: &mut dyn LineContext| {
                let upper = ctx.text().to_uppercase();
                ctx.set_text(&upper)?;
                ctx.perform(EditAction::Home)
            }),
        );
        let mut h = handler(&bag);
        type_str(&mut h, "abc");
        let res = h
            .handle(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::ALT))
            .unwrap();
        assert_eq!(res, DispatchResult::clean());
        assert_eq!(h.renderer().text(), "ABC");
        assert_eq!(h.renderer().caret(), 0);
    }
}
