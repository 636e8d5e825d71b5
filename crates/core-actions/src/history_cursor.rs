//! Up/Down handling: vertical caret motion inside a multi-line buffer takes
//! precedence over history recall.

use std::io::Write;

use anyhow::Result;
use core_history::History;
use core_render::Renderer;
use tracing::trace;

pub struct HistoryCursor<'a> {
    history: Option<&'a mut dyn History>,
}

impl<'a> HistoryCursor<'a> {
    pub fn new(history: Option<&'a mut dyn History>) -> Self {
        Self { history }
    }

    pub fn detached() -> Self {
        Self { history: None }
    }

    /// Returns true when a history entry replaced the buffer.
    pub fn up<W: Write>(&mut self, renderer: &mut Renderer<W>) -> Result<bool> {
        if renderer.buffer().is_multiline() && renderer.caret() > 0 {
            renderer.caret_up()?;
            return Ok(false);
        }
        let Some(history) = self.history.as_deref_mut() else {
            return Ok(false);
        };
        let entry = history.previous(&renderer.text(), renderer.caret());
        load(renderer, entry, "previous")
    }

    /// Returns true when a history entry replaced the buffer.
    pub fn down<W: Write>(&mut self, renderer: &mut Renderer<W>, was_edited: bool) -> Result<bool> {
        if renderer.buffer().is_multiline() && renderer.caret() < renderer.buffer().len() {
            renderer.caret_down()?;
            return Ok(false);
        }
        let Some(history) = self.history.as_deref_mut() else {
            return Ok(false);
        };
        let entry = history.next(&renderer.text(), renderer.caret(), was_edited);
        load(renderer, entry, "next")
    }
}

fn load<W: Write>(
    renderer: &mut Renderer<W>,
    entry: Option<String>,
    direction: &'static str,
) -> Result<bool> {
    let Some(entry) = entry else {
        trace!(target: "actions.history", direction, "no_entry");
        return Ok(false);
    };
    trace!(
        target: "actions.history",
        direction,
        entry_len = entry.chars().count(),
        "entry_loaded"
    );
    renderer.set_text(&entry)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_history::SessionHistory;
    use core_terminal::Viewport;
    use pretty_assertions::assert_eq;

    fn renderer(text: &str) -> Renderer<Vec<u8>> {
        let mut r = Renderer::new(Vec::new(), Viewport::new(2, 40, 24));
        r.insert(text).unwrap();
        r
    }

    #[test]
    fn down_inside_multiline_moves_caret() {
        let mut h = SessionHistory::new();
        h.add("older");
        let mut cursor = HistoryCursor::new(Some(&mut h));
        let mut r = renderer("line1\nline2");
        r.set_caret(3).unwrap();
        assert!(!cursor.down(&mut r, false).unwrap());
        assert_eq!(r.caret(), 9);
        assert_eq!(r.text(), "line1\nline2");
    }

    #[test]
    fn up_at_buffer_start_recalls_history() {
        let mut h = SessionHistory::new();
        h.add("older");
        let mut cursor = HistoryCursor::new(Some(&mut h));
        let mut r = renderer("a\nb");
        cursor.up(&mut r).unwrap();
        assert_eq!(r.caret(), 1);
        cursor.up(&mut r).unwrap();
        assert_eq!(r.caret(), 0);
        assert!(cursor.up(&mut r).unwrap());
        assert_eq!(r.text(), "older");
        assert_eq!(r.caret(), 5);
    }

    #[test]
    fn missing_history_is_a_no_op() {
        let mut cursor = HistoryCursor::detached();
        let mut r = renderer("abc");
        assert!(!cursor.up(&mut r).unwrap());
        assert!(!cursor.down(&mut r, true).unwrap());
        assert_eq!(r.text(), "abc");
    }
}
