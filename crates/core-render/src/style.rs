//! Styling hooks.
//!
//! Highlighting is applied to the rendered copy of the buffer only; the
//! stored text never contains escape codes. A highlighter must not add or
//! remove line breaks or visible glyphs, otherwise cached screen positions no
//! longer match what the terminal shows.

/// Inverse video used for the selected completion cell.
pub const SELECTED_START: &str = "\x1b[107m\x1b[30m";
pub const STYLE_RESET: &str = "\x1b[0m";

pub trait Highlighter: Send + Sync {
    fn highlight(&self, text: &str) -> String;
}

impl<F> Highlighter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn highlight(&self, text: &str) -> String {
        self(text)
    }
}

/// Wrap `content` in the selected-cell style.
pub fn selected(content: &str) -> String {
    format!("{SELECTED_START}{content}{STYLE_RESET}")
}
