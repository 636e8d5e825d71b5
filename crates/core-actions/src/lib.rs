//! Key dispatch for the line editor.
//!
//! `KeyHandler` owns the renderer for one read and turns each key event into
//! renderer edits. Lookup goes through the user `ShortcutBag` first, then the
//! built-in table from `core-keymap`, then literal insertion. Completion and
//! history navigation are layered on top through `CompletionOverlay` and
//! `HistoryCursor`.

pub mod binding;
pub mod completion;
pub mod dispatcher;
pub mod history_cursor;

pub use binding::{Binding, CustomAction, LineContext};
pub use completion::{CompletionOverlay, CompletionSource};
pub use dispatcher::{DispatchResult, KeyHandler};
pub use history_cursor::HistoryCursor;
