//! User shortcut payloads.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use core_keymap::EditAction;

/// Object-safe view of the line being edited, handed to custom bindings.
pub trait LineContext {
    fn text(&self) -> String;
    fn caret(&self) -> usize;
    fn set_caret(&mut self, index: usize) -> Result<()>;
    fn insert(&mut self, text: &str) -> Result<()>;
    fn remove_left(&mut self, count: usize) -> Result<()>;
    fn remove_right(&mut self, count: usize) -> Result<()>;
    /// Replace the whole line; the caret ends up at the end.
    fn set_text(&mut self, text: &str) -> Result<()>;
    /// Run a built-in action as if its key had been pressed.
    fn perform(&mut self, action: EditAction) -> Result<()>;
}

pub type CustomAction = Arc<dyn Fn(&mut dyn LineContext) -> Result<()> + Send + Sync>;

/// What a user shortcut does: rebind to a built-in action or run a closure.
#[derive(Clone)]
pub enum Binding {
    Action(EditAction),
    Custom(CustomAction),
}

impl Binding {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut dyn LineContext) -> Result<()> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// The built-in action this binding stands for, if it is not custom.
    pub fn action(&self) -> Option<EditAction> {
        match self {
            Self::Action(a) => Some(*a),
            Self::Custom(_) => None,
        }
    }
}

impl From<EditAction> for Binding {
    fn from(action: EditAction) -> Self {
        Self::Action(action)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(a) => f.debug_tuple("Action").field(a).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
