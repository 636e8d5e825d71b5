//! core-keymap: key to edit-action resolution.
//!
//! Design principles:
//! - Pure and deterministic: resolution depends only on the pressed key and
//!   the user shortcut bag, never on buffer state.
//! - The built-in table is a fixed array compiled once into a map; there is
//!   no per-key conditional dispatch.
//! - Lookup order is user shortcut, then built-in default, then literal
//!   insertion. Exactly one outcome per key.
//! - No side effects: logging only at TRACE/DEBUG.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use core_events::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, trace};

// -------------------------------------------------------------------------------------------------
// Edit actions
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditAction {
    CaretLeft,
    CaretRight,
    WordLeft,
    WordRight,
    /// Start of the current logical line.
    Home,
    /// End of the current logical line.
    End,
    Backspace,
    Delete,
    DeleteWordLeft,
    ClearToStart,
    ClearToEnd,
    ClearScreen,
    HistoryPrevious,
    HistoryNext,
    TransposeChars,
    /// Start completion, or cycle forward when it is already active.
    CompleteNext,
    CompletePrevious,
}

// -------------------------------------------------------------------------------------------------
// KeyPress: normalized lookup key
// -------------------------------------------------------------------------------------------------
/// A (modifier-set, key) pair as used for table lookup.
///
/// Built from a [`KeyEvent`] with [`KeyPress::from_event`]: Shift is folded
/// into printable characters (the terminal already reports `'A'` for
/// Shift-a), and Ctrl chords are lower-cased so `C-A` and `C-a` bind alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub mods: KeyModifiers,
    pub code: KeyCode,
}

impl KeyPress {
    pub const fn new(mods: KeyModifiers, code: KeyCode) -> Self {
        Self { mods, code }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(KeyModifiers::empty(), code)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyModifiers::CTRL, KeyCode::Char(c))
    }

    pub const fn alt(c: char) -> Self {
        Self::new(KeyModifiers::ALT, KeyCode::Char(c))
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        match event.code {
            KeyCode::Char(c) => {
                let mods = event.mods.difference(KeyModifiers::SHIFT);
                let c = if mods.contains(KeyModifiers::CTRL) {
                    c.to_ascii_lowercase()
                } else {
                    c
                };
                Self::new(mods, KeyCode::Char(c))
            }
            code => Self::new(event.mods, code),
        }
    }
}

impl From<KeyEvent> for KeyPress {
    fn from(event: KeyEvent) -> Self {
        Self::from_event(&event)
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", KeyEvent::new(self.code, self.mods))
    }
}

// -------------------------------------------------------------------------------------------------
// Built-in defaults
// -------------------------------------------------------------------------------------------------
pub const DEFAULT_BINDINGS: &[(KeyPress, EditAction)] = &[
    (KeyPress::plain(KeyCode::Left), EditAction::CaretLeft),
    (KeyPress::ctrl('b'), EditAction::CaretLeft),
    (KeyPress::plain(KeyCode::Right), EditAction::CaretRight),
    (KeyPress::ctrl('f'), EditAction::CaretRight),
    (
        KeyPress::new(KeyModifiers::CTRL, KeyCode::Left),
        EditAction::WordLeft,
    ),
    (
        KeyPress::new(KeyModifiers::CTRL, KeyCode::Right),
        EditAction::WordRight,
    ),
    (KeyPress::plain(KeyCode::Home), EditAction::Home),
    (KeyPress::ctrl('a'), EditAction::Home),
    (KeyPress::plain(KeyCode::End), EditAction::End),
    (KeyPress::ctrl('e'), EditAction::End),
    (KeyPress::plain(KeyCode::Backspace), EditAction::Backspace),
    (KeyPress::ctrl('h'), EditAction::Backspace),
    (KeyPress::plain(KeyCode::Delete), EditAction::Delete),
    (KeyPress::ctrl('d'), EditAction::Delete),
    (KeyPress::ctrl('w'), EditAction::DeleteWordLeft),
    (KeyPress::ctrl('u'), EditAction::ClearToStart),
    (KeyPress::ctrl('k'), EditAction::ClearToEnd),
    (KeyPress::ctrl('l'), EditAction::ClearScreen),
    (KeyPress::plain(KeyCode::Up), EditAction::HistoryPrevious),
    (KeyPress::ctrl('p'), EditAction::HistoryPrevious),
    (KeyPress::plain(KeyCode::Down), EditAction::HistoryNext),
    (KeyPress::ctrl('n'), EditAction::HistoryNext),
    (KeyPress::ctrl('t'), EditAction::TransposeChars),
    (KeyPress::plain(KeyCode::Tab), EditAction::CompleteNext),
    (
        KeyPress::new(KeyModifiers::SHIFT, KeyCode::Tab),
        EditAction::CompletePrevious,
    ),
];

static DEFAULT_KEYMAP: LazyLock<HashMap<KeyPress, EditAction>> =
    LazyLock::new(|| DEFAULT_BINDINGS.iter().copied().collect());

/// Built-in action bound to `key`, if any.
pub fn default_action(key: &KeyPress) -> Option<EditAction> {
    DEFAULT_KEYMAP.get(key).copied()
}

// -------------------------------------------------------------------------------------------------
// ShortcutBag: user overrides
// -------------------------------------------------------------------------------------------------
/// User shortcuts consulted before the defaults. Populated before a read
/// session starts and only read while it runs.
#[derive(Debug, Clone)]
pub struct ShortcutBag<A> {
    map: HashMap<KeyPress, A>,
}

impl<A> Default for ShortcutBag<A> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<A> ShortcutBag<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key`, returning the previous user binding.
    pub fn insert(&mut self, key: KeyPress, action: A) -> Option<A> {
        let prev = self.map.insert(key, action);
        debug!(
            target: "keymap",
            key = %key,
            replaced = prev.is_some(),
            overrides_default = default_action(&key).is_some(),
            "shortcut_registered"
        );
        prev
    }

    pub fn remove(&mut self, key: &KeyPress) -> Option<A> {
        self.map.remove(key)
    }

    pub fn get(&self, key: &KeyPress) -> Option<&A> {
        self.map.get(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// -------------------------------------------------------------------------------------------------
// Resolution Result
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a, A> {
    User(&'a A),
    Default(EditAction),
    Literal(char),
    /// Modified or non-printable key with no binding; ignored.
    Unbound,
}

/// Resolve a key event: user shortcut, then default table, then literal.
pub fn resolve<'a, A>(user: &'a ShortcutBag<A>, event: &KeyEvent) -> Resolution<'a, A> {
    let key = KeyPress::from_event(event);
    let res = if let Some(a) = user.get(&key) {
        Resolution::User(a)
    } else if let Some(action) = default_action(&key) {
        Resolution::Default(action)
    } else if let Some(c) = event.literal() {
        Resolution::Literal(c)
    } else {
        Resolution::Unbound
    };
    match &res {
        // Literal keys are typed content; only the outcome is logged.
        Resolution::Literal(_) => trace!(target: "keymap", outcome = "literal", "resolve"),
        other => trace!(
            target: "keymap",
            key = %key,
            outcome = match other {
                Resolution::User(_) => "user",
                Resolution::Default(_) => "default",
                _ => "unbound",
            },
            "resolve"
        ),
    }
    res
}
