use core_events::{InputEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::event::{
    Event as CEvent, KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers,
};

/// Map a crossterm event into an editor input event.
///
/// Returns `None` for events the editor does not consume (mouse, focus, key
/// releases, unsupported keys).
pub(crate) fn map_event(event: CEvent) -> Option<InputEvent> {
    match event {
        CEvent::Key(key) => map_key_event(&key).map(InputEvent::Key),
        CEvent::Paste(text) => Some(InputEvent::Paste(text)),
        CEvent::Resize(cols, rows) => Some(InputEvent::Resize(cols, rows)),
        _ => None,
    }
}

/// Map a crossterm key event into a `KeyEvent`.
///
/// Returns `None` for key releases and for key codes we do not support (e.g. media keys).
pub(crate) fn map_key_event(event: &CKeyEvent) -> Option<KeyEvent> {
    if matches!(event.kind, CKeyEventKind::Release) {
        return None;
    }
    let mut mods = map_mods(event.modifiers);
    let code = match event.code {
        CKeyCode::BackTab => {
            mods |= KeyModifiers::SHIFT;
            KeyCode::Tab
        }
        other => map_key_code(&other)?,
    };
    Some(KeyEvent { code, mods })
}

/// Convert a crossterm key code into an editor key code.
pub(crate) fn map_key_code(code: &CKeyCode) -> Option<KeyCode> {
    let code = match code {
        CKeyCode::Char(c) => KeyCode::Char(*c),
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Tab | CKeyCode::BackTab => KeyCode::Tab,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        CKeyCode::PageUp => KeyCode::PageUp,
        CKeyCode::PageDown => KeyCode::PageDown,
        CKeyCode::Insert => KeyCode::Insert,
        CKeyCode::Delete => KeyCode::Delete,
        CKeyCode::F(n) => KeyCode::F(*n),
        CKeyCode::Null
        | CKeyCode::CapsLock
        | CKeyCode::ScrollLock
        | CKeyCode::NumLock
        | CKeyCode::PrintScreen
        | CKeyCode::Pause
        | CKeyCode::Menu
        | CKeyCode::KeypadBegin
        | CKeyCode::Media(_)
        | CKeyCode::Modifier(_) => return None,
    };
    Some(code)
}

/// Convert crossterm modifier flags into `KeyModifiers` bits. Super/Meta are
/// folded into nothing: the editor binds only Ctrl, Alt and Shift.
pub(crate) fn map_mods(m: CKeyModifiers) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    if m.contains(CKeyModifiers::CONTROL) {
        out |= KeyModifiers::CTRL;
    }
    if m.contains(CKeyModifiers::ALT) {
        out |= KeyModifiers::ALT;
    }
    if m.contains(CKeyModifiers::SHIFT) {
        out |= KeyModifiers::SHIFT;
    }
    out
}
