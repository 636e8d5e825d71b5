//! Centralized normalization for text arriving from outside the keyboard
//! path (bracketed paste, host calls).
//!
//! Contract:
//! - Output is NFC normalized.
//! - `"\r\n"` and lone `'\r'` become `'\n'`; a tab becomes a single space and
//!   other control chars are dropped so they cannot corrupt cursor arithmetic.
//! - Does not log content; callers should avoid logging raw text.

use unicode_normalization::UnicodeNormalization;

pub fn normalize_input(input: &str) -> String {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");
    unified
        .nfc()
        .map(|c| if c == '\t' { ' ' } else { c })
        .filter(|c| *c == '\n' || !c.is_control())
        .collect()
}
