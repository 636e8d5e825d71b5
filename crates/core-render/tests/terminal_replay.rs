//! Replays renderer output through a small terminal model and checks that the
//! screen and the real cursor agree with the renderer's cached position.
//!
//! The model follows xterm's deferred wrap: printing into the last column
//! leaves the cursor there until the next glyph, and any cursor movement,
//! `\r`, `\n` or erase cancels the pending wrap.

use std::sync::Arc;

use core_render::{Highlighter, ListingLayout, Renderer, ScreenPos, SelectionListing};
use core_terminal::Viewport;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

struct Terminal {
    width: usize,
    rows: Vec<Vec<char>>,
    row: usize,
    col: usize,
    wrap_pending: bool,
}

impl Terminal {
    /// Row 0 is the prompt row; the prompt is printed first.
    fn new(width: usize, prompt: &str) -> Self {
        let mut t = Self {
            width,
            rows: vec![vec![' '; width]],
            row: 0,
            col: 0,
            wrap_pending: false,
        };
        t.feed(prompt.as_bytes());
        t
    }

    fn feed(&mut self, bytes: &[u8]) {
        let text = std::str::from_utf8(bytes).unwrap();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            match c {
                '\x1b' => {
                    assert_eq!(chars.next(), Some('['), "only CSI sequences are emitted");
                    let mut params = String::new();
                    let command = loop {
                        let c = chars.next().expect("unterminated escape sequence");
                        if c.is_ascii_digit() || c == '?' || c == ';' {
                            params.push(c);
                        } else {
                            break c;
                        }
                    };
                    self.csi(&params, command);
                }
                '\r' => {
                    self.col = 0;
                    self.wrap_pending = false;
                }
                '\n' => {
                    self.row += 1;
                    self.grow();
                    self.wrap_pending = false;
                }
                c => self.put(c),
            }
        }
    }

    fn csi(&mut self, params: &str, command: char) {
        // Cursor visibility and styling leave the position alone.
        if params.starts_with('?') || command == 'm' {
            return;
        }
        let n: usize = params.parse().unwrap_or(1);
        match command {
            'A' => {
                assert!(n <= self.row, "cursor moved above input row 0");
                self.row -= n;
            }
            'B' => {
                self.row += n;
                self.grow();
            }
            'C' => self.col = (self.col + n).min(self.width - 1),
            'D' => self.col = self.col.saturating_sub(n),
            'G' => self.col = n.saturating_sub(1),
            'K' => {
                let col = self.col;
                for cell in &mut self.rows[self.row][col..] {
                    *cell = ' ';
                }
            }
            other => panic!("unexpected escape sequence {params:?}{other}"),
        }
        self.wrap_pending = false;
    }

    fn put(&mut self, c: char) {
        if self.wrap_pending {
            self.row += 1;
            self.col = 0;
            self.grow();
            self.wrap_pending = false;
        }
        self.rows[self.row][self.col] = c;
        if self.col + 1 == self.width {
            self.wrap_pending = true;
        } else {
            self.col += 1;
        }
    }

    fn grow(&mut self) {
        while self.rows.len() <= self.row {
            self.rows.push(vec![' '; self.width]);
        }
    }

    fn cursor(&self) -> ScreenPos {
        ScreenPos::new(self.row, self.col)
    }

    fn row_text(&self, row: usize) -> String {
        self.rows
            .get(row)
            .map(|r| r.iter().collect::<String>().trim_end().to_string())
            .unwrap_or_default()
    }

    /// Row texts with trailing blank rows dropped.
    fn screen(&self) -> Vec<String> {
        let mut rows: Vec<String> = (0..self.rows.len()).map(|r| self.row_text(r)).collect();
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        rows
    }
}

fn replay(term: &mut Terminal, r: &mut Renderer<Vec<u8>>) {
    let out = std::mem::take(r.output_mut());
    term.feed(&out);
    assert!(!term.wrap_pending, "an operation ended with a pending wrap");
    assert_eq!(term.cursor(), r.screen_position());
}

fn identity() -> Arc<dyn Highlighter> {
    Arc::new(|s: &str| s.to_string())
}

#[test]
fn break_after_filled_row_keeps_cursor_in_sync() {
    let mut r = Renderer::new(Vec::new(), Viewport::new(0, 10, 24));
    r.set_highlighter(Some(identity()));
    let mut term = Terminal::new(10, "");

    r.insert("abcdefghi\\").unwrap();
    replay(&mut term, &mut r);
    assert_eq!(term.row_text(0), "abcdefghi\\");

    r.insert("\n").unwrap();
    replay(&mut term, &mut r);
    assert_eq!(r.screen_position(), ScreenPos::new(2, 0));
    assert_eq!(term.row_text(0), "abcdefghi\\");

    r.insert("x").unwrap();
    replay(&mut term, &mut r);
    assert_eq!(term.screen(), vec!["abcdefghi\\", "", "x"]);
}

#[test]
fn edit_that_fills_a_row_before_a_break() {
    let mut r = Renderer::new(Vec::new(), Viewport::new(0, 10, 24));
    let mut term = Terminal::new(10, "");
    r.insert("abcdefghi\nz").unwrap();
    replay(&mut term, &mut r);
    assert_eq!(term.screen(), vec!["abcdefghi", "z"]);

    r.set_caret(0).unwrap();
    replay(&mut term, &mut r);
    r.insert("Q").unwrap();
    replay(&mut term, &mut r);
    assert_eq!(term.screen(), vec!["Qabcdefghi", "", "z"]);

    r.remove_left(1).unwrap();
    replay(&mut term, &mut r);
    assert_eq!(term.screen(), vec!["abcdefghi", "z"]);
    assert_eq!(term.cursor(), ScreenPos::new(0, 0));
}

#[test]
fn listing_moved_up_by_shorter_input_leaves_no_rows_behind() {
    let mut r = Renderer::new(Vec::new(), Viewport::new(2, 20, 24));
    let mut term = Terminal::new(20, "> ");
    r.insert("cmd ").unwrap();
    replay(&mut term, &mut r);

    let candidates = vec!["aaaaaaaaaaaaaaa".to_string(), "b".to_string()];
    let mut listing = SelectionListing::new(ListingLayout::default());
    listing.load(&candidates);

    r.insert(&candidates[0]).unwrap();
    listing.render(&mut r, 0).unwrap();
    replay(&mut term, &mut r);
    assert_eq!(
        term.screen(),
        vec!["> cmd aaaaaaaaaaaaaa", "a", "aaaaaaaaaaaaaaa", "b"]
    );

    r.remove_left(candidates[0].chars().count()).unwrap();
    r.insert(&candidates[1]).unwrap();
    listing.render(&mut r, 1).unwrap();
    replay(&mut term, &mut r);
    assert_eq!(term.screen(), vec!["> cmd b", "aaaaaaaaaaaaaaa", "b"]);

    r.set_caret(0).unwrap();
    r.insert(&candidates[0]).unwrap();
    listing.render(&mut r, 0).unwrap();
    r.remove_left(candidates[0].chars().count()).unwrap();
    listing.clear(&mut r).unwrap();
    replay(&mut term, &mut r);
    assert_eq!(term.screen(), vec!["> cmd b"]);
}

#[test]
fn clear_after_input_shrank_blanks_old_listing() {
    let mut r = Renderer::new(Vec::new(), Viewport::new(2, 20, 24));
    let mut term = Terminal::new(20, "> ");
    let candidates = vec!["aaaaaaaaaaaaaaa".to_string(), "b".to_string()];
    let mut listing = SelectionListing::new(ListingLayout::default());
    listing.load(&candidates);

    r.insert("cmd aaaaaaaaaaaaaaa").unwrap();
    listing.render(&mut r, 0).unwrap();
    replay(&mut term, &mut r);

    r.remove_left(15).unwrap();
    r.insert("b").unwrap();
    listing.clear(&mut r).unwrap();
    replay(&mut term, &mut r);
    assert_eq!(term.screen(), vec!["> cmd b"]);
}

#[derive(Debug, Clone)]
enum Op {
    Insert(String),
    RemoveLeft(usize),
    RemoveRight(usize),
    SetCaret(usize),
    ClearLineLeft,
    ClearLineRight,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z\n]{0,9}".prop_map(Op::Insert),
        (0usize..6).prop_map(Op::RemoveLeft),
        (0usize..6).prop_map(Op::RemoveRight),
        (0usize..40).prop_map(Op::SetCaret),
        Just(Op::ClearLineLeft),
        Just(Op::ClearLineRight),
    ]
}

proptest! {
    #[test]
    fn incremental_redraws_match_a_fresh_render(
        ops in prop::collection::vec(op(), 0..30),
        highlighted in any::<bool>(),
    ) {
        let vp = Viewport::new(2, 8, 24);
        let mut r = Renderer::new(Vec::new(), vp);
        if highlighted {
            r.set_highlighter(Some(identity()));
        }
        let mut term = Terminal::new(8, "> ");
        for op in &ops {
            match op {
                Op::Insert(s) => r.insert(s).unwrap(),
                Op::RemoveLeft(n) => r.remove_left(*n).unwrap(),
                Op::RemoveRight(n) => r.remove_right(*n).unwrap(),
                Op::SetCaret(i) => r.set_caret(*i).unwrap(),
                Op::ClearLineLeft => r.clear_line_left(None).unwrap(),
                Op::ClearLineRight => r.clear_line_right(None).unwrap(),
            }
            replay(&mut term, &mut r);

            let mut fresh = Renderer::new(Vec::new(), vp);
            let mut fresh_term = Terminal::new(8, "> ");
            fresh.set_text(&r.text()).unwrap();
            replay(&mut fresh_term, &mut fresh);
            prop_assert_eq!(term.screen(), fresh_term.screen());
        }
    }
}
