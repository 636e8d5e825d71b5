//! Screen model and escape-sequence rendering for the line editor.
//!
//! The renderer shares the terminal with whatever the host printed before the
//! prompt, so it never repaints the screen wholesale. Instead it keeps a
//! cached (row, column) for the caret and emits relative movements and
//! partial redraws to keep the terminal consistent with the buffer.
//!
//! Invariants:
//! - The cached position is a pure function of buffer content, caret and
//!   viewport (`geometry::position_after`); it is recomputed on every
//!   mutation and never read back from the terminal.
//! - Pure caret motion emits only cursor movement: vertical first, then
//!   horizontal, proportional to the distance travelled.
//! - Content changes redraw from the first affected index (or from 0 with a
//!   highlighter) and clear to end of line after every logical line.
//! - A render occupying fewer rows than the previous one blanks the orphaned
//!   rows before returning to the caret (shrink cleanup). The completion
//!   listing follows the same rule for its own rows.
//! - Multi-step redraws hide the cursor while they run and restore the
//!   caller's visibility afterwards.
//!
//! Exposed Components:
//! - `renderer`: `Renderer`, the buffer + caret + cached position owner.
//! - `geometry`: index to `ScreenPos` scan under wrapping.
//! - `writer`: ordered command buffer flushed through crossterm.
//! - `listing`: paged multi-column completion listing.
//! - `style`: `Highlighter` hook and inverse-video constants.

pub mod geometry;
pub mod listing;
pub mod renderer;
pub mod style;
pub mod writer;

pub use geometry::ScreenPos;
pub use listing::{ListingLayout, SelectionListing};
pub use renderer::{Echo, Renderer};
pub use style::Highlighter;
