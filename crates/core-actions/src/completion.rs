//! Tab completion.
//!
//! States: inactive (no candidates) and active (candidates loaded, one of
//! them inserted at the completion start). Every selection change removes
//! the previously inserted text, inserts the newly selected candidate and
//! then redraws the listing, so the listing is always placed relative to the
//! updated buffer. Cycling never queries the source again.

use std::io::Write;

use anyhow::Result;
use core_render::{ListingLayout, Renderer, SelectionListing};
use core_text::motion::DEFAULT_WORD_SEPARATORS;
use tracing::debug;

/// Host supplied completion candidates.
pub trait CompletionSource {
    /// Chars that end the word being completed.
    fn separators(&self) -> &[char] {
        DEFAULT_WORD_SEPARATORS
    }

    /// Char index where the completed word starts: just past the last
    /// separator before `caret`, or 0.
    fn completion_start(&self, text: &str, caret: usize) -> usize {
        let separators = self.separators();
        text.chars()
            .take(caret)
            .enumerate()
            .filter(|(_, c)| separators.contains(c))
            .last()
            .map_or(0, |(i, _)| i + 1)
    }

    /// Candidates for `text[start..end]`, in display order. Empty means
    /// nothing to complete.
    fn suggestions(&self, text: &str, start: usize, end: usize) -> Vec<String>;
}

#[derive(Debug, Default)]
pub struct CompletionOverlay {
    candidates: Vec<String>,
    selected: usize,
    start: usize,
    listing: SelectionListing,
}

impl CompletionOverlay {
    pub fn new(layout: ListingLayout) -> Self {
        Self {
            listing: SelectionListing::new(layout),
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.is_active().then_some(self.selected)
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Query `source` at the caret and insert the first candidate. Returns
    /// false, leaving the overlay inactive, when there are no candidates.
    pub fn start_new<W: Write>(
        &mut self,
        source: &dyn CompletionSource,
        renderer: &mut Renderer<W>,
    ) -> Result<bool> {
        let text = renderer.text();
        let caret = renderer.caret();
        let start = source.completion_start(&text, caret).min(caret);
        let candidates = source.suggestions(&text, start, caret);
        debug!(
            target: "actions.completion",
            start,
            caret,
            candidates = candidates.len(),
            "completion_started"
        );
        if candidates.is_empty() {
            return Ok(false);
        }
        self.listing.load(&candidates);
        self.candidates = candidates;
        self.selected = 0;
        self.start = start;
        self.show(renderer)?;
        Ok(true)
    }

    pub fn next<W: Write>(&mut self, renderer: &mut Renderer<W>) -> Result<()> {
        if !self.is_active() {
            return Ok(());
        }
        self.selected = (self.selected + 1) % self.candidates.len();
        self.show(renderer)
    }

    pub fn previous<W: Write>(&mut self, renderer: &mut Renderer<W>) -> Result<()> {
        if !self.is_active() {
            return Ok(());
        }
        self.selected = match self.selected {
            0 => self.candidates.len() - 1,
            i => i - 1,
        };
        self.show(renderer)
    }

    /// Drop the candidates and blank the listing. The inserted candidate
    /// stays in the buffer. Safe to call when inactive.
    pub fn reset<W: Write>(&mut self, renderer: &mut Renderer<W>) -> Result<()> {
        if self.is_active() {
            debug!(target: "actions.completion", "completion_reset");
        }
        self.candidates.clear();
        self.selected = 0;
        self.listing.clear(renderer)
    }

    fn show<W: Write>(&mut self, renderer: &mut Renderer<W>) -> Result<()> {
        let Some(candidate) = self.candidates.get(self.selected) else {
            return Ok(());
        };
        let visible = renderer.caret_visible();
        renderer.set_caret_visible(false)?;
        let typed = renderer.caret().saturating_sub(self.start);
        renderer.remove_left(typed)?;
        renderer.insert(candidate)?;
        self.listing.render(renderer, self.selected)?;
        renderer.set_caret_visible(visible)
    }
}
