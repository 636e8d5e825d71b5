//! Completion listing drawn below the input.
//!
//! Candidates are laid out row-major in up to `max_columns` columns and paged
//! `max_rows` rows at a time; the page shown is the one containing the
//! selection. Every render repaints the whole page. When a page has fewer
//! rows than the previous one, or the input above it lost rows so the
//! listing now starts higher, the rows the previous render reached past the
//! new one are blanked so no stale candidates stay on screen.

use std::io::Write;

use anyhow::Result;
use core_text::width::{str_width, truncate_with_ellipsis};
use tracing::trace;

use crate::renderer::Renderer;
use crate::style::selected;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLayout {
    pub max_columns: usize,
    pub max_rows: usize,
    /// Spaces between columns.
    pub margin: usize,
}

impl Default for ListingLayout {
    fn default() -> Self {
        Self {
            max_columns: 5,
            max_rows: 5,
            margin: 3,
        }
    }
}

#[derive(Debug, Default)]
pub struct SelectionListing {
    layout: ListingLayout,
    items: Vec<String>,
    max_width: usize,
    last_row_count: usize,
    // Last input row at the time of the last render.
    anchor_row: usize,
}

impl SelectionListing {
    pub fn new(layout: ListingLayout) -> Self {
        Self {
            layout: ListingLayout {
                max_columns: layout.max_columns.max(1),
                max_rows: layout.max_rows.max(1),
                margin: layout.margin,
            },
            ..Self::default()
        }
    }

    pub fn load(&mut self, items: &[String]) {
        self.items = items.to_vec();
        self.max_width = items.iter().map(|s| str_width(s)).max().unwrap_or(0);
    }

    /// Rows currently occupied on screen by the last render.
    pub fn last_row_count(&self) -> usize {
        self.last_row_count
    }

    /// Number of columns used for `screen_width`.
    pub fn column_count(&self, screen_width: usize) -> usize {
        let cell = self.max_width + self.layout.margin;
        (screen_width / cell.max(1))
            .min(self.items.len())
            .min(self.layout.max_columns)
            .max(1)
    }

    /// Lines of the page containing `selected`, without trailing blank rows.
    pub fn build_lines(&self, selected_index: usize, screen_width: usize) -> Vec<String> {
        let count = self.items.len();
        if count == 0 {
            return Vec::new();
        }
        let selected_index = selected_index.min(count - 1);
        let columns = self.column_count(screen_width);
        let max_rows = self.layout.max_rows;
        let start_row = selected_index / columns / max_rows * max_rows;
        let total_rows = count.div_ceil(columns);
        let end_row = total_rows.min(start_row + max_rows);

        let cells: Vec<String> = self
            .items
            .iter()
            .map(|s| self.fit(s, screen_width))
            .collect();

        let mut widths = vec![0usize; columns];
        for row in start_row..end_row {
            for (col, width) in widths.iter_mut().enumerate() {
                if let Some(cell) = cells.get(row * columns + col) {
                    *width = (*width).max(str_width(cell));
                }
            }
        }

        let margin = " ".repeat(self.layout.margin);
        let mut lines = Vec::with_capacity(end_row - start_row);
        for row in start_row..end_row {
            let mut line = String::new();
            for (col, width) in widths.iter().enumerate() {
                let index = row * columns + col;
                let Some(cell) = cells.get(index) else {
                    line.push_str(&" ".repeat(*width));
                    break;
                };
                if col != 0 {
                    line.push_str(&margin);
                }
                let padding = " ".repeat(width.saturating_sub(str_width(cell)));
                if index == selected_index {
                    line.push_str(&selected(cell));
                } else {
                    line.push_str(cell);
                }
                line.push_str(&padding);
            }
            lines.push(line);
        }
        lines
    }

    /// Draw the page containing `selected_index`. A listing of one candidate
    /// is never drawn.
    pub fn render<W: Write>(
        &mut self,
        renderer: &mut Renderer<W>,
        selected_index: usize,
    ) -> Result<()> {
        if self.items.len() <= 1 {
            return Ok(());
        }
        let width = renderer.viewport().width as usize;
        let anchor = renderer.last_input_row();
        let mut lines = self.build_lines(selected_index, width);
        let row_count = lines.len();
        let reach = self.previous_reach(anchor);
        if reach > row_count {
            lines.resize(reach, String::new());
        }
        trace!(
            target: "render.listing",
            selected = selected_index,
            rows = row_count,
            cleared = lines.len() - row_count,
            "listing"
        );
        renderer.write_lines_outside(&lines)?;
        self.last_row_count = row_count;
        self.anchor_row = anchor;
        Ok(())
    }

    /// Forget the candidates and blank the rows of the last render. Calling it
    /// again without an intervening render writes nothing.
    pub fn clear<W: Write>(&mut self, renderer: &mut Renderer<W>) -> Result<()> {
        self.items.clear();
        self.max_width = 0;
        let rows = self.previous_reach(renderer.last_input_row());
        if rows == 0 {
            return Ok(());
        }
        let blank = vec![String::new(); rows];
        trace!(target: "render.listing", rows, "listing_cleared");
        renderer.write_lines_outside(&blank)?;
        self.last_row_count = 0;
        Ok(())
    }

    /// Rows below the input ending on `anchor` that the last render covered.
    fn previous_reach(&self, anchor: usize) -> usize {
        if self.last_row_count == 0 {
            return 0;
        }
        self.last_row_count + self.anchor_row.saturating_sub(anchor)
    }

    fn fit(&self, item: &str, screen_width: usize) -> String {
        if str_width(item) + self.layout.margin > screen_width {
            truncate_with_ellipsis(item, screen_width.saturating_sub(self.layout.margin))
        } else {
            item.to_string()
        }
    }
}
