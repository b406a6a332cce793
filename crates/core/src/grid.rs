//! Grid cursor: the (column, row, page) pointer to the next free sticker cell.
//!
//! Geometry is read without side effects; the cursor only moves through
//! [`GridCursor::advance`], which the batch calls once per label that was
//! actually drawn. A skipped record therefore never consumes a cell.

use serde::Serialize;
use sticker_sheet_profile::GridConfig;

/// Cursor position. `column` and `row` are zero-based, `page` is one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CursorState {
    /// Column within the row, in `[0, columns_per_page)`.
    pub column: u32,
    /// Row within the page, in `[0, rows_per_page)`.
    pub row: u32,
    /// Page number, starting at 1.
    pub page: u32,
}

impl CursorState {
    /// The first cell of the first page.
    pub const START: CursorState = CursorState {
        column: 0,
        row: 0,
        page: 1,
    };
}

/// Absolute placement of one sticker on its page, in millimetres from the
/// top-left page corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelGeometry {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Cell width.
    pub width: f64,
    /// Cell height.
    pub height: f64,
}

/// What a call to [`GridCursor::advance`] crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStep {
    /// Moved one column to the right.
    SameRow,
    /// Wrapped to the first column of the next row.
    NextRow,
    /// Wrapped to the first cell of a new page.
    NextPage,
}

/// Cursor over the cells of a [`GridConfig`], filled left to right, top to
/// bottom, page by page.
#[derive(Debug, Clone)]
pub struct GridCursor {
    config: GridConfig,
    state: CursorState,
}

impl GridCursor {
    /// Create a cursor at [`CursorState::START`].
    ///
    /// # Panics
    /// Panics if the grid has zero columns or zero rows.
    pub fn new(config: GridConfig) -> Self {
        assert!(
            config.columns_per_page >= 1 && config.rows_per_page >= 1,
            "GridCursor: grid must have at least one column and one row ({}x{})",
            config.columns_per_page,
            config.rows_per_page
        );
        Self {
            config,
            state: CursorState::START,
        }
    }

    /// The grid this cursor walks.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Current position.
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Cells per page.
    pub fn labels_per_page(&self) -> usize {
        self.config.labels_per_page()
    }

    /// Current one-based page number.
    pub fn page(&self) -> u32 {
        self.state.page
    }

    /// Zero-based index of the current cell counted across pages.
    pub fn slot_index(&self) -> usize {
        let columns = self.config.columns_per_page as usize;
        (self.state.page as usize - 1) * self.config.labels_per_page()
            + self.state.row as usize * columns
            + self.state.column as usize
    }

    /// Placement of the current cell. Does not move the cursor.
    pub fn current_geometry(&self) -> LabelGeometry {
        geometry_at(&self.config, self.state)
    }

    /// Move to the next cell, wrapping columns into rows and rows into pages.
    pub fn advance(&mut self) -> CursorStep {
        self.state.column += 1;
        if self.state.column < self.config.columns_per_page {
            return CursorStep::SameRow;
        }
        self.state.column = 0;
        self.state.row += 1;
        if self.state.row < self.config.rows_per_page {
            return CursorStep::NextRow;
        }
        self.state.row = 0;
        self.state.page += 1;
        CursorStep::NextPage
    }
}

/// Placement of the cell at `state` within `config`.
pub fn geometry_at(config: &GridConfig, state: CursorState) -> LabelGeometry {
    LabelGeometry {
        x: config.margin_x + state.column as f64 * config.cell_width,
        y: config.margin_y + state.row as f64 * config.cell_height,
        width: config.cell_width,
        height: config.cell_height,
    }
}
