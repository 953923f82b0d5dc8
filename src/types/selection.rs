use serde::{Deserialize, Serialize};

use super::{Area, Cell, ScrollPosition, LAST_COLUMN, LAST_ROW};

/// Shape of the current selection, used by the host to highlight headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionType {
    /// Standard cell selection (default)
    #[default]
    CellRange,
    /// Entire row(s) selected
    RowRange,
    /// Entire column(s) selected
    ColumnRange,
    /// All cells selected (corner click)
    All,
}

impl SelectionType {
    /// Shape of `area`: whole rows, whole columns, everything, or a block.
    pub fn of(area: &Area) -> Self {
        let a = area.normalized();
        let full_width = a.column_start == 1 && a.column_end == LAST_COLUMN;
        let full_height = a.row_start == 1 && a.row_end == LAST_ROW;
        match (full_width, full_height) {
            (true, true) => Self::All,
            (true, false) => Self::RowRange,
            (false, true) => Self::ColumnRange,
            (false, false) => Self::CellRange,
        }
    }
}

/// Per-sheet view state: selection and scroll.
///
/// Invariant: `selected_cell` lies within the normalized `selected_area`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetView {
    pub selected_cell: Cell,
    pub selected_area: Area,
    pub selection_type: SelectionType,
    pub scroll: ScrollPosition,
}

impl Default for SheetView {
    fn default() -> Self {
        Self::at(Cell::new(1, 1))
    }
}

impl SheetView {
    /// View with a single selected cell and no scroll.
    pub fn at(cell: Cell) -> Self {
        Self {
            selected_cell: cell,
            selected_area: Area::from_cell(cell),
            selection_type: SelectionType::CellRange,
            scroll: ScrollPosition::default(),
        }
    }

    /// Collapse the selection onto `cell`, keeping scroll.
    #[must_use]
    pub fn select_cell(self, cell: Cell) -> Self {
        Self {
            selected_cell: cell,
            selected_area: Area::from_cell(cell),
            selection_type: SelectionType::CellRange,
            ..self
        }
    }

    /// Select `area` with `cell` as the active cell.
    ///
    /// If `cell` falls outside the area the top-left corner becomes active.
    #[must_use]
    pub fn select_area(self, cell: Cell, area: Area) -> Self {
        let selected_cell = if area.contains(cell) {
            cell
        } else {
            area.top_left()
        };
        Self {
            selected_cell,
            selected_area: area,
            selection_type: SelectionType::of(&area),
            ..self
        }
    }

    /// Select whole rows `start..=end`.
    #[must_use]
    pub fn select_rows(self, start: u32, end: u32) -> Self {
        let area = Area::new(start, end, 1, LAST_COLUMN);
        let cell = Cell::new(start, 1);
        Self {
            selection_type: SelectionType::RowRange,
            ..self.select_area(cell, area)
        }
    }

    /// Select whole columns `start..=end`.
    #[must_use]
    pub fn select_columns(self, start: u32, end: u32) -> Self {
        let area = Area::new(1, LAST_ROW, start, end);
        let cell = Cell::new(1, start);
        Self {
            selection_type: SelectionType::ColumnRange,
            ..self.select_area(cell, area)
        }
    }

    /// Select every cell of the sheet.
    #[must_use]
    pub fn select_all(self) -> Self {
        let area = Area::new(1, LAST_ROW, 1, LAST_COLUMN);
        Self {
            selection_type: SelectionType::All,
            ..self.select_area(self.selected_cell, area)
        }
    }

    #[must_use]
    pub fn with_scroll(self, scroll: ScrollPosition) -> Self {
        Self { scroll, ..self }
    }

    /// The selected cell lies inside the normalized selected area.
    pub fn is_consistent(&self) -> bool {
        self.selected_area.contains(self.selected_cell)
    }
}

/// Configuration for row and column headers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderConfig {
    /// Whether headers are visible
    pub visible: bool,
    /// Width of row headers in pixels (~40px default)
    pub row_header_width: f64,
    /// Height of column headers in pixels (~20px default)
    pub col_header_height: f64,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            visible: true,
            row_header_width: 40.0,
            col_header_height: 20.0,
        }
    }
}

impl HeaderConfig {
    /// Effective row header width (0 when hidden).
    pub fn width(&self) -> f64 {
        if self.visible {
            self.row_header_width
        } else {
            0.0
        }
    }

    /// Effective column header height (0 when hidden).
    pub fn height(&self) -> f64 {
        if self.visible {
            self.col_header_height
        } else {
            0.0
        }
    }
}
